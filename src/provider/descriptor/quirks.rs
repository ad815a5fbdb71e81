// self
use crate::_prelude::*;

/// Where the bearer token travels when fetching an OAuth 2.0 profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BearerPlacement {
	/// `access_token` query parameter.
	#[default]
	QueryParameter,
	/// `Authorization: Bearer <token>` header.
	AuthorizationHeader,
}

/// Provider-specific quirks that influence how requests are built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// `User-Agent` sent with every provider request; some providers reject requests without one.
	pub user_agent: Option<String>,
	/// Bearer token placement for OAuth 2.0 profile requests.
	pub bearer_placement: BearerPlacement,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self { user_agent: None, bearer_placement: BearerPlacement::QueryParameter }
	}
}
