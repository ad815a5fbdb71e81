//! Built-in descriptors for the providers the crate ships with.

// self
use crate::{
	_prelude::*,
	auth::ProviderName,
	error::ConfigError,
	oauth::DEFAULT_USER_AGENT,
	profile::FieldMap,
	provider::{ProviderDescriptor, ProviderQuirks, SignatureMethod},
};

const TRELLO_REQUEST_TOKEN_URL: &str = "https://trello.com/1/OAuthGetRequestToken";
const TRELLO_AUTHORIZE_URL: &str = "https://trello.com/1/OAuthAuthorizeToken";
const TRELLO_ACCESS_TOKEN_URL: &str = "https://trello.com/1/OAuthGetAccessToken";
const TRELLO_PROFILE_URL: &str = "https://api.trello.com/1/members/me";
const TRELLO_JOINED_FIELDS: [&str; 7] = [
	"idBoards",
	"idBoardsInvited",
	"idBoardsPinned",
	"idOrganizations",
	"idOrganizationsInvited",
	"trophies",
	"oneTimeMessagesDismissed",
];

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_PROFILE_URL: &str = "https://api.github.com/user";
const GITHUB_SCALAR_FIELDS: [&str; 22] = [
	"avatar_url",
	"gravatar_id",
	"url",
	"name",
	"company",
	"blog",
	"location",
	"email",
	"hireable",
	"bio",
	"public_repos",
	"public_gists",
	"followers",
	"following",
	"html_url",
	"created_at",
	"type",
	"total_private_repos",
	"owned_private_repos",
	"private_gists",
	"disk_usage",
	"collaborators",
];
const GITHUB_PLAN_FIELDS: [&str; 4] = ["name", "space", "collaborators", "private_repos"];

/// Providers with a built-in descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
	/// Trello, OAuth 1.0a with HMAC-SHA1.
	Trello,
	/// GitHub, OAuth 2.0 authorization code.
	GitHub,
}
impl Preset {
	/// Name the preset registers under unless configuration overrides it.
	pub fn default_name(self) -> &'static str {
		match self {
			Preset::Trello => "Trello",
			Preset::GitHub => "GitHub",
		}
	}

	/// Builds the preset descriptor under `name`.
	pub fn descriptor(self, name: ProviderName) -> Result<ProviderDescriptor> {
		match self {
			Preset::Trello => trello(name),
			Preset::GitHub => github(name),
		}
	}
}

/// Trello field map: `id`/`username`, every other top-level value collected, and the
/// array fields always present.
pub fn trello_field_map() -> FieldMap {
	TRELLO_JOINED_FIELDS
		.iter()
		.fold(FieldMap::new("id", "username"), |map, field| map.joined(*field, *field))
		.collect_remaining()
}

/// GitHub field map: `id`/`login`, the documented profile scalars, and the flattened
/// `plan` object.
pub fn github_field_map() -> FieldMap {
	let map = GITHUB_SCALAR_FIELDS.iter().fold(FieldMap::new("id", "login"), |map, field| map.same(field));

	GITHUB_PLAN_FIELDS
		.iter()
		.fold(map, |map, field| map.field(format!("plan_{field}"), format!("plan.{field}")))
}

/// Trello descriptor.
pub fn trello(name: ProviderName) -> Result<ProviderDescriptor> {
	let descriptor = ProviderDescriptor::oauth1(name)
		.request_token_endpoint(parse_url(TRELLO_REQUEST_TOKEN_URL)?)
		.authorization_endpoint(parse_url(TRELLO_AUTHORIZE_URL)?)
		.access_token_endpoint(parse_url(TRELLO_ACCESS_TOKEN_URL)?)
		.profile_endpoint(parse_url(TRELLO_PROFILE_URL)?)
		.signature_method(SignatureMethod::HmacSha1)
		.field_map(trello_field_map())
		.build()
		.map_err(ConfigError::from)?;

	Ok(descriptor)
}

/// GitHub descriptor. GitHub refuses API calls without a `User-Agent`.
pub fn github(name: ProviderName) -> Result<ProviderDescriptor> {
	let descriptor = ProviderDescriptor::oauth2(name)
		.authorization_endpoint(parse_url(GITHUB_AUTHORIZE_URL)?)
		.token_endpoint(parse_url(GITHUB_TOKEN_URL)?)
		.profile_endpoint(parse_url(GITHUB_PROFILE_URL)?)
		.field_map(github_field_map())
		.quirks(ProviderQuirks {
			user_agent: Some(DEFAULT_USER_AGENT.into()),
			..Default::default()
		})
		.build()
		.map_err(ConfigError::from)?;

	Ok(descriptor)
}

fn parse_url(url: &str) -> Result<Url> {
	Url::parse(url).map_err(|_| ConfigError::InvalidEndpointUrl { url: url.into() }.into())
}
