//! Login adapters and the registry that dispatches to them.
//!
//! [`Oauth1Client`] and [`Oauth2Client`] implement one capability trait, [`AuthClient`],
//! so callers drive either protocol through the same two calls: start an authorization
//! (getting an [`AuthorizationSession`] to carry across the browser redirect) and complete
//! it with the [`CallbackParams`] the provider sent back.

pub mod oauth1;
pub mod oauth2;
pub mod registry;

pub use oauth1::*;
pub use oauth2::*;
pub use registry::*;

// crates.io
use ::oauth2::AuthorizationCode;
// self
use crate::{
	_prelude::*,
	auth::{AuthenticatedIdentity, AuthenticationResult, FlowStage, ProviderName},
	error::ConfigError,
	obs::{self, FlowKind, FlowOutcome},
	oauth,
	provider::{EndpointKind, Protocol},
};

/// Boxed future returned by [`AuthClient`] methods so the trait stays object safe.
pub type FlowFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Capability shared by every protocol adapter.
pub trait AuthClient: Send + Sync {
	/// Name the adapter is registered under.
	fn provider_name(&self) -> &ProviderName;

	/// Protocol spoken by the adapter.
	fn protocol(&self) -> Protocol;

	/// Produces the URL the browser must visit, plus whatever state the callback needs.
	fn start_authorization<'a>(
		&'a self,
		callback_url: &'a Url,
	) -> FlowFuture<'a, Result<AuthorizationSession>>;

	/// Finishes the handshake. Every failure is reported inside the result.
	fn complete_authorization(
		&self,
		session: AuthorizationSession,
		params: CallbackParams,
	) -> FlowFuture<'_, AuthenticationResult>;
}

/// State carried across the browser redirect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationSession {
	/// Provider that issued the session.
	pub provider: ProviderName,
	/// URL the browser is sent to.
	pub authorization_url: Url,
	/// Callback URL the provider redirects back to.
	pub callback_url: Url,
	/// Temporary credentials, present for OAuth 1.0a only.
	pub pending: Option<PendingAuthorization>,
}

/// Parameters the provider appended to the callback URL.
#[derive(Clone, Debug)]
pub enum CallbackParams {
	/// OAuth 1.0a callback.
	OAuth1 {
		/// Temporary token echoed back by the provider, when present.
		oauth_token: Option<String>,
		/// Verifier proving the user approved the request.
		oauth_verifier: String,
	},
	/// OAuth 2.0 callback.
	OAuth2 {
		/// Authorization code.
		code: AuthorizationCode,
	},
	/// The user or the provider refused the authorization.
	Denied {
		/// Provider error code (`access_denied` when the provider gave none).
		error: String,
		/// Optional human-readable description.
		description: Option<String>,
	},
}
impl CallbackParams {
	/// Builds OAuth 1.0a callback parameters.
	pub fn oauth1(oauth_token: Option<String>, oauth_verifier: impl Into<String>) -> Self {
		Self::OAuth1 { oauth_token, oauth_verifier: oauth_verifier.into() }
	}

	/// Builds OAuth 2.0 callback parameters.
	pub fn oauth2(code: impl Into<String>) -> Self {
		Self::OAuth2 { code: AuthorizationCode::new(code.into()) }
	}

	/// Parses the raw query string of a callback request.
	///
	/// `error` (OAuth 2.0) and `denied` (Trello) both mean the authorization was refused.
	pub fn from_query(query: &str) -> Result<Self> {
		let mut params = oauth::parse_form(query.trim_start_matches('?').as_bytes());

		if let Some(error) = params.remove("error") {
			return Ok(Self::Denied { error, description: params.remove("error_description") });
		}
		if params.contains_key("denied") {
			return Ok(Self::Denied { error: "access_denied".into(), description: None });
		}
		if let Some(verifier) = params.remove("oauth_verifier").filter(|v| !v.is_empty()) {
			return Ok(Self::oauth1(params.remove("oauth_token"), verifier));
		}
		if let Some(code) = params.remove("code").filter(|c| !c.is_empty()) {
			return Ok(Self::oauth2(code));
		}

		Err(Error::InvalidCallback {
			reason: "callback carries neither an oauth_verifier nor a code".into(),
		})
	}

	/// Parses the query of a full callback URL.
	pub fn from_url(url: &Url) -> Result<Self> {
		Self::from_query(url.query().unwrap_or_default())
	}

	fn denial(error: &str, description: Option<&str>) -> Error {
		let reason = match description {
			Some(description) => format!("{error} ({description})"),
			None => error.to_owned(),
		};

		Error::ProviderRejected { endpoint: EndpointKind::Authorize, reason }
	}
}

/// Callback URLs must be absolute http(s) URLs.
pub(crate) fn validate_callback_url(url: &Url) -> Result<(), ConfigError> {
	if matches!(url.scheme(), "http" | "https") && url.has_host() {
		Ok(())
	} else {
		Err(ConfigError::InvalidCallbackUrl { url: url.to_string() })
	}
}

/// Converts the outcome of a completion attempt into a result, recording metrics and
/// emitting the failure warning.
pub(crate) fn finish(
	kind: FlowKind,
	provider: &ProviderName,
	stage: FlowStage,
	outcome: Result<AuthenticatedIdentity>,
) -> AuthenticationResult {
	match outcome {
		Ok(identity) => {
			obs::record_flow_outcome(kind, FlowOutcome::Success);

			AuthenticationResult::success(provider.clone(), identity)
		},
		Err(error) => {
			obs::record_flow_outcome(kind, FlowOutcome::Failure);

			let result = AuthenticationResult::failure(provider.clone(), stage, error);

			if let Some(failure) = result.failure_reason() {
				obs::warn_flow_failure(kind, provider, failure);
			}

			result
		},
	}
}
