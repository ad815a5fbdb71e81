//! Crate-level error types shared across adapters, descriptors, and the registry.

// self
use crate::{_prelude::*, provider::EndpointKind};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs and captured inside failed
/// [`AuthenticationResult`](crate::auth::AuthenticationResult) values.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Network failure or non-2xx response.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider answered with a body that could not be decoded.
	#[error(transparent)]
	MalformedResponse(#[from] MalformedResponseError),

	/// A required identity field is absent from the provider profile.
	#[error("Profile is missing the required `{field}` field.")]
	MissingField {
		/// Source path of the missing field.
		field: String,
	},
	/// Provider rejected a token, verifier, or authorization code.
	#[error("Provider rejected the {endpoint} request: {reason}.")]
	ProviderRejected {
		/// Endpoint that issued the rejection.
		endpoint: EndpointKind,
		/// Provider- or client-supplied reason string.
		reason: String,
	},
	/// Callback parameters do not line up with the pending authorization.
	#[error("Callback is invalid: {reason}.")]
	InvalidCallback {
		/// Why the callback was refused.
		reason: String,
	},
}
impl From<crate::profile::ProfileError> for Error {
	fn from(e: crate::profile::ProfileError) -> Self {
		match e {
			crate::profile::ProfileError::MissingField { field } => Self::MissingField { field },
			crate::profile::ProfileError::NotAnObject => MalformedResponseError::Shape {
				endpoint: EndpointKind::Profile,
				expected: "a JSON object",
			}
			.into(),
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Identifier validation failed.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
	/// Signing key was refused by the MAC implementation.
	#[error("OAuth 1.0a signing key is invalid.")]
	InvalidSigningKey,
	/// Registry configuration document could not be decoded.
	#[error("Registry configuration is invalid.")]
	InvalidRegistryConfig {
		/// Structured decoding failure including the failing path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Built-in endpoint URL could not be parsed.
	#[error("Endpoint URL `{url}` is invalid.")]
	InvalidEndpointUrl {
		/// Offending URL.
		url: String,
	},
	/// Callback URL cannot be used as a redirect target.
	#[error("Callback URL `{url}` must be absolute with an http(s) scheme.")]
	InvalidCallbackUrl {
		/// Offending callback URL.
		url: String,
	},

	/// Descriptor speaks a different protocol than the adapter.
	#[error("Descriptor `{descriptor}` does not describe an {expected} provider.")]
	ProtocolMismatch {
		/// Provider name carried by the descriptor.
		descriptor: String,
		/// Protocol the adapter expected.
		expected: &'static str,
	},
	/// OAuth 1.0a providers need an app display name for the consent screen.
	#[error("Provider `{provider}` requires an app display name.")]
	MissingAppDisplayName {
		/// Provider name.
		provider: String,
	},
	/// No adapter is registered under the requested name.
	#[error("No provider is registered under `{name}`.")]
	UnknownProvider {
		/// Requested provider name.
		name: String,
	},
	/// Two adapters were registered under the same name.
	#[error("Provider `{name}` is registered more than once.")]
	DuplicateProvider {
		/// Duplicated provider name.
		name: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, unexpected status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling a provider endpoint.")]
	Io(#[from] std::io::Error),
	/// Provider answered with a non-2xx status that is not a rejection.
	#[error("The {endpoint} endpoint returned HTTP {status}.")]
	Status {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// HTTP status code.
		status: u16,
		/// Truncated response body, when any.
		body_preview: Option<String>,
	},
	/// Transport surfaced an error without a more specific shape.
	#[error("HTTP client error occurred while calling the {endpoint} endpoint: {message}.")]
	Other {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(endpoint: EndpointKind, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}

/// Response bodies that could not be decoded.
#[derive(Debug, ThisError)]
pub enum MalformedResponseError {
	/// JSON body could not be parsed.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	Json {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Structured parsing failure including the failing path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Form-encoded body lacks a mandatory parameter.
	#[error("The {endpoint} endpoint response is missing `{parameter}`.")]
	MissingParameter {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Name of the absent parameter.
		parameter: &'static str,
	},
	/// Body decoded but has the wrong overall shape.
	#[error("The {endpoint} endpoint did not return {expected}.")]
	Shape {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Human-readable description of the expected shape.
		expected: &'static str,
	},
}
