// self
use crate::_prelude::*;

/// OAuth protocol generations understood by the adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
	/// Three-legged, signature-based OAuth 1.0a.
	#[serde(rename = "oauth1")]
	OAuth1,
	/// Authorization-code OAuth 2.0 with bearer tokens.
	#[serde(rename = "oauth2")]
	OAuth2,
}
impl Protocol {
	/// Returns a stable label for the protocol.
	pub fn as_str(self) -> &'static str {
		match self {
			Protocol::OAuth1 => "oauth1",
			Protocol::OAuth2 => "oauth2",
		}
	}
}
impl Display for Protocol {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// OAuth 1.0a signature methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
	/// RFC 5849 HMAC-SHA1 (the method Trello expects).
	#[default]
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// HMAC-SHA256 extension used by some providers.
	#[serde(rename = "HMAC-SHA256")]
	HmacSha256,
	/// RFC 5849 PLAINTEXT; only safe over TLS.
	#[serde(rename = "PLAINTEXT")]
	Plaintext,
}
impl SignatureMethod {
	/// Returns the `oauth_signature_method` identifier.
	pub fn as_str(self) -> &'static str {
		match self {
			SignatureMethod::HmacSha1 => "HMAC-SHA1",
			SignatureMethod::HmacSha256 => "HMAC-SHA256",
			SignatureMethod::Plaintext => "PLAINTEXT",
		}
	}
}
impl Display for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Provider endpoints that the adapters call over the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
	/// Browser authorization (consent) endpoint; only reports denials via the callback.
	Authorize,
	/// OAuth 1.0a temporary credential endpoint.
	RequestToken,
	/// OAuth 1.0a token credential endpoint.
	AccessToken,
	/// OAuth 2.0 token endpoint.
	Token,
	/// Profile (user info) endpoint.
	Profile,
}
impl EndpointKind {
	/// Returns a stable label for the endpoint.
	pub fn as_str(self) -> &'static str {
		match self {
			EndpointKind::Authorize => "authorize",
			EndpointKind::RequestToken => "request_token",
			EndpointKind::AccessToken => "access_token",
			EndpointKind::Token => "token",
			EndpointKind::Profile => "profile",
		}
	}

	/// Returns true for endpoints that exchange credentials.
	pub fn is_token_exchange(self) -> bool {
		matches!(self, EndpointKind::RequestToken | EndpointKind::AccessToken | EndpointKind::Token)
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
