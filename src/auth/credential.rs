//! Short-lived access credentials obtained during a handshake.

// crates.io
use oauth2::AccessToken;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Credential returned by a token exchange and used once to fetch the profile.
///
/// Nothing in the crate persists these values; they are dropped as soon as the
/// profile request completes.
#[derive(Clone)]
pub enum AccessCredential {
	/// OAuth 1.0a token credentials (token + token secret) used for signing.
	OAuth1 {
		/// Access token identifier.
		token: String,
		/// Token secret mixed into the signing key.
		secret: TokenSecret,
	},
	/// OAuth 2.0 bearer token.
	Bearer(AccessToken),
}
impl AccessCredential {
	/// Wraps a bearer token string.
	pub fn bearer(token: impl Into<String>) -> Self {
		Self::Bearer(AccessToken::new(token.into()))
	}

	/// Returns the raw token value. Callers must avoid logging this string.
	pub fn token(&self) -> &str {
		match self {
			Self::OAuth1 { token, .. } => token,
			Self::Bearer(token) => token.secret(),
		}
	}
}
impl Debug for AccessCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::OAuth1 { secret, .. } => f
				.debug_struct("OAuth1")
				.field("token", &"<redacted>")
				.field("secret", secret)
				.finish(),
			Self::Bearer(token) => f.debug_tuple("Bearer").field(token).finish(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn debug_output_hides_secrets() {
		let bearer = AccessCredential::bearer("abc123");
		let oauth1 = AccessCredential::OAuth1 {
			token: "acc-token-7f3a".into(),
			secret: TokenSecret::new("s3cr3t"),
		};
		let printed = format!("{oauth1:?}");

		assert_eq!(bearer.token(), "abc123");
		assert_eq!(oauth1.token(), "acc-token-7f3a");
		assert!(!format!("{bearer:?}").contains("abc123"));
		assert!(printed.starts_with("OAuth1"));
		assert!(!printed.contains("acc-token-7f3a"));
		assert!(!printed.contains("s3cr3t"));
	}
}
