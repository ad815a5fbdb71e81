// self
use crate::{
	_prelude::*,
	auth::ProviderName,
	profile::FieldMap,
	provider::{
		Oauth1Endpoints, Oauth2Endpoints, Protocol, ProviderDescriptor, ProviderEndpoints,
		ProviderQuirks, SignatureMethod,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// A required endpoint was never set.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// An endpoint was set that the protocol never calls.
	#[error("The {endpoint} endpoint is not used by {protocol} providers.")]
	UnexpectedEndpoint {
		/// Which endpoint was supplied.
		endpoint: &'static str,
		/// Protocol of the descriptor.
		protocol: Protocol,
	},
	/// A signature method only applies to OAuth 1.0a.
	#[error("Signature methods only apply to oauth1 providers.")]
	UnexpectedSignatureMethod,
	/// Endpoints must use HTTPS (plain HTTP is tolerated for loopback hosts).
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// PLAINTEXT signatures leak the consumer secret over cleartext transports.
	#[error("PLAINTEXT signatures require HTTPS endpoints.")]
	PlaintextOverInsecureTransport,
	/// Field map identity sources must be non-empty paths.
	#[error("Field map source for `{field}` is empty.")]
	EmptyFieldSource {
		/// Result field whose source is empty.
		field: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Name for the descriptor being constructed.
	pub name: ProviderName,
	/// Protocol the descriptor will describe.
	pub protocol: Protocol,
	/// OAuth 1.0a temporary credential endpoint.
	pub request_token_endpoint: Option<Url>,
	/// Browser authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// OAuth 1.0a token credential endpoint.
	pub access_token_endpoint: Option<Url>,
	/// OAuth 2.0 token endpoint.
	pub token_endpoint: Option<Url>,
	/// Profile endpoint.
	pub profile_endpoint: Option<Url>,
	/// OAuth 1.0a signature method (defaults to HMAC-SHA1).
	pub signature_method: Option<SignatureMethod>,
	/// Profile field mapping.
	pub field_map: FieldMap,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided name and protocol.
	pub fn new(name: ProviderName, protocol: Protocol) -> Self {
		Self {
			name,
			protocol,
			request_token_endpoint: None,
			authorization_endpoint: None,
			access_token_endpoint: None,
			token_endpoint: None,
			profile_endpoint: None,
			signature_method: None,
			field_map: FieldMap::default(),
			quirks: ProviderQuirks::default(),
		}
	}

	/// Sets the OAuth 1.0a request token endpoint.
	pub fn request_token_endpoint(mut self, url: Url) -> Self {
		self.request_token_endpoint = Some(url);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the OAuth 1.0a access token endpoint.
	pub fn access_token_endpoint(mut self, url: Url) -> Self {
		self.access_token_endpoint = Some(url);

		self
	}

	/// Sets the OAuth 2.0 token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the profile endpoint.
	pub fn profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Overrides the OAuth 1.0a signature method.
	pub fn signature_method(mut self, method: SignatureMethod) -> Self {
		self.signature_method = Some(method);

		self
	}

	/// Sets the profile field mapping.
	pub fn field_map(mut self, field_map: FieldMap) -> Self {
		self.field_map = field_map;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorize = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint: "authorization" })?;
		let profile = self
			.profile_endpoint
			.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint: "profile" })?;
		let endpoints = match self.protocol {
			Protocol::OAuth1 => {
				if self.token_endpoint.is_some() {
					return Err(ProviderDescriptorError::UnexpectedEndpoint {
						endpoint: "token",
						protocol: Protocol::OAuth1,
					});
				}

				ProviderEndpoints::OAuth1(Oauth1Endpoints {
					request_token: self.request_token_endpoint.ok_or(
						ProviderDescriptorError::MissingEndpoint { endpoint: "request_token" },
					)?,
					authorize,
					access_token: self.access_token_endpoint.ok_or(
						ProviderDescriptorError::MissingEndpoint { endpoint: "access_token" },
					)?,
					profile,
					signature_method: self.signature_method.unwrap_or_default(),
				})
			},
			Protocol::OAuth2 => {
				if self.request_token_endpoint.is_some() {
					return Err(ProviderDescriptorError::UnexpectedEndpoint {
						endpoint: "request_token",
						protocol: Protocol::OAuth2,
					});
				}
				if self.access_token_endpoint.is_some() {
					return Err(ProviderDescriptorError::UnexpectedEndpoint {
						endpoint: "access_token",
						protocol: Protocol::OAuth2,
					});
				}
				if self.signature_method.is_some() {
					return Err(ProviderDescriptorError::UnexpectedSignatureMethod);
				}

				ProviderEndpoints::OAuth2(Oauth2Endpoints {
					authorize,
					token: self
						.token_endpoint
						.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint: "token" })?,
					profile,
				})
			},
		};
		let descriptor = ProviderDescriptor {
			name: self.name,
			endpoints,
			field_map: self.field_map,
			quirks: self.quirks,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	pub fn validate(&self) -> Result<(), ProviderDescriptorError> {
		match &self.endpoints {
			ProviderEndpoints::OAuth1(endpoints) => {
				validate_endpoint("request_token", &endpoints.request_token)?;
				validate_endpoint("authorization", &endpoints.authorize)?;
				validate_endpoint("access_token", &endpoints.access_token)?;
				validate_endpoint("profile", &endpoints.profile)?;

				if endpoints.signature_method == SignatureMethod::Plaintext
					&& [&endpoints.request_token, &endpoints.access_token, &endpoints.profile]
						.iter()
						.any(|url| url.scheme() != "https")
				{
					return Err(ProviderDescriptorError::PlaintextOverInsecureTransport);
				}
			},
			ProviderEndpoints::OAuth2(endpoints) => {
				validate_endpoint("authorization", &endpoints.authorize)?;
				validate_endpoint("token", &endpoints.token)?;
				validate_endpoint("profile", &endpoints.profile)?;
			},
		}

		if self.field_map.provider_user_id.is_empty() {
			return Err(ProviderDescriptorError::EmptyFieldSource {
				field: "provider_user_id".into(),
			});
		}
		if self.field_map.user_name.is_empty() {
			return Err(ProviderDescriptorError::EmptyFieldSource { field: "user_name".into() });
		}

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() == "https" || (url.scheme() == "http" && is_loopback(url)) {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn name() -> ProviderName {
		ProviderName::new("Acme").expect("Provider name fixture should be valid.")
	}

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	fn oauth1() -> ProviderDescriptorBuilder {
		ProviderDescriptor::oauth1(name())
			.request_token_endpoint(url("https://acme.test/request"))
			.authorization_endpoint(url("https://acme.test/authorize"))
			.access_token_endpoint(url("https://acme.test/access"))
			.profile_endpoint(url("https://api.acme.test/me"))
	}

	#[test]
	fn oauth1_builder_defaults_to_hmac_sha1() {
		let descriptor = oauth1().build().expect("Complete OAuth 1.0a descriptor should build.");
		let ProviderEndpoints::OAuth1(endpoints) = &descriptor.endpoints else {
			panic!("Expected OAuth 1.0a endpoints.");
		};

		assert_eq!(descriptor.protocol(), Protocol::OAuth1);
		assert_eq!(endpoints.signature_method, SignatureMethod::HmacSha1);
		assert_eq!(descriptor.endpoints.profile().as_str(), "https://api.acme.test/me");
	}

	#[test]
	fn missing_and_foreign_endpoints_are_refused() {
		assert_eq!(
			ProviderDescriptor::oauth1(name())
				.authorization_endpoint(url("https://acme.test/authorize"))
				.profile_endpoint(url("https://api.acme.test/me"))
				.build(),
			Err(ProviderDescriptorError::MissingEndpoint { endpoint: "request_token" })
		);
		assert_eq!(
			oauth1().token_endpoint(url("https://acme.test/token")).build(),
			Err(ProviderDescriptorError::UnexpectedEndpoint {
				endpoint: "token",
				protocol: Protocol::OAuth1,
			})
		);
		assert_eq!(
			ProviderDescriptor::oauth2(name())
				.authorization_endpoint(url("https://acme.test/authorize"))
				.token_endpoint(url("https://acme.test/token"))
				.profile_endpoint(url("https://api.acme.test/me"))
				.signature_method(SignatureMethod::HmacSha256)
				.build(),
			Err(ProviderDescriptorError::UnexpectedSignatureMethod)
		);
	}

	#[test]
	fn cleartext_endpoints_are_limited_to_loopback() {
		assert!(matches!(
			oauth1().profile_endpoint(url("http://api.acme.test/me")).build(),
			Err(ProviderDescriptorError::InsecureEndpoint { endpoint: "profile", .. })
		));
		assert!(
			oauth1()
				.request_token_endpoint(url("http://127.0.0.1:8080/request"))
				.access_token_endpoint(url("http://localhost:8080/access"))
				.build()
				.is_ok()
		);
		assert_eq!(
			oauth1()
				.request_token_endpoint(url("http://127.0.0.1:8080/request"))
				.signature_method(SignatureMethod::Plaintext)
				.build(),
			Err(ProviderDescriptorError::PlaintextOverInsecureTransport)
		);
	}

	#[test]
	fn identity_sources_must_be_named() {
		assert_eq!(
			oauth1().field_map(FieldMap::new("id", "")).build(),
			Err(ProviderDescriptorError::EmptyFieldSource { field: "user_name".into() })
		);
	}
}
