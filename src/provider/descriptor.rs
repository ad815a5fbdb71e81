//! Provider descriptor data structures shared by both adapters.
//!
//! A descriptor is pure data: the endpoint set of one provider, the signature method
//! for OAuth 1.0a, the profile [`FieldMap`], and a handful of request quirks.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Protocol, signature method, and endpoint labels.
pub mod protocol;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use protocol::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::ProviderName, profile::FieldMap};

/// OAuth 1.0a endpoint set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oauth1Endpoints {
	/// Temporary credential (request token) endpoint.
	pub request_token: Url,
	/// User authorization endpoint the browser is sent to.
	pub authorize: Url,
	/// Token credential (access token) endpoint.
	pub access_token: Url,
	/// Profile endpoint fetched with the access credential.
	pub profile: Url,
	/// Signature method applied to every signed request.
	pub signature_method: SignatureMethod,
}

/// OAuth 2.0 endpoint set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oauth2Endpoints {
	/// Authorization endpoint the browser is sent to.
	pub authorize: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// Profile endpoint fetched with the bearer token.
	pub profile: Url,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum ProviderEndpoints {
	/// Three-legged OAuth 1.0a endpoints.
	#[serde(rename = "oauth1")]
	OAuth1(Oauth1Endpoints),
	/// Authorization-code OAuth 2.0 endpoints.
	#[serde(rename = "oauth2")]
	OAuth2(Oauth2Endpoints),
}
impl ProviderEndpoints {
	/// Protocol implied by the endpoint set.
	pub fn protocol(&self) -> Protocol {
		match self {
			ProviderEndpoints::OAuth1(_) => Protocol::OAuth1,
			ProviderEndpoints::OAuth2(_) => Protocol::OAuth2,
		}
	}

	/// Profile endpoint, common to both protocols.
	pub fn profile(&self) -> &Url {
		match self {
			ProviderEndpoints::OAuth1(endpoints) => &endpoints.profile,
			ProviderEndpoints::OAuth2(endpoints) => &endpoints.profile,
		}
	}
}

/// Immutable provider descriptor consumed by the adapters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Provider name.
	pub name: ProviderName,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Profile field mapping.
	pub field_map: FieldMap,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Starts an OAuth 1.0a descriptor builder.
	pub fn oauth1(name: ProviderName) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(name, Protocol::OAuth1)
	}

	/// Starts an OAuth 2.0 descriptor builder.
	pub fn oauth2(name: ProviderName) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(name, Protocol::OAuth2)
	}

	/// Protocol spoken by the provider.
	pub fn protocol(&self) -> Protocol {
		self.endpoints.protocol()
	}
}
