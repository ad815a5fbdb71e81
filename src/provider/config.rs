//! Provider credentials and registry configuration loaded at startup.

// self
use crate::{
	_prelude::*,
	auth::{ProviderName, TokenSecret},
	error::ConfigError,
	provider::{Preset, Protocol, ProviderDescriptor},
};

/// Immutable credentials of one provider instance.
///
/// For OAuth 1.0a providers `client_id`/`client_secret` are the consumer key and secret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// Name the adapter is registered under.
	pub provider_name: ProviderName,
	/// Client identifier (consumer key for OAuth 1.0a).
	pub client_id: String,
	/// Client secret (consumer secret for OAuth 1.0a).
	pub client_secret: TokenSecret,
	/// Application name shown on the OAuth 1.0a consent screen.
	#[serde(default)]
	pub app_display_name: Option<String>,
}
impl ProviderConfig {
	/// Creates a config without an app display name.
	pub fn new(
		provider_name: ProviderName,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			provider_name,
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			app_display_name: None,
		}
	}

	/// Sets the app display name used by OAuth 1.0a consent screens.
	pub fn with_app_display_name(mut self, name: impl Into<String>) -> Self {
		self.app_display_name = Some(name.into());

		self
	}

	/// Checks the config against the descriptor it will be paired with.
	pub fn validate_for(&self, descriptor: &ProviderDescriptor) -> Result<(), ConfigError> {
		if descriptor.protocol() == Protocol::OAuth1
			&& self.app_display_name.as_deref().is_none_or(|name| name.trim().is_empty())
		{
			return Err(ConfigError::MissingAppDisplayName {
				provider: self.provider_name.to_string(),
			});
		}

		Ok(())
	}
}

/// Where a registered provider's descriptor comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorSource {
	/// One of the built-in descriptors.
	Preset(Preset),
	/// A fully specified descriptor.
	Custom(ProviderDescriptor),
}
impl DescriptorSource {
	/// Resolves the descriptor under the configured provider name.
	pub fn resolve(&self, name: &ProviderName) -> Result<ProviderDescriptor> {
		match self {
			DescriptorSource::Preset(preset) => preset.descriptor(name.clone()),
			DescriptorSource::Custom(descriptor) => {
				let mut descriptor = descriptor.clone();

				descriptor.name = name.clone();
				descriptor.validate().map_err(ConfigError::from)?;

				Ok(descriptor)
			},
		}
	}
}

/// One provider entry of a [`RegistryConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
	/// Provider credentials.
	#[serde(flatten)]
	pub config: ProviderConfig,
	/// Descriptor source.
	pub descriptor: DescriptorSource,
}

/// Startup configuration of a provider registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
	/// Providers to register, in display order.
	#[serde(default)]
	pub providers: Vec<ProviderEntry>,
}
impl RegistryConfig {
	/// Parses a JSON document, reporting the path of the first invalid value.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(json);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::InvalidRegistryConfig { source })
	}
}
