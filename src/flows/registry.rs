//! Explicit provider registry built once at startup and passed to request handlers.

// self
use crate::{
	_prelude::*,
	auth::{AuthenticationResult, FlowStage, ProviderName},
	error::ConfigError,
	flows::{AuthClient, AuthorizationSession, CallbackParams, Oauth1Client, Oauth2Client},
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	provider::{Protocol, RegistryConfig},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Display data for one registered provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderSummary {
	/// Name the adapter is registered under.
	pub name: ProviderName,
	/// Protocol spoken by the adapter.
	pub protocol: Protocol,
}

/// Maps provider names to adapters, preserving registration order.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
	clients: Vec<Arc<dyn AuthClient>>,
}
impl ProviderRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds one adapter per entry, sharing the transport + mapper pair.
	pub fn from_config_with<C, M>(
		config: &RegistryConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self>
	where
		C: ?Sized + ProviderHttpClient,
		M: ?Sized + TransportErrorMapper<C::TransportError>,
	{
		let http_client = http_client.into();
		let mapper = mapper.into();
		let mut registry = Self::new();

		for entry in &config.providers {
			let descriptor = entry.descriptor.resolve(&entry.config.provider_name)?;
			let client: Arc<dyn AuthClient> = match descriptor.protocol() {
				Protocol::OAuth1 => Arc::new(Oauth1Client::<C, M>::with_http_client(
					descriptor,
					entry.config.clone(),
					Arc::clone(&http_client),
					Arc::clone(&mapper),
				)?),
				Protocol::OAuth2 => Arc::new(Oauth2Client::<C, M>::with_http_client(
					descriptor,
					entry.config.clone(),
					Arc::clone(&http_client),
					Arc::clone(&mapper),
				)?),
			};

			registry.register(client)?;
		}

		Ok(registry)
	}

	/// Adds an adapter; names must be unique.
	pub fn register(&mut self, client: Arc<dyn AuthClient>) -> Result<(), ConfigError> {
		if self.get(client.provider_name()).is_some() {
			return Err(ConfigError::DuplicateProvider { name: client.provider_name().to_string() });
		}

		self.clients.push(client);

		Ok(())
	}

	/// Looks up an adapter by name.
	pub fn get(&self, name: &str) -> Option<&Arc<dyn AuthClient>> {
		self.clients.iter().find(|client| client.provider_name().as_ref() == name)
	}

	/// Registered providers in registration order, for rendering external login choices.
	pub fn providers(&self) -> Vec<ProviderSummary> {
		self.clients
			.iter()
			.map(|client| ProviderSummary {
				name: client.provider_name().clone(),
				protocol: client.protocol(),
			})
			.collect()
	}

	/// Starts an authorization against `provider_name`.
	pub async fn authorization_url(
		&self,
		provider_name: &str,
		callback_url: &Url,
	) -> Result<AuthorizationSession> {
		let client = self
			.get(provider_name)
			.ok_or_else(|| ConfigError::UnknownProvider { name: provider_name.to_owned() })?;

		client.start_authorization(callback_url).await
	}

	/// Completes an authorization; every failure is reported inside the result.
	pub async fn complete_authorization(
		&self,
		provider_name: &str,
		session: AuthorizationSession,
		params: CallbackParams,
	) -> AuthenticationResult {
		if session.provider.as_ref() != provider_name {
			return AuthenticationResult::failure(
				session.provider,
				FlowStage::AuthorizationRequested,
				Error::InvalidCallback {
					reason: format!("session was issued for another provider than `{provider_name}`"),
				},
			);
		}

		match self.get(provider_name) {
			Some(client) => client.complete_authorization(session, params).await,
			None => AuthenticationResult::failure(
				session.provider,
				FlowStage::AuthorizationRequested,
				ConfigError::UnknownProvider { name: provider_name.to_owned() },
			),
		}
	}
}
#[cfg(feature = "reqwest")]
impl ProviderRegistry {
	/// Builds the registry with one shared reqwest client.
	pub fn from_config(config: &RegistryConfig, http_client: ReqwestHttpClient) -> Result<Self> {
		Self::from_config_with::<ReqwestHttpClient, ReqwestTransportErrorMapper>(
			config,
			http_client,
			ReqwestTransportErrorMapper,
		)
	}
}
impl Debug for ProviderRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderRegistry").field("providers", &self.providers()).finish()
	}
}
