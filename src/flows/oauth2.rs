//! OAuth 2.0 authorization-code adapter (authorize URL, code exchange, bearer profile
//! fetch).

// crates.io
use oauth2::{
	ClientId, ClientSecret,
	http::{
		Method,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderName, USER_AGENT},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, AuthenticatedIdentity, AuthenticationResult, FlowStage, ProviderName},
	error::ConfigError,
	flows::{self, AuthClient, AuthorizationSession, CallbackParams, FlowFuture},
	http::ProviderHttpClient,
	oauth::{self, DEFAULT_USER_AGENT, FORM_CONTENT_TYPE, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	profile::RawProfile,
	provider::{
		BearerPlacement, DefaultProviderStrategy, EndpointKind, Oauth2Endpoints, Protocol,
		ProviderConfig, ProviderDescriptor, ProviderEndpoints, ProviderStrategy,
	},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// OAuth 2.0 adapter specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ReqwestOauth2Client = Oauth2Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// OAuth 2.0 adapter bound to one provider descriptor.
///
/// The client secret travels in the token request body over TLS; nothing is signed.
pub struct Oauth2Client<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Provider descriptor (protocol checked at construction).
	pub descriptor: ProviderDescriptor,
	/// Strategy used to classify failed provider calls.
	pub strategy: Arc<dyn ProviderStrategy>,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	endpoints: Oauth2Endpoints,
	client_id: ClientId,
	client_secret: ClientSecret,
}
impl<C, M> Oauth2Client<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an adapter that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		config: ProviderConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let ProviderEndpoints::OAuth2(endpoints) = &descriptor.endpoints else {
			return Err(ConfigError::ProtocolMismatch {
				descriptor: descriptor.name.to_string(),
				expected: Protocol::OAuth2.as_str(),
			}
			.into());
		};
		let endpoints = endpoints.clone();

		descriptor.validate().map_err(ConfigError::from)?;
		config.validate_for(&descriptor)?;

		Ok(Self {
			descriptor,
			strategy: Arc::new(DefaultProviderStrategy),
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			endpoints,
			client_id: ClientId::new(config.client_id),
			client_secret: ClientSecret::new(config.client_secret.expose().to_owned()),
		})
	}

	/// Replaces the failure classification strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Authorization URL with `client_id` and `redirect_uri`; performs no I/O.
	pub fn build_authorization_url(&self, callback_url: &Url) -> Url {
		let mut url = self.endpoints.authorize.clone();

		url.query_pairs_mut()
			.append_pair("client_id", self.client_id.as_str())
			.append_pair("redirect_uri", callback_url.as_str());

		url
	}

	/// Exact bytes of the token request body.
	pub fn token_request_body(&self, code: &str, callback_url: &Url) -> String {
		oauth::form_body(&[
			("client_id", self.client_id.as_str()),
			("client_secret", self.client_secret.secret().as_str()),
			("redirect_uri", callback_url.as_str()),
			("code", code),
		])
	}

	/// Exchanges an authorization code for a bearer token.
	pub async fn exchange_code_for_token(
		&self,
		code: &str,
		callback_url: &Url,
	) -> Result<AccessCredential> {
		let body = self.token_request_body(code, callback_url);
		let headers = self.with_user_agent(vec![(CONTENT_TYPE, FORM_CONTENT_TYPE)]);
		let request =
			oauth::build_request(Method::POST, &self.endpoints.token, &headers, body.into_bytes())?;
		let response = oauth::execute(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			self.strategy.as_ref(),
			EndpointKind::Token,
			request,
		)
		.await?;
		let form =
			oauth::parse_form_response(self.strategy.as_ref(), EndpointKind::Token, &response)?;

		Ok(AccessCredential::bearer(oauth::required_param(
			&form,
			EndpointKind::Token,
			"access_token",
		)?))
	}

	/// Fetches the profile with a bearer token.
	pub async fn fetch_profile(&self, credential: &AccessCredential) -> Result<RawProfile> {
		let AccessCredential::Bearer(token) = credential else {
			return Err(ConfigError::ProtocolMismatch {
				descriptor: self.descriptor.name.to_string(),
				expected: Protocol::OAuth2.as_str(),
			}
			.into());
		};
		let mut url = self.endpoints.profile.clone();
		let bearer;
		let mut headers = vec![(ACCEPT, "application/json")];

		match self.descriptor.quirks.bearer_placement {
			BearerPlacement::QueryParameter => {
				url.query_pairs_mut().append_pair("access_token", token.secret());
			},
			BearerPlacement::AuthorizationHeader => {
				bearer = format!("Bearer {}", token.secret());

				headers.push((AUTHORIZATION, bearer.as_str()));
			},
		}

		let headers = self.with_user_agent(headers);
		let request = oauth::build_request(Method::GET, &url, &headers, Vec::new())?;
		let response = oauth::execute(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			self.strategy.as_ref(),
			EndpointKind::Profile,
			request,
		)
		.await?;

		RawProfile::from_slice(response.body())
	}

	/// Runs the code exchange, the profile fetch, and normalization.
	///
	/// Never fails: every error is captured in the returned [`AuthenticationResult`].
	pub async fn verify(&self, code: &str, callback_url: &Url) -> AuthenticationResult {
		let mut stage = FlowStage::CallbackReceived;
		let span = FlowSpan::new(FlowKind::Oauth2, &self.descriptor.name, stage);
		let outcome =
			span.instrument(self.verify_inner(code, callback_url, &span, &mut stage)).await;

		flows::finish(FlowKind::Oauth2, &self.descriptor.name, stage, outcome)
	}

	async fn verify_inner(
		&self,
		code: &str,
		callback_url: &Url,
		span: &FlowSpan,
		stage: &mut FlowStage,
	) -> Result<AuthenticatedIdentity> {
		let credential = span
			.step(*stage)
			.instrument(self.exchange_code_for_token(code, callback_url))
			.await?;

		*stage = FlowStage::TokenExchanged;

		let profile = span.step(*stage).instrument(self.fetch_profile(&credential)).await?;

		drop(credential);

		*stage = FlowStage::ProfileFetched;

		Ok(span.step(*stage).in_scope(|| self.descriptor.field_map.normalize(&profile))?)
	}

	fn with_user_agent<'a>(
		&'a self,
		mut headers: Vec<(HeaderName, &'a str)>,
	) -> Vec<(HeaderName, &'a str)> {
		headers.push((
			USER_AGENT,
			self.descriptor.quirks.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
		));

		headers
	}

	fn fail_callback(&self, error: Error) -> AuthenticationResult {
		flows::finish(
			FlowKind::Oauth2,
			&self.descriptor.name,
			FlowStage::AuthorizationRequested,
			Err(error),
		)
	}
}
#[cfg(feature = "reqwest")]
impl Oauth2Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an adapter backed by a default reqwest client.
	pub fn new(descriptor: ProviderDescriptor, config: ProviderConfig) -> Result<Self> {
		Self::with_http_client(
			descriptor,
			config,
			ReqwestHttpClient::default(),
			ReqwestTransportErrorMapper,
		)
	}
}
impl<C, M> AuthClient for Oauth2Client<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn provider_name(&self) -> &ProviderName {
		&self.descriptor.name
	}

	fn protocol(&self) -> Protocol {
		Protocol::OAuth2
	}

	fn start_authorization<'a>(
		&'a self,
		callback_url: &'a Url,
	) -> FlowFuture<'a, Result<AuthorizationSession>> {
		Box::pin(async move {
			obs::record_flow_outcome(FlowKind::Oauth2, FlowOutcome::Attempt);

			if let Err(e) = flows::validate_callback_url(callback_url) {
				obs::record_flow_outcome(FlowKind::Oauth2, FlowOutcome::Failure);

				return Err(e.into());
			}

			Ok(AuthorizationSession {
				provider: self.descriptor.name.clone(),
				authorization_url: self.build_authorization_url(callback_url),
				callback_url: callback_url.clone(),
				pending: None,
			})
		})
	}

	fn complete_authorization(
		&self,
		session: AuthorizationSession,
		params: CallbackParams,
	) -> FlowFuture<'_, AuthenticationResult> {
		Box::pin(async move {
			match params {
				CallbackParams::OAuth2 { code } =>
					self.verify(code.secret(), &session.callback_url).await,
				CallbackParams::Denied { error, description } =>
					self.fail_callback(CallbackParams::denial(&error, description.as_deref())),
				CallbackParams::OAuth1 { .. } => self.fail_callback(Error::InvalidCallback {
					reason: "OAuth 2.0 providers expect a code, not an oauth_verifier".into(),
				}),
			}
		})
	}
}
impl<C, M> Debug for Oauth2Client<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Oauth2Client")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.finish()
	}
}
