//! Three-legged OAuth 1.0a adapter (temporary credentials, authorization, token
//! credentials, signed profile fetch).

// crates.io
use oauth2::{
	HttpResponse,
	http::{
		Method,
		header::{ACCEPT, AUTHORIZATION, HeaderName, USER_AGENT},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{
		AccessCredential, AuthenticatedIdentity, AuthenticationResult, FlowStage, ProviderName,
		TokenSecret,
	},
	error::ConfigError,
	flows::{self, AuthClient, AuthorizationSession, CallbackParams, FlowFuture},
	http::ProviderHttpClient,
	oauth::{self, TransportErrorMapper},
	oauth1::{Oauth1Signer, SigningToken},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	profile::RawProfile,
	provider::{
		DefaultProviderStrategy, EndpointKind, Oauth1Endpoints, Protocol, ProviderConfig,
		ProviderDescriptor, ProviderEndpoints, ProviderStrategy,
	},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// OAuth 1.0a adapter specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ReqwestOauth1Client = Oauth1Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Temporary credentials issued between the request-token and access-token legs.
///
/// Consumed by value when the callback is processed, so a request token can never be
/// exchanged twice through the same value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
	/// Temporary `oauth_token`.
	pub token: String,
	/// Temporary `oauth_token_secret`.
	pub secret: TokenSecret,
}

/// OAuth 1.0a adapter bound to one provider descriptor.
pub struct Oauth1Client<C, M>
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
	endpoints: Oauth1Endpoints,
	signer: Oauth1Signer,
	app_display_name: String,
}
impl<C, M> Oauth1Client<C, M>
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
		let ProviderEndpoints::OAuth1(endpoints) = &descriptor.endpoints else {
			return Err(ConfigError::ProtocolMismatch {
				descriptor: descriptor.name.to_string(),
				expected: Protocol::OAuth1.as_str(),
			}
			.into());
		};
		let endpoints = endpoints.clone();

		descriptor.validate().map_err(ConfigError::from)?;
		config.validate_for(&descriptor)?;

		let signer =
			Oauth1Signer::new(config.client_id, config.client_secret, endpoints.signature_method);
		let app_display_name = config.app_display_name.unwrap_or_default();

		Ok(Self {
			descriptor,
			strategy: Arc::new(DefaultProviderStrategy),
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			endpoints,
			signer,
			app_display_name,
		})
	}

	/// Replaces the failure classification strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Obtains temporary credentials and the authorization URL for `callback_url`.
	///
	/// Every call performs a fresh request-token round trip, so two calls never share a
	/// [`PendingAuthorization`].
	pub async fn build_authorization_url(&self, callback_url: &Url) -> Result<AuthorizationSession> {
		obs::record_flow_outcome(FlowKind::Oauth1, FlowOutcome::Attempt);

		let span = FlowSpan::new(FlowKind::Oauth1, &self.descriptor.name, FlowStage::Start);
		let result = span
			.instrument(async {
				flows::validate_callback_url(callback_url)?;

				let pending = self.request_temporary_credentials(callback_url).await?;

				Ok::<_, Error>(AuthorizationSession {
					provider: self.descriptor.name.clone(),
					authorization_url: self.authorize_url(&pending),
					callback_url: callback_url.clone(),
					pending: Some(pending),
				})
			})
			.await;

		if result.is_err() {
			obs::record_flow_outcome(FlowKind::Oauth1, FlowOutcome::Failure);
		}

		result
	}

	/// Signed POST to the request-token endpoint carrying `oauth_callback`.
	pub async fn request_temporary_credentials(
		&self,
		callback_url: &Url,
	) -> Result<PendingAuthorization> {
		let response = self
			.signed_call(
				EndpointKind::RequestToken,
				Method::POST,
				&self.endpoints.request_token,
				None,
				&[("oauth_callback", callback_url.as_str())],
			)
			.await?;
		let form = oauth::parse_form_response(
			self.strategy.as_ref(),
			EndpointKind::RequestToken,
			&response,
		)?;
		let token = oauth::required_param(&form, EndpointKind::RequestToken, "oauth_token")?;
		let secret = form.get("oauth_token_secret").cloned().unwrap_or_default();

		Ok(PendingAuthorization { token, secret: TokenSecret::new(secret) })
	}

	/// Authorization URL carrying the app display name and the temporary token.
	pub fn authorize_url(&self, pending: &PendingAuthorization) -> Url {
		let mut url = self.endpoints.authorize.clone();

		url.query_pairs_mut()
			.append_pair("name", &self.app_display_name)
			.append_pair("oauth_token", &pending.token);

		url
	}

	/// Exchanges the temporary credentials and verifier for token credentials.
	pub async fn exchange_verifier(
		&self,
		pending: PendingAuthorization,
		verifier: &str,
	) -> Result<AccessCredential> {
		let response = self
			.signed_call(
				EndpointKind::AccessToken,
				Method::POST,
				&self.endpoints.access_token,
				Some(SigningToken { token: &pending.token, secret: pending.secret.expose() }),
				&[("oauth_verifier", verifier)],
			)
			.await?;
		let form =
			oauth::parse_form_response(self.strategy.as_ref(), EndpointKind::AccessToken, &response)?;
		let token = oauth::required_param(&form, EndpointKind::AccessToken, "oauth_token")?;
		let secret = form.get("oauth_token_secret").cloned().unwrap_or_default();

		Ok(AccessCredential::OAuth1 { token, secret: TokenSecret::new(secret) })
	}

	/// Signed GET to the profile endpoint using token credentials.
	pub async fn fetch_profile(&self, credential: &AccessCredential) -> Result<RawProfile> {
		let AccessCredential::OAuth1 { token, secret } = credential else {
			return Err(ConfigError::ProtocolMismatch {
				descriptor: self.descriptor.name.to_string(),
				expected: Protocol::OAuth1.as_str(),
			}
			.into());
		};
		let response = self
			.signed_call(
				EndpointKind::Profile,
				Method::GET,
				&self.endpoints.profile,
				Some(SigningToken { token, secret: secret.expose() }),
				&[],
			)
			.await?;

		RawProfile::from_slice(response.body())
	}

	/// Runs the access-token exchange, the profile fetch, and normalization.
	///
	/// Never fails: every error is captured in the returned [`AuthenticationResult`].
	pub async fn verify_and_fetch_profile(
		&self,
		pending: PendingAuthorization,
		verifier: &str,
	) -> AuthenticationResult {
		let mut stage = FlowStage::CallbackReceived;
		let span = FlowSpan::new(FlowKind::Oauth1, &self.descriptor.name, stage);
		let outcome =
			span.instrument(self.verify_inner(pending, verifier, &span, &mut stage)).await;

		flows::finish(FlowKind::Oauth1, &self.descriptor.name, stage, outcome)
	}

	/// Checks the callback against the pending credentials, then verifies.
	pub async fn complete(
		&self,
		pending: PendingAuthorization,
		params: CallbackParams,
	) -> AuthenticationResult {
		match params {
			CallbackParams::OAuth1 { oauth_token: Some(token), .. } if token != pending.token =>
				self.fail_callback(Error::InvalidCallback {
					reason: "callback oauth_token does not match the pending request token".into(),
				}),
			CallbackParams::OAuth1 { oauth_verifier, .. } =>
				self.verify_and_fetch_profile(pending, &oauth_verifier).await,
			CallbackParams::Denied { error, description } =>
				self.fail_callback(CallbackParams::denial(&error, description.as_deref())),
			CallbackParams::OAuth2 { .. } => self.fail_callback(Error::InvalidCallback {
				reason: "OAuth 1.0a providers expect an oauth_verifier, not a code".into(),
			}),
		}
	}

	async fn verify_inner(
		&self,
		pending: PendingAuthorization,
		verifier: &str,
		span: &FlowSpan,
		stage: &mut FlowStage,
	) -> Result<AuthenticatedIdentity> {
		let credential =
			span.step(*stage).instrument(self.exchange_verifier(pending, verifier)).await?;

		*stage = FlowStage::TokenExchanged;

		let profile = span.step(*stage).instrument(self.fetch_profile(&credential)).await?;

		drop(credential);

		*stage = FlowStage::ProfileFetched;

		Ok(span.step(*stage).in_scope(|| self.descriptor.field_map.normalize(&profile))?)
	}

	fn fail_callback(&self, error: Error) -> AuthenticationResult {
		flows::finish(
			FlowKind::Oauth1,
			&self.descriptor.name,
			FlowStage::AuthorizationRequested,
			Err(error),
		)
	}

	async fn signed_call(
		&self,
		endpoint: EndpointKind,
		method: Method,
		url: &Url,
		token: Option<SigningToken<'_>>,
		protocol_params: &[(&str, &str)],
	) -> Result<HttpResponse> {
		let authorization =
			self.signer.authorization_header(method.as_str(), url, token, protocol_params)?;
		let mut headers: Vec<(HeaderName, &str)> = vec![(AUTHORIZATION, authorization.as_str())];

		if endpoint == EndpointKind::Profile {
			headers.push((ACCEPT, "application/json"));
		}
		if let Some(user_agent) = self.descriptor.quirks.user_agent.as_deref() {
			headers.push((USER_AGENT, user_agent));
		}

		let request = oauth::build_request(method, url, &headers, Vec::new())?;

		oauth::execute(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			self.strategy.as_ref(),
			endpoint,
			request,
		)
		.await
	}
}
#[cfg(feature = "reqwest")]
impl Oauth1Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
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
impl<C, M> AuthClient for Oauth1Client<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn provider_name(&self) -> &ProviderName {
		&self.descriptor.name
	}

	fn protocol(&self) -> Protocol {
		Protocol::OAuth1
	}

	fn start_authorization<'a>(
		&'a self,
		callback_url: &'a Url,
	) -> FlowFuture<'a, Result<AuthorizationSession>> {
		Box::pin(self.build_authorization_url(callback_url))
	}

	fn complete_authorization(
		&self,
		session: AuthorizationSession,
		params: CallbackParams,
	) -> FlowFuture<'_, AuthenticationResult> {
		Box::pin(async move {
			match session.pending {
				Some(pending) => self.complete(pending, params).await,
				None => self.fail_callback(Error::InvalidCallback {
					reason: "session carries no pending request token".into(),
				}),
			}
		})
	}
}
impl<C, M> Debug for Oauth1Client<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Oauth1Client")
			.field("descriptor", &self.descriptor)
			.field("signer", &self.signer)
			.field("app_display_name", &self.app_display_name)
			.finish()
	}
}
