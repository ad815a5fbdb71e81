//! Demonstrates a registry holding one OAuth 1.0a and one OAuth 2.0 provider, both served by
//! a local mock, and drives each through the two-call login handshake.
//!
//! 1. Start an authorization and send the browser to [`AuthorizationSession::authorization_url`].
//! 2. Keep the session (it serializes) until the provider redirects back.
//! 3. Parse the callback query with [`CallbackParams::from_query`] and complete the login.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth_login::{
	auth::{AuthenticationResult, ProviderName},
	flows::{AuthorizationSession, CallbackParams, Oauth1Client, Oauth2Client, ProviderRegistry},
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	profile::FieldMap,
	provider::{ProviderConfig, ProviderDescriptor},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let callback = Url::parse("https://app.example.com/login/callback")?;
	let http_client = Arc::new(ReqwestHttpClient::no_redirects()?);
	let mapper = Arc::new(ReqwestTransportErrorMapper);
	let board = ProviderName::new("Board")?;
	let board_descriptor = ProviderDescriptor::oauth1(board.clone())
		.request_token_endpoint(Url::parse(&server.url("/1/OAuthGetRequestToken"))?)
		.authorization_endpoint(Url::parse(&server.url("/1/OAuthAuthorizeToken"))?)
		.access_token_endpoint(Url::parse(&server.url("/1/OAuthGetAccessToken"))?)
		.profile_endpoint(Url::parse(&server.url("/1/members/me"))?)
		.field_map(FieldMap::default().joined("idBoards", "idBoards").same("fullName"))
		.build()?;
	let code = ProviderName::new("Code")?;
	let code_descriptor = ProviderDescriptor::oauth2(code.clone())
		.authorization_endpoint(Url::parse(&server.url("/login/oauth/authorize"))?)
		.token_endpoint(Url::parse(&server.url("/login/oauth/access_token"))?)
		.profile_endpoint(Url::parse(&server.url("/user"))?)
		.field_map(FieldMap::new("id", "login").same("email"))
		.build()?;
	let board_client =
		<Oauth1Client<ReqwestHttpClient, ReqwestTransportErrorMapper>>::with_http_client(
			board_descriptor,
			ProviderConfig::new(board, "demo-consumer-key", "demo-consumer-secret")
				.with_app_display_name("Federated Login Demo"),
			Arc::clone(&http_client),
			Arc::clone(&mapper),
		)?;
	let code_client =
		<Oauth2Client<ReqwestHttpClient, ReqwestTransportErrorMapper>>::with_http_client(
			code_descriptor,
			ProviderConfig::new(code, "demo-client-id", "demo-client-secret"),
			http_client,
			mapper,
		)?;
	let mut registry = ProviderRegistry::new();

	registry.register(Arc::new(board_client))?;
	registry.register(Arc::new(code_client))?;

	for provider in registry.providers() {
		println!("External login available: {} ({}).", provider.name, provider.protocol);
	}

	server
		.mock_async(|when, then| {
			when.method(POST).path("/1/OAuthGetRequestToken");
			then.status(200).body("oauth_token=demo-request&oauth_token_secret=demo-request-secret");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/1/OAuthGetAccessToken");
			then.status(200).body("oauth_token=demo-access&oauth_token_secret=demo-access-secret");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/1/members/me");
			then.status(200).header("content-type", "application/json").body(
				"{\"id\":\"5f1c\",\"username\":\"ada\",\"fullName\":\"Ada Lovelace\",\"idBoards\":[\"b1\",\"b2\"]}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/login/oauth/access_token");
			then.status(200).body("access_token=demo-bearer&scope=&token_type=bearer");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/user").query_param("access_token", "demo-bearer");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":583231,\"login\":\"octocat\",\"email\":\"octocat@example.com\"}");
		})
		.await;

	let board_session = registry.authorization_url("Board", &callback).await?;

	println!("Redirect the browser to {}.", board_session.authorization_url);

	let board_session = round_trip(&board_session)?;
	let board_result = registry
		.complete_authorization(
			"Board",
			board_session,
			CallbackParams::from_query("oauth_token=demo-request&oauth_verifier=demo-verifier")?,
		)
		.await;

	report(&board_result);

	let code_session = registry.authorization_url("Code", &callback).await?;

	println!("Redirect the browser to {}.", code_session.authorization_url);

	let code_result = registry
		.complete_authorization("Code", code_session, CallbackParams::from_query("code=demo-code")?)
		.await;

	report(&code_result);

	let denied_session = registry.authorization_url("Code", &callback).await?;
	let denied = registry
		.complete_authorization(
			"Code",
			denied_session,
			CallbackParams::from_query("error=access_denied&error_description=User+cancelled")?,
		)
		.await;

	report(&denied);

	Ok(())
}

/// Mimics storing the session in a cookie or server-side store between the two requests.
fn round_trip(session: &AuthorizationSession) -> Result<AuthorizationSession> {
	let stored = serde_json::to_string(session)?;

	Ok(serde_json::from_str(&stored)?)
}

fn report(result: &AuthenticationResult) {
	match result.identity() {
		Some(identity) => println!(
			"{} signed in {} (id {}) with extra data {:?}.",
			result.provider_name(),
			identity.user_name,
			identity.provider_user_id,
			identity.extra_data
		),
		None =>
			if let Some(failure) = result.failure_reason() {
				println!("{} login failed: {failure}.", result.provider_name());
			},
	}
}
