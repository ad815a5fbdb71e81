// std
use std::{
	collections::VecDeque,
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::{Arc, Mutex},
};
// self
use oauth_login::{
	auth::{AccessCredential, FlowStage, ProviderName},
	error::{ConfigError, Error, Result, TransportError},
	flows::{AuthClient, CallbackParams, Oauth1Client, Oauth2Client},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode},
	},
	profile::FieldMap,
	provider::{
		BearerPlacement, EndpointKind, ProviderConfig, ProviderDescriptor, ProviderQuirks,
	},
	url::Url,
};

const CALLBACK: &str = "https://app.example.com/callback";

#[derive(Debug)]
enum FakeTransportError {
	Unreachable,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Unreachable => write!(f, "Provider unreachable."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Debug)]
struct CapturedRequest {
	method: String,
	uri: String,
	authorization: Option<String>,
	user_agent: Option<String>,
	content_type: Option<String>,
	body: Vec<u8>,
}
impl CapturedRequest {
	fn from_request(request: &HttpRequest) -> Self {
		let header = |name: &str| {
			request.headers().get(name).and_then(|value| value.to_str().ok()).map(str::to_owned)
		};

		Self {
			method: request.method().to_string(),
			uri: request.uri().to_string(),
			authorization: header("authorization"),
			user_agent: header("user-agent"),
			content_type: header("content-type"),
			body: request.body().clone(),
		}
	}
}

enum Scripted {
	Respond(u16, &'static str),
	Fail,
}

#[derive(Clone, Default)]
struct FakeHttpClient {
	script: Arc<Mutex<VecDeque<Scripted>>>,
	captured: Arc<Mutex<Vec<CapturedRequest>>>,
}
impl FakeHttpClient {
	fn scripted(script: impl IntoIterator<Item = Scripted>) -> Self {
		Self {
			script: Arc::new(Mutex::new(script.into_iter().collect())),
			captured: Default::default(),
		}
	}

	fn captured(&self) -> Vec<CapturedRequest> {
		self.captured.lock().expect("Captured request lock should not be poisoned.").clone()
	}
}
impl ProviderHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { client: self.clone(), slot }
	}
}

struct FakeHttpHandle {
	client: FakeHttpClient,
	slot: ResponseMetadataSlot,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			assert!(
				self.slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);

			self.client
				.captured
				.lock()
				.expect("Captured request lock should not be poisoned.")
				.push(CapturedRequest::from_request(&request));

			let next = self
				.client
				.script
				.lock()
				.expect("Script lock should not be poisoned.")
				.pop_front()
				.expect("Every request should have a scripted response.");

			match next {
				Scripted::Respond(status, body) => {
					self.slot.store(ResponseMetadata { status: Some(status) });

					let mut response = HttpResponse::new(body.as_bytes().to_vec());

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Scripted status should be valid.");

					Ok(response)
				},
				Scripted::Fail => Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Unreachable))),
			}
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	metadata: Arc<Mutex<Vec<Option<ResponseMetadata>>>>,
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: EndpointKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		self.metadata.lock().expect("Metadata lock should not be poisoned.").push(meta.cloned());

		match err {
			HttpClientError::Reqwest(inner) => TransportError::network(endpoint, *inner).into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			other => TransportError::Other { endpoint, message: format!("{other:?}") }.into(),
		}
	}
}

fn name(value: &str) -> ProviderName {
	ProviderName::new(value).expect("Provider name fixture should be valid.")
}

fn url(value: &str) -> Url {
	Url::parse(value).expect("URL fixture should parse.")
}

fn oauth1_descriptor() -> ProviderDescriptor {
	ProviderDescriptor::oauth1(name("Trello"))
		.request_token_endpoint(url("https://provider.test/1/OAuthGetRequestToken"))
		.authorization_endpoint(url("https://provider.test/1/OAuthAuthorizeToken"))
		.access_token_endpoint(url("https://provider.test/1/OAuthGetAccessToken"))
		.profile_endpoint(url("https://api.provider.test/1/members/me"))
		.field_map(FieldMap::default().collect_remaining())
		.build()
		.expect("OAuth 1.0a descriptor should build.")
}

fn oauth2_descriptor(quirks: ProviderQuirks) -> ProviderDescriptor {
	ProviderDescriptor::oauth2(name("GitHub"))
		.authorization_endpoint(url("https://provider.test/login/oauth/authorize"))
		.token_endpoint(url("https://provider.test/login/oauth/access_token"))
		.profile_endpoint(url("https://api.provider.test/user"))
		.field_map(FieldMap::new("id", "login").same("email"))
		.quirks(quirks)
		.build()
		.expect("OAuth 2.0 descriptor should build.")
}

fn oauth1_client(
	http: FakeHttpClient,
) -> Oauth1Client<FakeHttpClient, RecordingTransportErrorMapper> {
	let config = ProviderConfig::new(name("Trello"), "consumer-key", "consumer-secret")
		.with_app_display_name("Custom OAuth Provider");

	Oauth1Client::with_http_client(
		oauth1_descriptor(),
		config,
		http,
		RecordingTransportErrorMapper::default(),
	)
	.expect("OAuth 1.0a client should build.")
}

fn oauth2_client(
	http: FakeHttpClient,
	quirks: ProviderQuirks,
	mapper: RecordingTransportErrorMapper,
) -> Oauth2Client<FakeHttpClient, RecordingTransportErrorMapper> {
	let config = ProviderConfig::new(name("GitHub"), "gh-client", "gh-secret");

	Oauth2Client::with_http_client(oauth2_descriptor(quirks), config, http, mapper)
		.expect("OAuth 2.0 client should build.")
}

#[tokio::test]
async fn token_request_body_is_byte_identical_across_calls() {
	let http = FakeHttpClient::scripted([
		Scripted::Respond(200, "access_token=abc123&scope=&token_type=bearer"),
		Scripted::Respond(200, "access_token=abc123&scope=&token_type=bearer"),
	]);
	let client = oauth2_client(http.clone(), ProviderQuirks::default(), Default::default());
	let callback = url(CALLBACK);

	for _ in 0..2 {
		let credential = client
			.exchange_code_for_token("abc", &callback)
			.await
			.expect("Code exchange should succeed.");

		assert_eq!(credential.token(), "abc123");
	}

	let captured = http.captured();

	assert_eq!(captured.len(), 2);
	assert_eq!(captured[0].body, captured[1].body);
	assert_eq!(
		String::from_utf8(captured[0].body.clone()).expect("Body should be UTF-8."),
		"client_id=gh-client&client_secret=gh-secret&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback&code=abc"
	);
	assert_eq!(captured[0].method, "POST");
	assert_eq!(captured[0].content_type.as_deref(), Some("application/x-www-form-urlencoded"));
	assert!(captured[0].user_agent.is_some());
}

#[tokio::test]
async fn oauth1_authorization_requests_are_independent() {
	let http = FakeHttpClient::scripted([
		Scripted::Respond(200, "oauth_token=tok1&oauth_token_secret=sec1&oauth_callback_confirmed=true"),
		Scripted::Respond(200, "oauth_token=tok2&oauth_token_secret=sec2&oauth_callback_confirmed=true"),
	]);
	let client = oauth1_client(http.clone());
	let callback = url(CALLBACK);
	let first =
		client.build_authorization_url(&callback).await.expect("First session should start.");
	let second =
		client.build_authorization_url(&callback).await.expect("Second session should start.");
	let first_pending = first.pending.expect("OAuth 1.0a sessions carry pending credentials.");
	let second_pending = second.pending.expect("OAuth 1.0a sessions carry pending credentials.");

	assert_eq!(first_pending.token, "tok1");
	assert_eq!(first_pending.secret.expose(), "sec1");
	assert_eq!(second_pending.token, "tok2");
	assert_ne!(first.authorization_url, second.authorization_url);

	let captured = http.captured();
	let first_header =
		captured[0].authorization.clone().expect("Request token call should be signed.");
	let second_header =
		captured[1].authorization.clone().expect("Request token call should be signed.");

	assert_eq!(captured[0].method, "POST");
	assert!(first_header.starts_with("OAuth "));
	assert!(first_header.contains("oauth_callback=\"https%3A%2F%2Fapp.example.com%2Fcallback\""));
	assert!(first_header.contains("oauth_signature_method=\"HMAC-SHA1\""));
	assert!(first_header.contains("oauth_consumer_key=\"consumer-key\""));
	assert!(!first_header.contains("oauth_token="));
	assert_ne!(first_header, second_header, "Each request must carry a fresh nonce.");
}

#[tokio::test]
async fn oauth1_legs_sign_with_the_matching_credentials() {
	let http = FakeHttpClient::scripted([
		Scripted::Respond(200, "oauth_token=tok1&oauth_token_secret=sec1"),
		Scripted::Respond(200, "oauth_token=acc1&oauth_token_secret=accsec1"),
		Scripted::Respond(
			200,
			r#"{"id":"4f1","username":"ada","fullName":"Ada Lovelace","idBoards":["b1","b2"],"prefs":{"x":1}}"#,
		),
	]);
	let client = oauth1_client(http.clone());
	let session = client
		.start_authorization(&url(CALLBACK))
		.await
		.expect("Session should start.");
	let result = client
		.complete_authorization(session, CallbackParams::oauth1(Some("tok1".into()), "ver1"))
		.await;

	assert!(result.is_successful(), "Unexpected failure: {:?}", result.failure_reason());
	assert_eq!(result.provider_user_id().map(|id| &**id), Some("4f1"));
	assert_eq!(result.user_name(), Some("ada"));

	let extra = result.extra_data().expect("Successful results carry extra data.");

	assert_eq!(extra.get("fullName").map(String::as_str), Some("Ada Lovelace"));
	assert_eq!(extra.get("idBoards").map(String::as_str), Some("b1, b2"));
	assert!(!extra.contains_key("prefs"));

	let captured = http.captured();
	let access = captured[1].authorization.clone().expect("Access token call should be signed.");
	let profile = captured[2].authorization.clone().expect("Profile call should be signed.");

	assert!(access.contains("oauth_token=\"tok1\""));
	assert!(access.contains("oauth_verifier=\"ver1\""));
	assert_eq!(captured[2].method, "GET");
	assert!(profile.contains("oauth_token=\"acc1\""));
	assert!(!profile.contains("oauth_verifier"));
}

#[tokio::test]
async fn mismatched_callback_token_fails_before_any_exchange() {
	let http = FakeHttpClient::scripted([Scripted::Respond(200, "oauth_token=tok1&oauth_token_secret=sec1")]);
	let client = oauth1_client(http.clone());
	let session = client.start_authorization(&url(CALLBACK)).await.expect("Session should start.");
	let result = client
		.complete_authorization(session, CallbackParams::oauth1(Some("forged".into()), "ver1"))
		.await;
	let failure = result.failure_reason().expect("Forged tokens must fail.");

	assert!(matches!(failure.error, Error::InvalidCallback { .. }));
	assert_eq!(failure.stage, FlowStage::AuthorizationRequested);
	assert_eq!(http.captured().len(), 1);
}

#[tokio::test]
async fn network_failures_surface_as_transport_errors_with_stage() {
	let mapper = RecordingTransportErrorMapper::default();
	let http = FakeHttpClient::scripted([
		Scripted::Respond(200, "access_token=abc123"),
		Scripted::Fail,
	]);
	let client = oauth2_client(http, ProviderQuirks::default(), mapper.clone());
	let result = client.verify("abc", &url(CALLBACK)).await;
	let failure = result.failure_reason().expect("Unreachable profile endpoint must fail.");

	assert!(matches!(
		failure.error,
		Error::Transport(TransportError::Network { endpoint: EndpointKind::Profile, .. })
	));
	assert_eq!(failure.stage, FlowStage::TokenExchanged);
	assert!(!failure.to_string().is_empty());

	let recorded = mapper.metadata.lock().expect("Metadata lock should not be poisoned.").clone();

	assert_eq!(recorded.len(), 1);
	assert!(recorded[0].is_none(), "Metadata must not leak from the token call.");
}

#[tokio::test]
async fn bearer_token_can_travel_in_the_authorization_header() {
	let http = FakeHttpClient::scripted([Scripted::Respond(200, r#"{"id":1,"login":"octocat"}"#)]);
	let quirks = ProviderQuirks {
		user_agent: Some("login-tests".into()),
		bearer_placement: BearerPlacement::AuthorizationHeader,
	};
	let client = oauth2_client(http.clone(), quirks, Default::default());
	let profile = client
		.fetch_profile(&AccessCredential::bearer("abc123"))
		.await
		.expect("Profile fetch should succeed.");
	let captured = http.captured();

	assert_eq!(profile.get("login").and_then(|v| v.as_str()), Some("octocat"));
	assert_eq!(captured[0].authorization.as_deref(), Some("Bearer abc123"));
	assert_eq!(captured[0].uri, "https://api.provider.test/user");
	assert_eq!(captured[0].user_agent.as_deref(), Some("login-tests"));
}
