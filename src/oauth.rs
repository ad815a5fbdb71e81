//! Shared plumbing for provider round trips: request construction, dispatch through a
//! [`ProviderHttpClient`], status classification, and form-encoded body decoding.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{self, Method, header::HeaderName},
};
use serde_json::Value;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, MalformedResponseError, TransportError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{EndpointKind, ProviderErrorContext, ProviderErrorKind, ProviderStrategy},
};

/// `User-Agent` sent when a provider does not configure its own.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
/// Content type of OAuth form posts.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		endpoint: EndpointKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: EndpointKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) =>
				if inner.is_builder() {
					ConfigError::from(*inner).into()
				} else {
					TransportError::network(endpoint, *inner).into()
				},
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(endpoint, meta, message),
			_ => map_generic_transport_error(endpoint, meta, "unrecognized transport failure"),
		}
	}
}

/// Builds a provider request from its parts.
pub(crate) fn build_request(
	method: Method,
	url: &Url,
	headers: &[(HeaderName, &str)],
	body: Vec<u8>,
) -> Result<HttpRequest> {
	let mut builder = http::Request::builder().method(method).uri(url.as_str());

	for (name, value) in headers {
		builder = builder.header(name, *value);
	}

	Ok(builder.body(body).map_err(ConfigError::from)?)
}

/// Dispatches `request` and returns the response when the provider answered 2xx.
///
/// Transport failures go through `mapper`; non-2xx responses are classified by `strategy`.
pub(crate) async fn execute<C, M>(
	http_client: &C,
	mapper: &M,
	strategy: &dyn ProviderStrategy,
	endpoint: EndpointKind,
	request: HttpRequest,
) -> Result<HttpResponse>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let slot = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(slot.clone());
	let response = handle
		.call(request)
		.await
		.map_err(|err| mapper.map_transport_error(endpoint, slot.take().as_ref(), err))?;
	let status = response.status();

	if !status.is_success() {
		let ctx = error_context(endpoint, status.as_u16(), response.body());

		return Err(classify_failure(strategy, ctx));
	}

	Ok(response)
}

/// Serializes `pairs` as an `application/x-www-form-urlencoded` body, preserving order.
pub(crate) fn form_body(pairs: &[(&str, &str)]) -> String {
	form_urlencoded::Serializer::new(String::new()).extend_pairs(pairs).finish()
}

/// Decodes a form-encoded body; the last occurrence of a repeated key wins.
pub(crate) fn parse_form(body: &[u8]) -> BTreeMap<String, String> {
	form_urlencoded::parse(body).into_owned().collect()
}

/// Decodes a successful form-encoded response, turning embedded OAuth errors into failures.
///
/// GitHub reports a bad authorization code as `error=bad_verification_code` with HTTP 200,
/// and OAuth 1.0a providers may report `oauth_problem` the same way.
pub(crate) fn parse_form_response(
	strategy: &dyn ProviderStrategy,
	endpoint: EndpointKind,
	response: &HttpResponse,
) -> Result<BTreeMap<String, String>> {
	let form = parse_form(response.body());

	if form.contains_key("error") || form.contains_key("oauth_problem") {
		let ctx = error_context(endpoint, response.status().as_u16(), response.body());

		return Err(classify_failure(strategy, ctx));
	}

	Ok(form)
}

/// Extracts a mandatory, non-empty parameter from a decoded form.
pub(crate) fn required_param(
	form: &BTreeMap<String, String>,
	endpoint: EndpointKind,
	parameter: &'static str,
) -> Result<String> {
	form.get(parameter)
		.filter(|value| !value.is_empty())
		.cloned()
		.ok_or_else(|| MalformedResponseError::MissingParameter { endpoint, parameter }.into())
}

/// Turns a failure context into a crate error according to `strategy`.
pub(crate) fn classify_failure(strategy: &dyn ProviderStrategy, ctx: ProviderErrorContext) -> Error {
	match strategy.classify_error(&ctx) {
		ProviderErrorKind::Rejected =>
			Error::ProviderRejected { endpoint: ctx.endpoint, reason: ctx.reason() },
		ProviderErrorKind::Transport => match ctx.http_status {
			Some(status) if !(200..300).contains(&status) => TransportError::Status {
				endpoint: ctx.endpoint,
				status,
				body_preview: ctx.body_preview,
			}
			.into(),
			_ => TransportError::Other { endpoint: ctx.endpoint, message: ctx.reason() }.into(),
		},
	}
}

fn error_context(endpoint: EndpointKind, status: u16, body: &[u8]) -> ProviderErrorContext {
	let mut ctx = ProviderErrorContext::new(endpoint).with_http_status(status);
	let text = String::from_utf8_lossy(body);

	if !text.trim().is_empty() {
		ctx = ctx.with_body_preview(text.into_owned());
	}

	let (error, description) = error_fields(body);

	if let Some(error) = error {
		ctx = ctx.with_oauth_error(error);
	}
	if let Some(description) = description {
		ctx = ctx.with_error_description(description);
	}

	ctx
}

fn error_fields(body: &[u8]) -> (Option<String>, Option<String>) {
	if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
		let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_owned);

		return (field("error"), field("error_description").or_else(|| field("message")));
	}

	let mut form = parse_form(body);
	let error = form.remove("oauth_problem").or_else(|| form.remove("error"));
	let description =
		form.remove("error_description").or_else(|| form.remove("oauth_problem_advice"));

	(error, description)
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(
	endpoint: EndpointKind,
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> Error {
	let message = match meta.and_then(|value| value.status) {
		Some(status) => format!("{message} (after HTTP {status})"),
		None => message.to_string(),
	};

	TransportError::Other { endpoint, message }.into()
}
