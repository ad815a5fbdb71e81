//! Provider strategy hooks that classify failed provider calls.
//!
//! Adapters describe every failure with a [`ProviderErrorContext`] made of plain data
//! (endpoint, status, OAuth error fields, body preview) and let a [`ProviderStrategy`]
//! decide whether the provider refused the credential or the call simply failed.

// self
use crate::{_prelude::*, provider::EndpointKind};

/// Strategy hook that lets providers override error classification.
///
/// Implementors are required to be `Send + Sync` so adapters can share them behind `Arc`.
pub trait ProviderStrategy: Send + Sync {
	/// Classifies a failed provider call.
	fn classify_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;
}

/// Canonical provider error categories used by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// Provider refused the token, verifier, or authorization code.
	Rejected,
	/// Network failure or unexpected status; the credential itself was not judged.
	Transport,
}

/// Context passed to provider strategies when classifying failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// Endpoint associated with the failing request.
	pub endpoint: EndpointKind,
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// Provider-supplied `error` (OAuth 2.0) or `oauth_problem` (OAuth 1.0a) field.
	pub oauth_error: Option<String>,
	/// Provider-supplied `error_description` field.
	pub error_description: Option<String>,
	/// Preview of the response body.
	pub body_preview: Option<String>,
}
impl ProviderErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a new context scoped to the provided endpoint.
	pub fn new(endpoint: EndpointKind) -> Self {
		Self {
			endpoint,
			http_status: None,
			oauth_error: None,
			error_description: None,
			body_preview: None,
		}
	}

	/// Adds an HTTP status code.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds a truncated body preview.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}

	/// Best human-readable reason available in the context.
	pub fn reason(&self) -> String {
		match (&self.oauth_error, &self.error_description) {
			(Some(error), Some(description)) => format!("{error} ({description})"),
			(Some(error), None) => error.clone(),
			(None, Some(description)) => description.clone(),
			(None, None) => match (self.http_status, &self.body_preview) {
				(_, Some(body)) if !body.trim().is_empty() => body.trim().to_owned(),
				(Some(status), _) => format!("HTTP {status}"),
				(None, _) => "no reason given".into(),
			},
		}
	}
}

/// Default strategy shared by the built-in providers.
///
/// A non-2xx answer from the request-token endpoint is always a transport failure, since
/// no user credential has been presented yet. Elsewhere structured OAuth error fields win,
/// then the status code. Server-side failures (`server_error`, `temporarily_unavailable`,
/// 5xx) are never treated as rejections.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn classify_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		if ctx.endpoint == EndpointKind::RequestToken
			&& ctx.http_status.is_some_and(|status| !(200..300).contains(&status))
		{
			return ProviderErrorKind::Transport;
		}
		if let Some(error) = ctx.oauth_error.as_deref() {
			return classify_oauth_error(error);
		}

		classify_status(ctx.endpoint, ctx.http_status)
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProviderErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= ProviderErrorContext::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}

fn classify_oauth_error(value: &str) -> ProviderErrorKind {
	if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		ProviderErrorKind::Transport
	} else {
		ProviderErrorKind::Rejected
	}
}

fn classify_status(endpoint: EndpointKind, status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(401 | 403) => ProviderErrorKind::Rejected,
		Some(400) if endpoint.is_token_exchange() => ProviderErrorKind::Rejected,
		_ => ProviderErrorKind::Transport,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oauth_errors_are_rejections_unless_server_side() {
		let strategy = DefaultProviderStrategy;
		let ctx = ProviderErrorContext::new(EndpointKind::Token)
			.with_http_status(200)
			.with_oauth_error("bad_verification_code");

		assert_eq!(strategy.classify_error(&ctx), ProviderErrorKind::Rejected);

		let ctx = ProviderErrorContext::new(EndpointKind::AccessToken)
			.with_http_status(401)
			.with_oauth_error("verifier_invalid");

		assert_eq!(strategy.classify_error(&ctx), ProviderErrorKind::Rejected);

		let ctx = ProviderErrorContext::new(EndpointKind::Token)
			.with_http_status(503)
			.with_oauth_error("temporarily_unavailable");

		assert_eq!(strategy.classify_error(&ctx), ProviderErrorKind::Transport);
	}

	#[test]
	fn status_codes_fall_back_by_endpoint() {
		let strategy = DefaultProviderStrategy;

		for (endpoint, status, expected) in [
			(EndpointKind::AccessToken, 401, ProviderErrorKind::Rejected),
			(EndpointKind::AccessToken, 400, ProviderErrorKind::Rejected),
			(EndpointKind::Profile, 403, ProviderErrorKind::Rejected),
			(EndpointKind::Profile, 400, ProviderErrorKind::Transport),
			(EndpointKind::Profile, 500, ProviderErrorKind::Transport),
			(EndpointKind::Token, 502, ProviderErrorKind::Transport),
			(EndpointKind::Token, 404, ProviderErrorKind::Transport),
		] {
			let ctx = ProviderErrorContext::new(endpoint).with_http_status(status);

			assert_eq!(strategy.classify_error(&ctx), expected, "{endpoint} answering {status}");
		}
	}

	#[test]
	fn request_token_failures_are_always_transport_errors() {
		let strategy = DefaultProviderStrategy;

		for status in [400, 401, 403, 500] {
			let ctx = ProviderErrorContext::new(EndpointKind::RequestToken)
				.with_http_status(status)
				.with_oauth_error("consumer_key_unknown");

			assert_eq!(strategy.classify_error(&ctx), ProviderErrorKind::Transport, "{status}");
		}

		let ctx = ProviderErrorContext::new(EndpointKind::RequestToken)
			.with_http_status(200)
			.with_oauth_error("consumer_key_rejected");

		assert_eq!(strategy.classify_error(&ctx), ProviderErrorKind::Rejected);
	}

	#[test]
	fn reason_prefers_structured_fields_and_truncates_bodies() {
		let ctx = ProviderErrorContext::new(EndpointKind::Token)
			.with_oauth_error("bad_verification_code")
			.with_error_description("The code passed is incorrect or expired.");

		assert_eq!(
			ctx.reason(),
			"bad_verification_code (The code passed is incorrect or expired.)"
		);

		let ctx = ProviderErrorContext::new(EndpointKind::AccessToken)
			.with_http_status(401)
			.with_body_preview("x".repeat(300));
		let preview = ctx.body_preview.clone().expect("Body preview should be stored.");

		assert_eq!(preview.chars().count(), ProviderErrorContext::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
		assert_eq!(ProviderErrorContext::new(EndpointKind::Profile).with_http_status(500).reason(), "HTTP 500");
	}
}
