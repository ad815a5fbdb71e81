//! RFC 3986 percent-encoding and the RFC 5849 signature base string.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
// self
use crate::_prelude::*;

/// Everything except RFC 3986 unreserved characters gets escaped.
const RFC3986_RESERVED: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes `value` per RFC 5849 §3.6 (uppercase hex, unreserved set kept).
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, RFC3986_RESERVED).to_string()
}

/// Base string URI: lowercase scheme and host, default port dropped, no query or fragment.
pub fn normalized_url(url: &Url) -> String {
	let mut normalized = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());

	if let Some(port) = url.port() {
		normalized.push(':');
		normalized.push_str(&port.to_string());
	}

	normalized.push_str(url.path());

	normalized
}

/// Builds the signature base string.
///
/// `params` holds the protocol parameters plus any form body parameters; the query
/// parameters of `url` are merged in here. `oauth_signature` and `realm` are never
/// signed. Pairs are encoded first and then sorted by encoded key, ties broken by
/// encoded value, so the caller's ordering has no influence on the result.
pub fn signature_base_string(http_method: &str, url: &Url, params: &[(String, String)]) -> String {
	let mut encoded = params
		.iter()
		.cloned()
		.chain(url.query_pairs().into_owned())
		.filter(|(key, _)| key != "oauth_signature" && key != "realm")
		.map(|(key, value)| (percent_encode(&key), percent_encode(&value)))
		.collect::<Vec<_>>();

	encoded.sort();

	let parameters =
		encoded.iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&");

	format!(
		"{}&{}&{}",
		http_method.to_ascii_uppercase(),
		percent_encode(&normalized_url(url)),
		percent_encode(&parameters)
	)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn pairs(values: &[(&str, &str)]) -> Vec<(String, String)> {
		values.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	#[test]
	fn percent_encoding_keeps_only_unreserved_characters() {
		assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
		assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
		assert_eq!(percent_encode("☃"), "%E2%98%83");
		assert_eq!(percent_encode("Custom OAuth Provider"), "Custom%20OAuth%20Provider");
	}

	#[test]
	fn normalized_url_drops_default_port_and_query() {
		let url = Url::parse("HTTPS://Trello.com:443/1/OAuthGetRequestToken?x=1#frag")
			.expect("URL fixture should parse.");

		assert_eq!(normalized_url(&url), "https://trello.com/1/OAuthGetRequestToken");

		let url = Url::parse("http://example.com:8080/r%20v/X?id=123")
			.expect("URL fixture should parse.");

		assert_eq!(normalized_url(&url), "http://example.com:8080/r%20v/X");
	}

	#[test]
	fn base_string_matches_rfc5849_example() {
		let url = Url::parse("http://example.com/request?b5=%3D%253D&a3=a&c%40=&a2=r%20b")
			.expect("RFC example URL should parse.");
		let params = pairs(&[
			("oauth_consumer_key", "9djdj82h48djs9d2"),
			("oauth_token", "kkk9d7dh3k39sjv7"),
			("oauth_signature_method", "HMAC-SHA1"),
			("oauth_timestamp", "137131201"),
			("oauth_nonce", "7d8f3e4a"),
			("c2", ""),
			("a3", "2 q"),
		]);

		assert_eq!(
			signature_base_string("post", &url, &params),
			"POST&http%3A%2F%2Fexample.com%2Frequest&a2%3Dr%2520b%26a3%3D2%2520q%26a3%3Da%26b5%3D%253D%25253D%26c%2540%3D%26c2%3D%26oauth_consumer_key%3D9djdj82h48djs9d2%26oauth_nonce%3D7d8f3e4a%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D137131201%26oauth_token%3Dkkk9d7dh3k39sjv7"
		);
	}

	#[test]
	fn base_string_ignores_signature_and_realm() {
		let url = Url::parse("https://example.com/x").expect("URL fixture should parse.");
		let with_noise = pairs(&[("a", "1"), ("oauth_signature", "zzz"), ("realm", "photos")]);
		let clean = pairs(&[("a", "1")]);

		assert_eq!(
			signature_base_string("GET", &url, &with_noise),
			signature_base_string("GET", &url, &clean)
		);
	}
}
