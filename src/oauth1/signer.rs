//! Signature computation and `Authorization: OAuth ...` header assembly.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	oauth1::{percent_encode, signature_base_string},
	provider::SignatureMethod,
};

const NONCE_LEN: usize = 32;
const OAUTH_VERSION: &str = "1.0";

/// Token credential (temporary or access) mixed into a signature.
#[derive(Clone, Copy, Debug)]
pub struct SigningToken<'a> {
	/// `oauth_token` value.
	pub token: &'a str,
	/// Token secret appended to the signing key.
	pub secret: &'a str,
}

/// Per-request values that must never repeat; generated fresh unless a test pins them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Freshness {
	/// `oauth_nonce` value.
	pub nonce: String,
	/// `oauth_timestamp` value (Unix seconds).
	pub timestamp: i64,
}
impl Freshness {
	/// Generates a random nonce stamped with the current time.
	pub fn generate() -> Self {
		let nonce = rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect();

		Self { nonce, timestamp: OffsetDateTime::now_utc().unix_timestamp() }
	}
}

/// Signs OAuth 1.0a requests with a consumer credential.
#[derive(Clone, Debug)]
pub struct Oauth1Signer {
	consumer_key: String,
	consumer_secret: TokenSecret,
	method: SignatureMethod,
}
impl Oauth1Signer {
	/// Creates a signer for the given consumer credential.
	pub fn new(
		consumer_key: impl Into<String>,
		consumer_secret: TokenSecret,
		method: SignatureMethod,
	) -> Self {
		Self { consumer_key: consumer_key.into(), consumer_secret, method }
	}

	/// Signature method applied by this signer.
	pub fn method(&self) -> SignatureMethod {
		self.method
	}

	/// Computes `oauth_signature` over `params` (which must include the oauth protocol
	/// parameters) for the given request.
	pub fn sign(
		&self,
		http_method: &str,
		url: &Url,
		params: &[(String, String)],
		token_secret: &str,
	) -> Result<String> {
		let key =
			format!("{}&{}", percent_encode(self.consumer_secret.expose()), percent_encode(token_secret));

		match self.method {
			SignatureMethod::Plaintext => Ok(key),
			SignatureMethod::HmacSha1 => {
				let base = signature_base_string(http_method, url, params);

				hmac_base64::<Hmac<Sha1>>(&key, &base)
			},
			SignatureMethod::HmacSha256 => {
				let base = signature_base_string(http_method, url, params);

				hmac_base64::<Hmac<Sha256>>(&key, &base)
			},
		}
	}

	/// Builds the `Authorization` header value for a request, generating a fresh nonce and
	/// timestamp.
	///
	/// `protocol_params` carries the leg-specific parameters (`oauth_callback`,
	/// `oauth_verifier`).
	pub fn authorization_header(
		&self,
		http_method: &str,
		url: &Url,
		token: Option<SigningToken>,
		protocol_params: &[(&str, &str)],
	) -> Result<String> {
		self.authorization_header_with(
			http_method,
			url,
			token,
			protocol_params,
			&Freshness::generate(),
		)
	}

	/// Same as [`Oauth1Signer::authorization_header`] with caller-provided freshness values.
	pub fn authorization_header_with(
		&self,
		http_method: &str,
		url: &Url,
		token: Option<SigningToken>,
		protocol_params: &[(&str, &str)],
		freshness: &Freshness,
	) -> Result<String> {
		let mut oauth = vec![
			("oauth_consumer_key".to_owned(), self.consumer_key.clone()),
			("oauth_nonce".to_owned(), freshness.nonce.clone()),
			("oauth_signature_method".to_owned(), self.method.as_str().to_owned()),
			("oauth_timestamp".to_owned(), freshness.timestamp.to_string()),
			("oauth_version".to_owned(), OAUTH_VERSION.to_owned()),
		];

		if let Some(token) = token {
			oauth.push(("oauth_token".to_owned(), token.token.to_owned()));
		}
		for (key, value) in protocol_params {
			oauth.push(((*key).to_owned(), (*value).to_owned()));
		}

		let signature =
			self.sign(http_method, url, &oauth, token.map(|token| token.secret).unwrap_or_default())?;

		oauth.push(("oauth_signature".to_owned(), signature));

		Ok(render_header(oauth))
	}
}

fn hmac_base64<M>(key: &str, message: &str) -> Result<String>
where
	M: Mac + hmac::digest::KeyInit,
{
	let mut mac = <M as Mac>::new_from_slice(key.as_bytes())
		.map_err(|_| ConfigError::InvalidSigningKey)?;

	mac.update(message.as_bytes());

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn render_header(params: Vec<(String, String)>) -> String {
	let mut encoded = params
		.into_iter()
		.map(|(key, value)| (percent_encode(&key), percent_encode(&value)))
		.collect::<Vec<_>>();

	encoded.sort();

	let fields = encoded
		.iter()
		.map(|(key, value)| format!("{key}=\"{value}\""))
		.collect::<Vec<_>>()
		.join(", ");

	format!("OAuth {fields}")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn photos_signer(method: SignatureMethod) -> Oauth1Signer {
		Oauth1Signer::new("dpf43f3p2l4k3l03", TokenSecret::new("kd94hf93k423kf44"), method)
	}

	fn photos_url() -> Url {
		Url::parse("http://photos.example.net/photos?file=vacation.jpg&size=original")
			.expect("Photos fixture URL should parse.")
	}

	fn photos_freshness() -> Freshness {
		Freshness { nonce: "kllo9940pd9333jh".into(), timestamp: 1_191_242_096 }
	}

	fn photos_token() -> SigningToken<'static> {
		SigningToken { token: "nnch734d00sl2jdk", secret: "pfkkdhi9sl3r4s00" }
	}

	fn photos_params() -> Vec<(String, String)> {
		[
			("oauth_consumer_key", "dpf43f3p2l4k3l03"),
			("oauth_token", "nnch734d00sl2jdk"),
			("oauth_signature_method", "HMAC-SHA1"),
			("oauth_timestamp", "1191242096"),
			("oauth_nonce", "kllo9940pd9333jh"),
			("oauth_version", "1.0"),
		]
		.iter()
		.map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
		.collect()
	}

	#[test]
	fn hmac_sha1_matches_known_vector() {
		let signature = photos_signer(SignatureMethod::HmacSha1)
			.sign("GET", &photos_url(), &photos_params(), "pfkkdhi9sl3r4s00")
			.expect("Signing should succeed.");

		assert_eq!(signature, "tR3+Ty81lMeYAr/Fid0kMTYa/WM=");
	}

	#[test]
	fn hmac_sha256_matches_known_vector() {
		let signature = photos_signer(SignatureMethod::HmacSha256)
			.sign("GET", &photos_url(), &photos_params(), "pfkkdhi9sl3r4s00")
			.expect("Signing should succeed.");

		assert_eq!(signature, "0gCtTYQAxqCKhIE0sltgx7UgHkAs10vrpuYE7xpRBnE=");
	}

	#[test]
	fn plaintext_signature_is_the_encoded_key() {
		let signature = Oauth1Signer::new("key", TokenSecret::new("c&s"), SignatureMethod::Plaintext)
			.sign("POST", &photos_url(), &[], "t s")
			.expect("Signing should succeed.");

		assert_eq!(signature, "c%26s&t%20s");
	}

	#[test]
	fn authorization_header_is_sorted_and_encoded() {
		let header = photos_signer(SignatureMethod::HmacSha1)
			.authorization_header_with(
				"GET",
				&photos_url(),
				Some(photos_token()),
				&[],
				&photos_freshness(),
			)
			.expect("Header should be built.");

		assert_eq!(
			header,
			"OAuth oauth_consumer_key=\"dpf43f3p2l4k3l03\", oauth_nonce=\"kllo9940pd9333jh\", \
			 oauth_signature=\"tR3%2BTy81lMeYAr%2FFid0kMTYa%2FWM%3D\", \
			 oauth_signature_method=\"HMAC-SHA1\", oauth_timestamp=\"1191242096\", \
			 oauth_token=\"nnch734d00sl2jdk\", oauth_version=\"1.0\""
		);
	}

	#[test]
	fn signature_is_stable_under_permutation_and_sensitive_to_values() {
		let signer = photos_signer(SignatureMethod::HmacSha1);
		let url = photos_url();
		let params = photos_params();
		let mut shuffled = params.clone();

		shuffled.reverse();
		shuffled.swap(0, 3);

		let original =
			signer.sign("GET", &url, &params, "secret").expect("Signing should succeed.");
		let permuted =
			signer.sign("GET", &url, &shuffled, "secret").expect("Signing should succeed.");

		assert_eq!(original, permuted);

		for idx in 0..params.len() {
			let mut mutated = params.clone();

			mutated[idx].1.push('x');

			let changed =
				signer.sign("GET", &url, &mutated, "secret").expect("Signing should succeed.");

			assert_ne!(original, changed, "Mutating `{}` must change the signature.", params[idx].0);
		}
	}

	#[test]
	fn protocol_params_and_fresh_nonces_are_included() {
		let signer = photos_signer(SignatureMethod::HmacSha1);
		let url = Url::parse("https://trello.com/1/OAuthGetRequestToken")
			.expect("Request token URL should parse.");
		let first = signer
			.authorization_header("POST", &url, None, &[("oauth_callback", "https://app/cb")])
			.expect("Header should be built.");
		let second = signer
			.authorization_header("POST", &url, None, &[("oauth_callback", "https://app/cb")])
			.expect("Header should be built.");

		assert!(first.contains("oauth_callback=\"https%3A%2F%2Fapp%2Fcb\""));
		assert!(!first.contains("oauth_token="));
		assert_ne!(first, second, "Each request must carry a fresh nonce.");
	}
}
