//! Federated login core: OAuth 1.0a and OAuth 2.0 client adapters that run the
//! provider handshake and normalize third-party profiles into one authentication result.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod oauth1;
pub mod obs;
pub mod profile;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::{Oauth1Client, Oauth2Client, ReqwestOauth1Client, ReqwestOauth2Client},
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{ProviderConfig, ProviderDescriptor},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an OAuth 1.0a adapter backed by the insecure test transport.
	pub fn build_reqwest_test_oauth1(
		descriptor: ProviderDescriptor,
		config: ProviderConfig,
	) -> ReqwestOauth1Client {
		Oauth1Client::with_http_client(
			descriptor,
			config,
			test_reqwest_http_client(),
			ReqwestTransportErrorMapper,
		)
		.expect("Failed to build OAuth 1.0a test client.")
	}

	/// Constructs an OAuth 2.0 adapter backed by the insecure test transport.
	pub fn build_reqwest_test_oauth2(
		descriptor: ProviderDescriptor,
		config: ProviderConfig,
	) -> ReqwestOauth2Client {
		Oauth2Client::with_http_client(
			descriptor,
			config,
			test_reqwest_http_client(),
			ReqwestTransportErrorMapper,
		)
		.expect("Failed to build OAuth 2.0 test client.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
