//! OAuth 1.0a request signing (RFC 5849).
//!
//! [`Oauth1Signer`] turns a request description (method, URL, protocol parameters, and
//! the optional token credential) into the `Authorization: OAuth ...` header value. The
//! pure helpers ([`signature_base_string`], [`normalized_url`], [`percent_encode`]) are
//! public so alternative transports can reproduce the exact bytes that get signed.

pub mod encoding;
pub mod signer;

pub use encoding::*;
pub use signer::*;
