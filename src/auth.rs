//! Auth-domain identifiers, secrets, credentials, and the authentication result.

pub mod credential;
pub mod id;
pub mod result;
pub mod secret;

pub use credential::*;
pub use id::*;
pub use result::*;
pub use secret::*;
