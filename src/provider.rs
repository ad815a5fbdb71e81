//! Provider-facing descriptors (data), presets, configuration, and strategies (behavior).
//!
//! `descriptor` exposes validated metadata ([`ProviderDescriptor`]) covering the endpoint
//! set of either protocol, the OAuth 1.0a signature method, the profile field map, and
//! request quirks. `presets` ships the Trello and GitHub descriptors, `config` holds the
//! serde-loadable credentials, and `strategy` defines [`ProviderStrategy`], an
//! HTTP-client-agnostic hook used by the adapters to classify failed calls.

pub mod config;
pub mod descriptor;
pub mod presets;
pub mod strategy;

pub use config::*;
pub use descriptor::*;
pub use presets::*;
pub use strategy::*;
