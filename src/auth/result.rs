//! Uniform authentication outcome returned by every adapter.
//!
//! Success and failure are mutually exclusive by construction: a result either owns an
//! [`AuthenticatedIdentity`] or an [`AuthenticationFailure`], never both, and the
//! identity's provider user id can never be blank.

// self
use crate::{
	_prelude::*,
	auth::{ProviderName, ProviderUserId},
};

/// Stages of a login handshake, shared by both protocol adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowStage {
	/// Nothing has happened yet.
	Start,
	/// Authorization URL issued (request token obtained for OAuth 1.0a).
	AuthorizationRequested,
	/// Provider redirected back with a verifier or code.
	CallbackReceived,
	/// Access credential obtained.
	TokenExchanged,
	/// Raw profile downloaded.
	ProfileFetched,
	/// Identity normalized successfully.
	Succeeded,
	/// Terminal failure.
	Failed,
}
impl FlowStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::Start => "start",
			FlowStage::AuthorizationRequested => "authorization_requested",
			FlowStage::CallbackReceived => "callback_received",
			FlowStage::TokenExchanged => "token_exchanged",
			FlowStage::ProfileFetched => "profile_fetched",
			FlowStage::Succeeded => "succeeded",
			FlowStage::Failed => "failed",
		}
	}

	/// Returns true for [`FlowStage::Succeeded`] and [`FlowStage::Failed`].
	pub const fn is_terminal(self) -> bool {
		matches!(self, FlowStage::Succeeded | FlowStage::Failed)
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Normalized identity produced by a successful handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
	/// Stable provider-issued user id.
	pub provider_user_id: ProviderUserId,
	/// Provider user name (login, handle).
	pub user_name: String,
	/// Remaining profile fields flattened to strings.
	pub extra_data: BTreeMap<String, String>,
}

/// Failure captured at the adapter boundary.
#[derive(Debug)]
pub struct AuthenticationFailure {
	/// Last stage reached before the failure.
	pub stage: FlowStage,
	/// Originating error, preserved for logging.
	pub error: Error,
}
impl Display for AuthenticationFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} (after stage `{}`)", self.error, self.stage)
	}
}

/// Outcome of a login attempt against one provider.
#[derive(Debug)]
pub struct AuthenticationResult {
	provider: ProviderName,
	outcome: Result<AuthenticatedIdentity, AuthenticationFailure>,
}
impl AuthenticationResult {
	/// Builds a successful result.
	pub fn success(provider: ProviderName, identity: AuthenticatedIdentity) -> Self {
		Self { provider, outcome: Ok(identity) }
	}

	/// Builds a failed result, remembering the stage the handshake had reached.
	pub fn failure(provider: ProviderName, stage: FlowStage, error: impl Into<Error>) -> Self {
		Self { provider, outcome: Err(AuthenticationFailure { stage, error: error.into() }) }
	}

	/// Returns true when the handshake produced an identity.
	pub fn is_successful(&self) -> bool {
		self.outcome.is_ok()
	}

	/// Provider that handled the attempt.
	pub fn provider_name(&self) -> &ProviderName {
		&self.provider
	}

	/// Provider user id, present only on success.
	pub fn provider_user_id(&self) -> Option<&ProviderUserId> {
		self.identity().map(|identity| &identity.provider_user_id)
	}

	/// User name, present only on success.
	pub fn user_name(&self) -> Option<&str> {
		self.identity().map(|identity| identity.user_name.as_str())
	}

	/// Extra profile data, present only on success.
	pub fn extra_data(&self) -> Option<&BTreeMap<String, String>> {
		self.identity().map(|identity| &identity.extra_data)
	}

	/// Normalized identity, present only on success.
	pub fn identity(&self) -> Option<&AuthenticatedIdentity> {
		self.outcome.as_ref().ok()
	}

	/// Failure cause, present only on failure.
	pub fn failure_reason(&self) -> Option<&AuthenticationFailure> {
		self.outcome.as_ref().err()
	}

	/// Converts the result into a plain [`Result`], keeping the failure stage.
	pub fn into_result(self) -> Result<AuthenticatedIdentity, AuthenticationFailure> {
		self.outcome
	}
}
