// self
use crate::{
	_prelude::*,
	auth::{AuthenticationFailure, FlowStage, ProviderName},
	obs::FlowKind,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by the login adapters.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	kind: FlowKind,
	provider: ProviderName,
	stage: FlowStage,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind, provider, and stage.
	pub fn new(kind: FlowKind, provider: &ProviderName, stage: FlowStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth_login.flow",
				flow = kind.as_str(),
				provider = provider.as_ref(),
				stage = stage.as_str()
			);

			Self { kind, provider: provider.clone(), stage, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			Self { kind, provider: provider.clone(), stage }
		}
	}

	/// Opens a span for one handshake step, nested under the current span.
	///
	/// `stage` is the last stage reached when the step starts, which is also the stage a
	/// failure inside the step is reported at.
	pub fn step(&self, stage: FlowStage) -> Self {
		Self::new(self.kind, &self.provider, stage)
	}

	/// Stage recorded on the span.
	pub fn stage(&self) -> FlowStage {
		self.stage
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Runs synchronous work inside the span.
	pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}
}

/// Emits a `warn` event for a failed authentication (when enabled).
pub fn warn_flow_failure(kind: FlowKind, provider: &ProviderName, failure: &AuthenticationFailure) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			flow = kind.as_str(),
			provider = provider.as_ref(),
			stage = failure.stage.as_str(),
			error = %failure.error,
			"Login flow failed."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, provider, failure);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn provider() -> ProviderName {
		ProviderName::new("Trello").expect("Provider name fixture should be valid.")
	}

	#[test]
	fn failure_warning_accepts_any_failure() {
		let failure = AuthenticationFailure {
			stage: FlowStage::TokenExchanged,
			error: Error::InvalidCallback { reason: "token mismatch".into() },
		};

		warn_flow_failure(FlowKind::Oauth1, &provider(), &failure);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::Oauth2, &provider(), FlowStage::ProfileFetched);
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[tokio::test]
	async fn steps_carry_their_own_stage() {
		let flow = FlowSpan::new(FlowKind::Oauth1, &provider(), FlowStage::CallbackReceived);
		let exchange = flow.step(FlowStage::CallbackReceived);
		let profile = flow.step(FlowStage::TokenExchanged);
		let normalize = flow.step(FlowStage::ProfileFetched);

		assert_eq!(exchange.stage(), FlowStage::CallbackReceived);
		assert_eq!(profile.stage(), FlowStage::TokenExchanged);
		assert_eq!(normalize.stage(), FlowStage::ProfileFetched);
		assert_eq!(profile.instrument(async { 7 }).await, 7);
		assert_eq!(normalize.in_scope(|| "normalized"), "normalized");
		assert_eq!(flow.stage(), FlowStage::CallbackReceived);
	}
}
