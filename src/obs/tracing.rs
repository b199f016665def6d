// self
use crate::{_prelude::*, obs::OpKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder shared by the endpoint, the price client, and the tracker.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_price_kit.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> OpSpanGuard {
		#[cfg(feature = "tracing")]
		{
			OpSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			OpSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
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
}

/// RAII guard returned by [`OpSpan::entered`].
pub struct OpSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard(..)")
	}
}

/// Emits a warn-level event for a failure nobody awaits, such as a background refresh.
pub fn warn_failure(kind: OpKind, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(op = kind.as_str(), %error, "operation failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error);
	}
}

/// Emits an info-level event for a quote captured by a background refresh.
pub fn info_price(price: &dyn Display, elapsed: std::time::Duration) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(%price, elapsed_ms = elapsed.as_millis() as u64, "price refreshed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (price, elapsed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn op_span_guard_exists_with_or_without_tracing() {
		let guard = OpSpan::new(OpKind::ClientId, "test").entered();

		assert_eq!(format!("{guard:?}"), "OpSpanGuard(..)");
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = OpSpan::new(OpKind::PriceQuery, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn warn_failure_accepts_any_display() {
		warn_failure(OpKind::PriceRefresh, &"upstream unavailable");
	}

	#[test]
	fn info_price_accepts_any_display() {
		info_price(&"50000", std::time::Duration::from_millis(12));
	}
}
