//! Optional observability helpers for the endpoint and the price client.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_price_kit.op` with the `op` and
//!   `stage` fields, plus warn-level events for background failures and info-level events for
//!   each refreshed quote.
//! - Enable `metrics` to increment the `oauth2_price_kit_op_total` counter for every
//!   attempt/success/failure (labeled by `op` + `outcome`) and to publish the tracker's price
//!   gauge, check counter, and fetch latency histogram.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Serving the configured OAuth client identifier.
	ClientId,
	/// One outbound price quote request.
	PriceQuery,
	/// One tracker refresh cycle.
	PriceRefresh,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::ClientId => "client_id",
			OpKind::PriceQuery => "price_query",
			OpKind::PriceRefresh => "price_refresh",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
