// self
use crate::obs::{OpKind, OpOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_price_kit_op_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts one tracker price check, successful or not.
pub fn record_price_check() {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_price_kit_price_checks_total").increment(1);
	}
}

/// Publishes the latest Bitcoin price and the latency of the fetch that produced it.
pub fn record_price(value: f64, elapsed: std::time::Duration) {
	#[cfg(feature = "metrics")]
	{
		metrics::gauge!("oauth2_price_kit_bitcoin_price").set(value);
		metrics::histogram!("oauth2_price_kit_price_fetch_seconds").record(elapsed.as_secs_f64());
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (value, elapsed);
	}
}
