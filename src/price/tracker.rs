//! Periodic price polling with metrics publication.
//!
//! [`PriceTracker`] keeps the last successful quote so readers never wait on the network,
//! and publishes each refresh through the [`obs`](crate::obs) helpers. A failed refresh
//! leaves the previous snapshot in place.

// std
use std::{
	sync::atomic::{AtomicU64, Ordering},
	time::Instant,
};
// crates.io
use tokio::{task::JoinHandle, time::MissedTickBehavior};
// self
use crate::{
	_prelude::*,
	http::RestHttpClient,
	obs::{self, OpKind, OpOutcome, OpSpan},
	price::{BitcoinPrice, PriceClient},
};

/// Quote captured by a successful refresh.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceSnapshot {
	/// Decoded quote.
	pub price: BitcoinPrice,
	/// Local time the quote was received.
	pub fetched_at: OffsetDateTime,
}

/// Polls a [`PriceClient`] and caches the latest quote.
pub struct PriceTracker<C>
where
	C: ?Sized + RestHttpClient,
{
	client: PriceClient<C>,
	latest: RwLock<Option<PriceSnapshot>>,
	checks: AtomicU64,
}
impl<C> PriceTracker<C>
where
	C: ?Sized + RestHttpClient,
{
	/// Creates a tracker with no cached quote.
	pub fn new(client: PriceClient<C>) -> Self {
		Self { client, latest: RwLock::new(None), checks: AtomicU64::new(0) }
	}

	/// Fetches one quote, caches it on success, and returns it.
	pub async fn refresh(&self) -> Result<PriceSnapshot> {
		const KIND: OpKind = OpKind::PriceRefresh;

		let span = OpSpan::new(KIND, "refresh");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		obs::record_price_check();
		self.checks.fetch_add(1, Ordering::Relaxed);

		let started = Instant::now();
		let result = span.instrument(self.client.latest()).await.map(|price| {
			let elapsed = started.elapsed();
			let snapshot = PriceSnapshot { price, fetched_at: OffsetDateTime::now_utc() };

			obs::record_price(snapshot.price.as_f64(), elapsed);
			obs::info_price(snapshot.price.price(), elapsed);
			*self.latest.write() = Some(snapshot.clone());

			snapshot
		});

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Returns the last successful snapshot, if any.
	pub fn latest(&self) -> Option<PriceSnapshot> {
		self.latest.read().clone()
	}

	/// Number of refresh attempts so far, including failures.
	pub fn checks(&self) -> u64 {
		self.checks.load(Ordering::Relaxed)
	}

	/// Refreshes immediately and then every `period` until the handle is aborted.
	///
	/// Failures are logged and the loop keeps going; a zero period is raised to one
	/// millisecond.
	pub fn spawn(self: Arc<Self>, period: std::time::Duration) -> JoinHandle<()> {
		let period = period.max(std::time::Duration::from_millis(1));

		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(period);

			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				ticker.tick().await;

				if let Err(e) = self.refresh().await {
					obs::warn_failure(OpKind::PriceRefresh, &e);
				}
			}
		})
	}
}
impl<C> Debug for PriceTracker<C>
where
	C: ?Sized + RestHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PriceTracker")
			.field("client", &self.client)
			.field("checks", &self.checks())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{collections::VecDeque, sync::atomic::AtomicUsize};
	// self
	use super::*;
	use crate::{
		error::UpstreamError,
		http::{HttpFuture, HttpReply},
	};

	#[derive(Debug, ThisError)]
	#[error("Script exhausted.")]
	struct Exhausted;

	#[derive(Default)]
	struct SequenceHttpClient {
		replies: parking_lot::Mutex<VecDeque<HttpReply>>,
		calls: AtomicUsize,
	}
	impl SequenceHttpClient {
		fn new(replies: impl IntoIterator<Item = HttpReply>) -> Self {
			Self {
				replies: parking_lot::Mutex::new(replies.into_iter().collect()),
				..Default::default()
			}
		}
	}
	impl RestHttpClient for SequenceHttpClient {
		type TransportError = Exhausted;

		fn get_json<'a>(&'a self, _url: &'a Url) -> HttpFuture<'a, Self::TransportError> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let reply = self.replies.lock().pop_front();

			Box::pin(async move { reply.ok_or(Exhausted) })
		}
	}

	fn tracker(
		replies: Vec<HttpReply>,
	) -> (Arc<PriceTracker<SequenceHttpClient>>, Arc<SequenceHttpClient>) {
		let http = Arc::new(SequenceHttpClient::new(replies));
		let base =
			Url::parse("https://prices.example.com/api/v1").expect("Base URL should parse.");
		let client = PriceClient::with_http_client(&base, http.clone())
			.expect("Client should build for an https base.");

		(Arc::new(PriceTracker::new(client)), http)
	}

	#[tokio::test]
	async fn failed_refresh_keeps_last_good_snapshot() {
		let (tracker, _) = tracker(vec![
			HttpReply::new(200, r#"{"price":"50000"}"#),
			HttpReply::new(500, "boom"),
		]);

		assert!(tracker.latest().is_none());

		let first = tracker.refresh().await.expect("First refresh should succeed.");

		assert_eq!(first.price.as_f64(), 50_000.0);

		let err = tracker.refresh().await.expect_err("Second refresh should fail.");

		assert!(matches!(err, Error::Upstream(UpstreamError::Status { status: 500, .. })));
		assert_eq!(tracker.latest(), Some(first));
		assert_eq!(tracker.checks(), 2);
	}

	#[tokio::test]
	async fn spawned_loop_survives_failures() {
		let (tracker, http) = tracker(vec![
			HttpReply::new(500, "boom"),
			HttpReply::new(200, r#"{"price":"61000.25"}"#),
		]);
		let handle = tracker.clone().spawn(std::time::Duration::from_millis(5));

		for _ in 0..200 {
			if tracker.latest().is_some() {
				break;
			}

			tokio::time::sleep(std::time::Duration::from_millis(5)).await;
		}

		handle.abort();

		let snapshot = tracker.latest().expect("Loop should recover after a failure.");

		assert_eq!(snapshot.price.price().as_str(), "61000.25");
		assert!(http.calls.load(Ordering::SeqCst) >= 2);
	}
}
