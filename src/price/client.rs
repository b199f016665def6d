//! Typed client for the fixed Bitcoin quote endpoint.
//!
//! [`PriceClient::latest`] issues exactly one `GET` per call and never retries, falls back,
//! or substitutes a default value: transport failures surface as [`Error::Transport`],
//! non-2xx replies and undecodable bodies as [`Error::Upstream`].

// self
use crate::{
	_prelude::*,
	config::PriceConfig,
	error::{TransportError, UpstreamError},
	http::RestHttpClient,
	obs::{self, OpKind, OpOutcome, OpSpan},
	price::{self, BitcoinPrice},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const BODY_PREVIEW_LIMIT: usize = 256;

#[cfg(feature = "reqwest")]
/// Price client specialized for the crate's default reqwest transport.
pub type ReqwestPriceClient = PriceClient<ReqwestHttpClient>;

/// Client bound to `{base}/market/orderbook/level1?symbol=BTC-USDT`.
pub struct PriceClient<C>
where
	C: ?Sized + RestHttpClient,
{
	http_client: Arc<C>,
	endpoint: Url,
}
impl<C> PriceClient<C>
where
	C: ?Sized + RestHttpClient,
{
	/// Creates a client for `base_url` using the caller-provided transport.
	pub fn with_http_client(base_url: &Url, http_client: impl Into<Arc<C>>) -> Result<Self> {
		let endpoint = price::quote_endpoint(base_url)?;

		Ok(Self { http_client: http_client.into(), endpoint })
	}

	/// Creates a client from [`PriceConfig`], defaulting to the public exchange URL.
	pub fn from_config(config: &PriceConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		let base_url = match config.base_url.as_ref() {
			Some(url) => url.clone(),
			None => price::default_base_url()?,
		};

		Self::with_http_client(&base_url, http_client)
	}

	/// Fully resolved request URL.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	/// Fetches the latest BTC-USDT quote.
	pub async fn latest(&self) -> Result<BitcoinPrice> {
		const KIND: OpKind = OpKind::PriceQuery;

		let span = OpSpan::new(KIND, "latest");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let reply = self
					.http_client
					.get_json(&self.endpoint)
					.await
					.map_err(TransportError::network)?;

				if !reply.is_success() {
					return Err(Error::from(UpstreamError::Status {
						status: reply.status,
						retry_after: reply.retry_after,
						body_preview: body_preview(&reply.body),
					}));
				}

				price::decode(&reply.body).map_err(Error::from)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl PriceClient<ReqwestHttpClient> {
	/// Creates a client for `base_url` backed by a default reqwest transport.
	pub fn new(base_url: &Url) -> Result<Self> {
		Self::with_http_client(base_url, ReqwestHttpClient::default())
	}

	/// Creates a client for the public exchange URL backed by a default reqwest transport.
	pub fn public() -> Result<Self> {
		Self::new(&price::default_base_url()?)
	}
}
impl<C> Clone for PriceClient<C>
where
	C: ?Sized + RestHttpClient,
{
	fn clone(&self) -> Self {
		Self { http_client: self.http_client.clone(), endpoint: self.endpoint.clone() }
	}
}
impl<C> Debug for PriceClient<C>
where
	C: ?Sized + RestHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PriceClient").field("endpoint", &self.endpoint.as_str()).finish()
	}
}

fn body_preview(body: &[u8]) -> Option<String> {
	if body.is_empty() {
		return None;
	}

	let mut preview = String::from_utf8_lossy(body).into_owned();

	if preview.len() > BODY_PREVIEW_LIMIT {
		let mut cut = BODY_PREVIEW_LIMIT;

		while !preview.is_char_boundary(cut) {
			cut -= 1;
		}

		preview.truncate(cut);
	}

	Some(preview)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::{HttpFuture, HttpReply};

	#[derive(Debug, ThisError)]
	#[error("Connection refused.")]
	struct Refused;

	struct ScriptedHttpClient {
		reply: Option<HttpReply>,
		requests: parking_lot::Mutex<Vec<String>>,
	}
	impl ScriptedHttpClient {
		fn replying(reply: HttpReply) -> Self {
			Self { reply: Some(reply), requests: Default::default() }
		}

		fn refusing() -> Self {
			Self { reply: None, requests: Default::default() }
		}
	}
	impl RestHttpClient for ScriptedHttpClient {
		type TransportError = Refused;

		fn get_json<'a>(&'a self, url: &'a Url) -> HttpFuture<'a, Self::TransportError> {
			self.requests.lock().push(url.to_string());

			let reply = self.reply.clone();

			Box::pin(async move { reply.ok_or(Refused) })
		}
	}

	fn client(
		http: ScriptedHttpClient,
	) -> (PriceClient<ScriptedHttpClient>, Arc<ScriptedHttpClient>) {
		let http = Arc::new(http);
		let base =
			Url::parse("https://prices.example.com/api/v1").expect("Base URL should parse.");
		let client = PriceClient::with_http_client(&base, http.clone())
			.expect("Client should build for an https base.");

		(client, http)
	}

	#[tokio::test]
	async fn latest_issues_one_get_to_the_fixed_endpoint() {
		let (client, http) =
			client(ScriptedHttpClient::replying(HttpReply::new(200, r#"{"price":"50000"}"#)));
		let price = client.latest().await.expect("Quote should decode.");

		assert_eq!(price.price().as_str(), "50000");
		assert_eq!(
			http.requests.lock().as_slice(),
			["https://prices.example.com/api/v1/market/orderbook/level1?symbol=BTC-USDT"]
		);
	}

	#[tokio::test]
	async fn non_success_status_is_propagated_with_preview() {
		let mut reply = HttpReply::new(503, "maintenance");

		reply.retry_after = Some(Duration::seconds(30));

		let (client, _) = client(ScriptedHttpClient::replying(reply));
		let err = client.latest().await.expect_err("503 must surface as a failure.");

		match err {
			Error::Upstream(UpstreamError::Status { status, retry_after, body_preview }) => {
				assert_eq!(status, 503);
				assert_eq!(retry_after, Some(Duration::seconds(30)));
				assert_eq!(body_preview.as_deref(), Some("maintenance"));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[tokio::test]
	async fn transport_failure_is_propagated() {
		let (client, http) = client(ScriptedHttpClient::refusing());
		let err = client.latest().await.expect_err("Refused connections must surface.");

		assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
		assert_eq!(http.requests.lock().len(), 1, "Failures must not be retried.");
	}

	#[test]
	fn body_preview_truncates_on_char_boundary() {
		let body = "é".repeat(200);
		let preview = body_preview(body.as_bytes()).expect("Non-empty body has a preview.");

		assert!(preview.len() <= BODY_PREVIEW_LIMIT);
		assert!(preview.chars().all(|c| c == 'é'));
		assert_eq!(body_preview(b""), None);
	}

	#[test]
	fn from_config_defaults_to_public_exchange() {
		let client = PriceClient::<ScriptedHttpClient>::from_config(
			&PriceConfig::default(),
			Arc::new(ScriptedHttpClient::refusing()),
		)
		.expect("Default configuration should build.");

		assert_eq!(
			client.endpoint().as_str(),
			"https://api.kucoin.com/api/v1/market/orderbook/level1?symbol=BTC-USDT"
		);
	}

	#[cfg(feature = "reqwest")]
	#[tokio::test]
	async fn reqwest_client_reads_the_mocked_exchange() {
		// crates.io
		use httpmock::prelude::*;
		// self
		use crate::_preludet::test_price_client;

		let server = MockServer::start_async().await;
		let ok = server
			.mock_async(|when, then| {
				when.method(GET)
					.path("/ok/market/orderbook/level1")
					.query_param("symbol", "BTC-USDT");
				then.status(200).body(r#"{"price":"50000"}"#);
			})
			.await;
		let failing = server
			.mock_async(|when, then| {
				when.method(GET).path("/down/market/orderbook/level1");
				then.status(500);
			})
			.await;
		let price = test_price_client(&server.url("/ok"))
			.latest()
			.await
			.expect("Mocked quote should decode.");
		let err = test_price_client(&server.url("/down"))
			.latest()
			.await
			.expect_err("A 500 reply must fail.");

		ok.assert_calls_async(1).await;
		failing.assert_calls_async(1).await;

		assert_eq!(price.as_f64(), 50_000.0);
		assert!(matches!(err, Error::Upstream(UpstreamError::Status { status: 500, .. })));
	}
}
