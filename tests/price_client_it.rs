#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_price_kit::{
	config::AppConfig,
	error::{Error, UpstreamError},
	http::ReqwestHttpClient,
	price::{PriceClient, PriceTracker, ReqwestPriceClient},
	reqwest,
	url::Url,
};

const QUOTE_PATH: &str = "/api/v1/market/orderbook/level1";

// httpmock serves a self-signed certificate.
fn insecure_http_client() -> ReqwestHttpClient {
	let client = reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Insecure test client should build.");

	ReqwestHttpClient::with_client(client)
}

fn build_client(server: &MockServer) -> ReqwestPriceClient {
	let base = Url::parse(&server.url("/api/v1")).expect("Mock base URL should parse.");

	PriceClient::with_http_client(&base, insecure_http_client())
		.expect("Price client should build for the mock server.")
}

#[tokio::test]
async fn latest_returns_the_upstream_price() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(QUOTE_PATH).query_param("symbol", "BTC-USDT");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"price":"50000"}"#);
		})
		.await;
	let price = build_client(&server).latest().await.expect("Quote should decode.");

	mock.assert_calls_async(1).await;

	assert_eq!(price.price().as_str(), "50000");
	assert_eq!(price.as_f64(), 50_000.0);
}

#[tokio::test]
async fn latest_decodes_the_exchange_envelope() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(QUOTE_PATH).query_param("symbol", "BTC-USDT");
			then.status(200).header("content-type", "application/json").body(
				"{\"code\":\"200000\",\"data\":{\"time\":1700000000000,\"price\":\"36521.1\",\
				 \"bestBid\":\"36521.0\",\"bestAsk\":\"36521.5\"}}",
			);
		})
		.await;
	let price = build_client(&server).latest().await.expect("Envelope should decode.");

	mock.assert_calls_async(1).await;

	assert_eq!(price.code.as_deref(), Some("200000"));
	assert_eq!(price.price().as_str(), "36521.1");
	assert!(price.quote.spread().is_some());
}

#[tokio::test]
async fn server_error_surfaces_without_retry() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(QUOTE_PATH);
			then.status(500).body("internal error");
		})
		.await;
	let err = build_client(&server).latest().await.expect_err("500 must fail the call.");

	mock.assert_calls_async(1).await;

	match err {
		Error::Upstream(UpstreamError::Status { status, body_preview, .. }) => {
			assert_eq!(status, 500);
			assert_eq!(body_preview.as_deref(), Some("internal error"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn rate_limit_exposes_retry_after() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path(QUOTE_PATH);
			then.status(429).header("retry-after", "7");
		})
		.await;
	let err = build_client(&server).latest().await.expect_err("429 must fail the call.");

	match err {
		Error::Upstream(UpstreamError::Status { status, retry_after, .. }) => {
			assert_eq!(status, 429);
			assert_eq!(retry_after, Some(time::Duration::seconds(7)));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn malformed_and_api_errors_are_distinguished() {
	let malformed = MockServer::start_async().await;
	let _garbage = malformed
		.mock_async(|when, then| {
			when.method(GET).path(QUOTE_PATH);
			then.status(200).body("not json");
		})
		.await;
	let err = build_client(&malformed).latest().await.expect_err("Garbage must not decode.");

	assert!(matches!(err, Error::Upstream(UpstreamError::InvalidJson { .. })));

	let rejecting = MockServer::start_async().await;
	let _api = rejecting
		.mock_async(|when, then| {
			when.method(GET).path(QUOTE_PATH);
			then.status(200).body(r#"{"code":"400100","msg":"Unsupported symbol"}"#);
		})
		.await;
	let err =
		build_client(&rejecting).latest().await.expect_err("Non-success code must fail.");

	match err {
		Error::Upstream(UpstreamError::Api { code, message }) => {
			assert_eq!(code, "400100");
			assert_eq!(message, "Unsupported symbol");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() {
	let port = std::net::TcpListener::bind("127.0.0.1:0")
		.and_then(|listener| listener.local_addr())
		.expect("Ephemeral port should be available.")
		.port();
	let base = Url::parse(&format!("http://127.0.0.1:{port}/api/v1"))
		.expect("Closed-port base URL should parse.");
	let client = PriceClient::new(&base).expect("Price client should build.");
	let err = client.latest().await.expect_err("Closed port must fail.");

	assert!(matches!(err, Error::Transport(_)), "Unexpected error variant: {err:?}.");
}

#[tokio::test]
async fn configured_tracker_caches_the_latest_quote() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(QUOTE_PATH).query_param("symbol", "BTC-USDT");
			then.status(200).body(r#"{"price":"64000.5"}"#);
		})
		.await;
	let mut config = AppConfig::default();

	config
		.apply_env([("PRICE_BASE_URL", server.url("/api/v1"))])
		.expect("Base URL override should apply.");

	let client = ReqwestPriceClient::from_config(&config.price, insecure_http_client())
		.expect("Configured client should build.");
	let tracker = PriceTracker::new(client);
	let snapshot = tracker.refresh().await.expect("Refresh should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(snapshot.price.price().as_str(), "64000.5");
	assert_eq!(tracker.latest(), Some(snapshot));
	assert_eq!(tracker.checks(), 1);
}
