//! Bitcoin price quotes from the exchange's level-1 order book endpoint.
//!
//! `model` holds the response records and decoding rules, `client` performs the single
//! fixed `GET`, and `tracker` polls the client on an interval and publishes metrics.

pub mod client;
pub mod model;
pub mod tracker;

pub use client::*;
pub use model::*;
pub use tracker::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Exchange REST base URL used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.kucoin.com/api/v1";
/// Trading pair queried by [`PriceClient::latest`].
pub const SYMBOL: &str = "BTC-USDT";

const QUOTE_PATH: [&str; 3] = ["market", "orderbook", "level1"];

/// Parses [`DEFAULT_BASE_URL`].
pub fn default_base_url() -> Result<Url, ConfigError> {
	Url::parse(DEFAULT_BASE_URL)
		.map_err(|_| ConfigError::InvalidPriceBaseUrl { url: DEFAULT_BASE_URL.into() })
}

/// Appends the fixed quote path and query to `base`.
///
/// Any query or fragment already present on `base` is replaced.
pub fn quote_endpoint(base: &Url) -> Result<Url, ConfigError> {
	let invalid = || ConfigError::InvalidPriceBaseUrl { url: base.to_string() };

	if !matches!(base.scheme(), "http" | "https") {
		return Err(invalid());
	}

	let mut url = base.clone();

	url.path_segments_mut().map_err(|_| invalid())?.pop_if_empty().extend(QUOTE_PATH);
	url.query_pairs_mut().clear().append_pair("symbol", SYMBOL);
	url.set_fragment(None);

	Ok(url)
}
