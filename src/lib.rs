//! Anonymous OAuth client-id endpoint and a typed Bitcoin price client, wired through explicit
//! startup configuration, per-route access rules, and pluggable HTTP transports.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod price;
pub mod server;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Helpers shared by tests; enabled via `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		http::ReqwestHttpClient,
		price::{PriceClient, ReqwestPriceClient},
	};

	/// Builds a reqwest transport that accepts the self-signed certificates served by
	/// `httpmock`.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a price client for `base_url` on top of [`test_reqwest_http_client`].
	pub fn test_price_client(base_url: &str) -> ReqwestPriceClient {
		let base = Url::parse(base_url).expect("Test base URL should parse.");

		PriceClient::with_http_client(&base, test_reqwest_http_client())
			.expect("Test price client should build.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use axum;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(feature = "cli")]
use {clap as _, color_eyre as _, dotenvy as _, tracing_subscriber as _};
#[cfg(test)] use {httpmock as _, metrics_util as _, tower as _};
