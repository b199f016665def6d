//! Transport primitives for outbound REST calls.
//!
//! The module exposes [`RestHttpClient`] alongside [`HttpReply`] so callers can swap the
//! default reqwest transport for their own stack (or a fake in tests) without touching the
//! price client. Implementations perform exactly one `GET` per call and hand back the raw
//! status, retry hint, and body; decoding and status classification stay with the caller.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Boxed future returned by [`RestHttpClient::get_json`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpReply, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of issuing a single JSON `GET`.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared behind an
/// `Arc` by every client instance, and the futures they return must be `Send` so callers
/// can spawn them on a multi-threaded runtime.
pub trait RestHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Issues one `GET` against `url`, asking for `application/json`.
	///
	/// Any HTTP status counts as a reply; only failures to obtain a response at all surface
	/// as [`Self::TransportError`].
	fn get_json<'a>(&'a self, url: &'a Url) -> HttpFuture<'a, Self::TransportError>;
}

/// Raw response captured by a [`RestHttpClient`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpReply {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header value, if present.
	pub content_type: Option<String>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl HttpReply {
	/// Creates a reply with the given status and body and no headers.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into(), ..Default::default() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ReqwestHttpClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ReqwestHttpClient(..)")
	}
}
#[cfg(feature = "reqwest")]
impl RestHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn get_json<'a>(&'a self, url: &'a Url) -> HttpFuture<'a, Self::TransportError> {
		Box::pin(async move {
			let response =
				self.0.get(url.clone()).header(ACCEPT, "application/json").send().await?;
			let status = response.status().as_u16();
			let headers = response.headers();
			let retry_after = parse_retry_after(headers);
			let content_type =
				headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_owned);
			let body = response.bytes().await?.to_vec();

			Ok(HttpReply { status, content_type, retry_after, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
