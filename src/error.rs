//! Crate-level error types shared by configuration, the client-id endpoint, and the price client.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or wiring problem, raised before any request is served.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The remote API answered, but not with a usable price.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
}

/// Configuration and wiring failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No enabled OAuth client is bound under the requested name.
	#[error("No enabled OAuth client configuration is named `{name}`.")]
	MissingOauthClient {
		/// Requested binding name.
		name: String,
	},
	/// OAuth client configuration failed validation.
	#[error("OAuth client configuration `{name}` is invalid.")]
	InvalidOauthClient {
		/// Binding name of the offending client.
		name: String,
		/// Validation failure.
		#[source]
		source: crate::config::OauthClientConfigError,
	},
	/// Configuration file could not be read.
	#[error("Configuration file `{path}` could not be read.")]
	Read {
		/// Path that failed to load.
		path: String,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration document could not be parsed.
	#[error("Configuration could not be parsed at `{}`.", .source.path())]
	Parse {
		/// Structured parsing failure carrying the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Price API base URL cannot carry a path.
	#[error("Price API base URL `{url}` cannot be used as a base.")]
	InvalidPriceBaseUrl {
		/// Rejected URL.
		url: String,
	},
	/// Environment override holds a value of the wrong form.
	#[error("Environment variable `{key}` is invalid: {reason}.")]
	InvalidEnv {
		/// Variable name.
		key: String,
		/// Human readable reason.
		reason: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	pub(crate) fn invalid_env(key: impl Into<String>, reason: impl Display) -> Self {
		Self::InvalidEnv { key: key.into(), reason: reason.to_string() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the price API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the price API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures reported by (or decoded from) the remote price API.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// The API answered with a non-success HTTP status.
	#[error("Price API returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Leading slice of the response body, for diagnostics.
		body_preview: Option<String>,
	},
	/// The response body is not JSON.
	#[error("Price API returned malformed JSON.")]
	InvalidJson {
		/// Underlying decoding failure.
		#[source]
		source: serde_json::Error,
	},
	/// The response is JSON but does not match the price record.
	#[error("Price API response does not match the expected shape at `{}`.", .source.path())]
	ResponseShape {
		/// Structured parsing failure carrying the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The API envelope carried a failure code.
	#[error("Price API reported failure code {code}: {message}.")]
	Api {
		/// API specific code.
		code: String,
		/// API supplied message, or a placeholder.
		message: String,
	},
	/// The API envelope succeeded but carried no quote.
	#[error("Price API returned no quote for the requested symbol.")]
	EmptyQuote,
}
