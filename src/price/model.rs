//! Price records and the decoding rules for exchange responses.
//!
//! The exchange wraps every payload in `{"code": "200000", "data": {...}}`; mirrors and test
//! doubles often return the bare quote object instead. [`decode`] accepts both shapes and
//! reports everything else as an [`UpstreamError`].

// self
use crate::{_prelude::*, error::UpstreamError};

/// Envelope code the exchange uses for successful calls.
pub const SUCCESS_CODE: &str = "200000";

/// Error returned when a decimal value is rejected.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PriceError {
	/// The text is not a decimal number.
	#[error("`{text}` is not a decimal number.")]
	NotANumber {
		/// Rejected text.
		text: String,
	},
	/// The number is negative, infinite, or NaN.
	#[error("`{text}` is not a finite, non-negative amount.")]
	OutOfRange {
		/// Rejected text.
		text: String,
	},
}

/// Non-negative decimal amount that keeps the exchange's original text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDecimal", into = "String")]
pub struct Price {
	text: String,
	value: f64,
}
impl Price {
	/// Parses a decimal amount.
	pub fn new(text: impl AsRef<str>) -> Result<Self, PriceError> {
		let text = text.as_ref().trim();
		let value =
			text.parse::<f64>().map_err(|_| PriceError::NotANumber { text: text.to_owned() })?;

		if !value.is_finite() || value < 0.0 {
			return Err(PriceError::OutOfRange { text: text.to_owned() });
		}

		Ok(Self { text: text.to_owned(), value })
	}

	/// Returns the amount as received.
	pub fn as_str(&self) -> &str {
		&self.text
	}

	/// Returns the amount as a float.
	pub fn as_f64(&self) -> f64 {
		self.value
	}
}
impl Display for Price {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.text)
	}
}
impl FromStr for Price {
	type Err = PriceError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl From<Price> for String {
	fn from(value: Price) -> Self {
		value.text
	}
}
impl TryFrom<RawDecimal> for Price {
	type Error = PriceError;

	fn try_from(raw: RawDecimal) -> Result<Self, Self::Error> {
		match raw {
			RawDecimal::Text(text) => Self::new(text),
			RawDecimal::Number(number) => Self::new(number.to_string()),
		}
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDecimal {
	Text(String),
	Number(serde_json::Number),
}

/// Level-1 order book snapshot (best bid/ask and last trade).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level1Quote {
	/// Last traded price.
	pub price: Price,
	/// Last traded size.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<Price>,
	/// Best bid price.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub best_bid: Option<Price>,
	/// Best bid size.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub best_bid_size: Option<Price>,
	/// Best ask price.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub best_ask: Option<Price>,
	/// Best ask size.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub best_ask_size: Option<Price>,
	/// Order book sequence number.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sequence: Option<String>,
	/// Exchange timestamp in milliseconds since the Unix epoch.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time: Option<i64>,
}
impl Level1Quote {
	/// Returns `best_ask - best_bid` when both sides are present.
	pub fn spread(&self) -> Option<f64> {
		Some(self.best_ask.as_ref()?.as_f64() - self.best_bid.as_ref()?.as_f64())
	}

	/// Converts the exchange timestamp, if present and in range.
	pub fn timestamp(&self) -> Option<OffsetDateTime> {
		let nanos = i128::from(self.time?) * 1_000_000;

		OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
	}
}

/// Bitcoin price quote returned by [`PriceClient::latest`](crate::price::PriceClient::latest).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BitcoinPrice {
	/// Envelope code, absent when the API returned a bare quote.
	pub code: Option<String>,
	/// Quote payload.
	pub quote: Level1Quote,
}
impl BitcoinPrice {
	/// Last traded price.
	pub fn price(&self) -> &Price {
		&self.quote.price
	}

	/// Last traded price as a float.
	pub fn as_f64(&self) -> f64 {
		self.quote.price.as_f64()
	}
}

#[derive(Deserialize)]
struct Envelope {
	code: String,
	#[serde(default)]
	msg: Option<String>,
	#[serde(default)]
	data: Option<Level1Quote>,
}

/// Decodes a successful response body into a [`BitcoinPrice`].
pub fn decode(body: &[u8]) -> Result<BitcoinPrice, UpstreamError> {
	let value = serde_json::from_slice::<serde_json::Value>(body)
		.map_err(|source| UpstreamError::InvalidJson { source })?;

	if value.get("code").is_none() {
		let quote = serde_path_to_error::deserialize::<_, Level1Quote>(value)
			.map_err(|source| UpstreamError::ResponseShape { source })?;

		return Ok(BitcoinPrice { code: None, quote });
	}

	let envelope = serde_path_to_error::deserialize::<_, Envelope>(value)
		.map_err(|source| UpstreamError::ResponseShape { source })?;

	if envelope.code != SUCCESS_CODE {
		return Err(UpstreamError::Api {
			code: envelope.code,
			message: envelope.msg.unwrap_or_else(|| "no message".into()),
		});
	}

	let quote = envelope.data.ok_or(UpstreamError::EmptyQuote)?;

	Ok(BitcoinPrice { code: Some(envelope.code), quote })
}
