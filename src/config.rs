//! Startup configuration resolved once and passed down explicitly.
//!
//! [`AppConfig`] is read from a JSON document (every section is optional), adjusted by
//! environment overrides, and validated before any component is built. Components receive
//! the pieces they need through constructors; nothing reads configuration lazily.
//!
//! # Environment overrides
//!
//! | Variable | Effect |
//! | --- | --- |
//! | `LISTEN_ADDR` | `server.listen` |
//! | `PRICE_BASE_URL` | `price.base_url` |
//! | `PRICE_POLL_INTERVAL_SECS` | `price.poll_interval_secs` |
//! | `OAUTH_CLIENT_<NAME>_CLIENT_ID` | `oauth_clients.<name>.client_id` (creates the client) |
//! | `OAUTH_CLIENT_<NAME>_CLIENT_SECRET` | `oauth_clients.<name>.client_secret` |
//!
//! `<NAME>` is the binding name upper-cased with `-` and `.` mapped to `_`. A client created
//! purely from the environment is bound under the lower-cased fragment (`company_auth`);
//! [`AppConfig::oauth_client`] also resolves `company-auth` or `company.auth` to it.
//! Variables whose key or value is not valid UTF-8 are skipped.

mod oauth;

pub use oauth::*;

// std
use std::{ffi::OsString, net::SocketAddr, path::Path};
// self
use crate::{
	_prelude::*,
	auth::{self, ClientId, ClientName, ClientSecret},
	error::ConfigError,
};

const OAUTH_ENV_PREFIX: &str = "OAUTH_CLIENT_";
const CLIENT_ID_SUFFIX: &str = "_CLIENT_ID";
const CLIENT_SECRET_SUFFIX: &str = "_CLIENT_SECRET";

/// Root configuration document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// HTTP server settings.
	pub server: ServerConfig,
	/// OAuth client bindings keyed by name.
	pub oauth_clients: BTreeMap<ClientName, OauthClientConfig>,
	/// Price API settings.
	pub price: PriceConfig,
}
impl AppConfig {
	/// Parses and validates a JSON configuration document.
	pub fn from_json_str(raw: &str) -> Result<Self> {
		let mut de = serde_json::Deserializer::from_str(raw);
		let config: Self = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::Parse { source })?;

		config.validate()?;

		Ok(config)
	}

	/// Reads, parses, and validates a JSON configuration file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let raw = std::fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;

		Self::from_json_str(&raw)
	}

	/// Registers (or replaces) an OAuth client binding.
	pub fn with_oauth_client(mut self, name: ClientName, client: OauthClientConfig) -> Self {
		self.oauth_clients.insert(name, client);

		self
	}

	/// Checks every OAuth client binding.
	pub fn validate(&self) -> Result<()> {
		for (name, client) in &self.oauth_clients {
			client.validate().map_err(|source| ConfigError::InvalidOauthClient {
				name: name.to_string(),
				source,
			})?;
		}

		Ok(())
	}

	/// Resolves the enabled OAuth client bound under `name`.
	///
	/// An exact binding wins. Otherwise the first binding sharing `name`'s environment
	/// fragment is used, so `company-auth` finds a client created as `company_auth`.
	pub fn oauth_client(&self, name: &str) -> Result<&OauthClientConfig> {
		self.oauth_clients
			.get(name)
			.or_else(|| {
				let fragment = auth::env_fragment(name);

				self.oauth_clients
					.iter()
					.find(|(bound, _)| bound.env_fragment() == fragment)
					.map(|(_, client)| client)
			})
			.filter(|client| client.enabled)
			.ok_or_else(|| ConfigError::MissingOauthClient { name: name.to_owned() }.into())
	}

	/// Applies overrides from the process environment.
	///
	/// Entries that are not valid UTF-8 cannot name an override and are skipped.
	pub fn apply_process_env(&mut self) -> Result<()> {
		self.apply_env(utf8_vars(std::env::vars_os()))
	}

	/// Applies overrides from `vars`; unrelated keys are ignored.
	///
	/// Client identifiers are applied before secrets so a secret may target a client created
	/// by the same batch of overrides.
	pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<()>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let vars = vars
			.into_iter()
			.map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
			.collect::<Vec<_>>();
		let mut secrets = Vec::new();

		for (key, value) in &vars {
			match key.as_str() {
				"LISTEN_ADDR" => {
					self.server.listen = value
						.parse()
						.map_err(|e: std::net::AddrParseError| ConfigError::invalid_env(key, e))?;
				},
				"PRICE_BASE_URL" => {
					self.price.base_url = Some(
						Url::parse(value).map_err(|e| ConfigError::invalid_env(key, e))?,
					);
				},
				"PRICE_POLL_INTERVAL_SECS" => {
					let secs = value
						.parse()
						.map_err(|e: std::num::ParseIntError| ConfigError::invalid_env(key, e))?;

					self.price.poll_interval_secs = Some(secs);
				},
				_ =>
					if let Some(fragment) = oauth_fragment(key, CLIENT_ID_SUFFIX) {
						self.override_client_id(key, fragment, value)?;
					} else if let Some(fragment) = oauth_fragment(key, CLIENT_SECRET_SUFFIX) {
						secrets.push((key, fragment, value));
					},
			}
		}
		for (key, fragment, value) in secrets {
			let client = self
				.oauth_clients
				.iter_mut()
				.find(|(name, _)| name.env_fragment() == fragment)
				.map(|(_, client)| client)
				.ok_or_else(|| ConfigError::invalid_env(key, "no client id is configured"))?;

			client.client_secret = Some(ClientSecret::new(value.as_str()));
		}

		self.validate()
	}

	fn override_client_id(&mut self, key: &str, fragment: &str, value: &str) -> Result<()> {
		let client_id = ClientId::new(value).map_err(|e| ConfigError::invalid_env(key, e))?;

		if let Some(client) = self
			.oauth_clients
			.iter_mut()
			.find(|(name, _)| name.env_fragment() == fragment)
			.map(|(_, client)| client)
		{
			client.client_id = client_id;

			return Ok(());
		}

		let name = ClientName::new(fragment.to_ascii_lowercase())
			.map_err(|e| ConfigError::invalid_env(key, e))?;

		self.oauth_clients.insert(name, OauthClientConfig::new(client_id));

		Ok(())
	}
}

/// HTTP server settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
	/// Socket address to bind.
	pub listen: SocketAddr,
}
impl Default for ServerConfig {
	fn default() -> Self {
		Self { listen: SocketAddr::from(([0, 0, 0, 0], 8080)) }
	}
}

/// Price API settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
	/// Overrides the exchange base URL; the fixed quote path is appended to it.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub base_url: Option<Url>,
	/// Enables the background tracker with this period.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub poll_interval_secs: Option<u64>,
}
impl PriceConfig {
	/// Returns the tracker period, ignoring a zero interval.
	pub fn poll_interval(&self) -> Option<std::time::Duration> {
		self.poll_interval_secs.filter(|secs| *secs > 0).map(std::time::Duration::from_secs)
	}
}

fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
	I: IntoIterator<Item = (OsString, OsString)>,
{
	vars.into_iter()
		.filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}

fn oauth_fragment<'a>(key: &'a str, suffix: &str) -> Option<&'a str> {
	key.strip_prefix(OAUTH_ENV_PREFIX)?.strip_suffix(suffix).filter(|f| !f.is_empty())
}
