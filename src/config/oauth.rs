// self
use crate::{
	_prelude::*,
	auth::{ClientId, ClientSecret},
};

/// Errors raised while constructing or validating an OAuth client configuration.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum OauthClientConfigError {
	/// The client identifier is mandatory.
	#[error("Missing client identifier.")]
	MissingClientId,
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Scopes must be non-empty and free of whitespace.
	#[error("Scope `{scope}` is empty or contains whitespace.")]
	InvalidScope {
		/// Offending scope value.
		scope: String,
	},
}

/// Named OAuth client settings consumed at startup.
///
/// Only `client_id` is required. A disabled client behaves as if it were not configured at
/// all when looked up through [`AppConfig::oauth_client`](crate::config::AppConfig::oauth_client).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OauthClientConfig {
	/// Client identifier issued by the authorization server.
	pub client_id: ClientId,
	/// Optional confidential client secret.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<ClientSecret>,
	/// Whether the binding is active.
	#[serde(default = "enabled_by_default")]
	pub enabled: bool,
	/// Scopes requested by default.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub scopes: Vec<String>,
	/// Optional authorization endpoint.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub authorization_endpoint: Option<Url>,
	/// Optional token endpoint.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_endpoint: Option<Url>,
}
impl OauthClientConfig {
	/// Creates an enabled configuration carrying only a client identifier.
	pub fn new(client_id: ClientId) -> Self {
		Self {
			client_id,
			client_secret: None,
			enabled: true,
			scopes: Vec::new(),
			authorization_endpoint: None,
			token_endpoint: None,
		}
	}

	/// Creates a new builder.
	pub fn builder() -> OauthClientConfigBuilder {
		OauthClientConfigBuilder::default()
	}

	/// Validates invariants that serde alone cannot enforce.
	pub fn validate(&self) -> Result<(), OauthClientConfigError> {
		if let Some(url) = self.authorization_endpoint.as_ref() {
			validate_endpoint("authorization", url)?;
		}
		if let Some(url) = self.token_endpoint.as_ref() {
			validate_endpoint("token", url)?;
		}
		if let Some(scope) =
			self.scopes.iter().find(|s| s.is_empty() || s.chars().any(char::is_whitespace))
		{
			return Err(OauthClientConfigError::InvalidScope { scope: scope.clone() });
		}

		Ok(())
	}
}

/// Builder for [`OauthClientConfig`] values.
#[derive(Debug, Default)]
pub struct OauthClientConfigBuilder {
	/// Client identifier (required).
	pub client_id: Option<ClientId>,
	/// Optional client secret.
	pub client_secret: Option<ClientSecret>,
	/// Disables the binding when set.
	pub disabled: bool,
	/// Default scopes.
	pub scopes: Vec<String>,
	/// Optional authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Optional token endpoint.
	pub token_endpoint: Option<Url>,
}
impl OauthClientConfigBuilder {
	/// Sets the client identifier.
	pub fn client_id(mut self, id: ClientId) -> Self {
		self.client_id = Some(id);

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(ClientSecret::new(secret));

		self
	}

	/// Marks the binding as disabled.
	pub fn disabled(mut self) -> Self {
		self.disabled = true;

		self
	}

	/// Appends default scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<OauthClientConfig, OauthClientConfigError> {
		let client_id = self.client_id.ok_or(OauthClientConfigError::MissingClientId)?;
		let config = OauthClientConfig {
			client_id,
			client_secret: self.client_secret,
			enabled: !self.disabled,
			scopes: self.scopes,
			authorization_endpoint: self.authorization_endpoint,
			token_endpoint: self.token_endpoint,
		};

		config.validate()?;

		Ok(config)
	}
}

fn enabled_by_default() -> bool {
	true
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), OauthClientConfigError> {
	if url.scheme() != "https" {
		Err(OauthClientConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
