//! Endpoint returning the configured OAuth client identifier as plain text.

// crates.io
use axum::{
	extract::State,
	http::{HeaderValue, header::CONTENT_TYPE},
	response::IntoResponse,
	routing::{MethodRouter, get},
};
// self
use crate::{
	_prelude::*,
	config::AppConfig,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Handler state holding the client identifier resolved at startup.
#[derive(Clone, Debug)]
pub struct ClientIdEndpoint {
	client_id: Arc<str>,
}
impl ClientIdEndpoint {
	/// Resolves the enabled OAuth client bound under `name`.
	pub fn from_config(config: &AppConfig, name: &str) -> Result<Self> {
		let client = config.oauth_client(name)?;

		Ok(Self::new(client.client_id.as_str()))
	}

	/// Creates the endpoint from an already resolved identifier.
	pub fn new(client_id: impl Into<Arc<str>>) -> Self {
		Self { client_id: client_id.into() }
	}

	/// Identifier served by the endpoint.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Wraps the endpoint in a `GET` method router with its state applied.
	pub fn into_method_router(self) -> MethodRouter {
		get(client_id).with_state(self)
	}
}

/// `GET` handler answering with the client identifier as `text/plain`.
pub async fn client_id(State(endpoint): State<ClientIdEndpoint>) -> impl IntoResponse {
	const KIND: OpKind = OpKind::ClientId;

	let _span = OpSpan::new(KIND, "serve").entered();

	obs::record_op_outcome(KIND, OpOutcome::Attempt);

	let body = endpoint.client_id().to_owned();

	obs::record_op_outcome(KIND, OpOutcome::Success);

	(
		[(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
		body,
	)
}
