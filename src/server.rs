//! HTTP surface: an explicit routing table with per-route access rules.
//!
//! `access` holds the rule enum and the guard middleware, `route` the table that pairs every
//! path with its rule, and `client_id` the endpoint serving the configured OAuth client
//! identifier.

pub mod access;
pub mod client_id;
pub mod route;

pub use self::{access::*, client_id::*, route::*};

// self
use crate::{_prelude::*, config::AppConfig};

/// Binding name resolved when the caller does not choose one.
pub const DEFAULT_CLIENT_NAME: &str = "companyauthserver";

/// Builds the application's routing table from startup configuration.
///
/// Fails when the OAuth client bound under `client_name` is missing or disabled, so a
/// wiring mistake stops the process before any request is accepted.
pub fn routes(config: &AppConfig, client_name: &str) -> Result<RouteTable> {
	let endpoint = ClientIdEndpoint::from_config(config, client_name)?;

	Ok(RouteTable::new().route("/", endpoint.into_method_router(), AccessRule::Anonymous))
}
