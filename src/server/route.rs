//! Explicit routing table: every route is declared together with its access rule.

// crates.io
use axum::{Router, middleware, routing::MethodRouter};
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	server::{AccessRule, enforce_access},
};

/// One routing table entry.
#[derive(Debug)]
pub struct RouteEntry {
	/// Request path (axum syntax).
	pub path: &'static str,
	/// Access rule applied before the handler.
	pub access: AccessRule,
	/// Method handlers served under `path`.
	pub handler: MethodRouter,
}

/// Ordered set of routes; turned into an [`axum::Router`] by [`RouteTable::into_router`].
#[derive(Debug, Default)]
pub struct RouteTable {
	entries: Vec<RouteEntry>,
}
impl RouteTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a route guarded by `access`.
	pub fn route(mut self, path: &'static str, handler: MethodRouter, access: AccessRule) -> Self {
		self.entries.push(RouteEntry { path, access, handler });

		self
	}

	/// Returns the declared entries in registration order.
	pub fn entries(&self) -> &[RouteEntry] {
		&self.entries
	}

	/// Returns the access rule declared for `path`, if any.
	pub fn access_for(&self, path: &str) -> Option<AccessRule> {
		self.entries.iter().find(|entry| entry.path == path).map(|entry| entry.access)
	}

	/// Builds the router, wrapping each route in its guard and the whole app in a trace layer.
	pub fn into_router(self) -> Router {
		let router = self.entries.into_iter().fold(Router::new(), |router, entry| {
			let guarded = entry
				.handler
				.route_layer(middleware::from_fn_with_state(entry.access, enforce_access));

			router.route(entry.path, guarded)
		});

		router.layer(TraceLayer::new_for_http())
	}
}
