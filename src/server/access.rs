//! Access rules and the guard middleware that enforces them.

// crates.io
use axum::{
	extract::{Request, State},
	http::{
		HeaderMap, HeaderValue, StatusCode,
		header::{AUTHORIZATION, WWW_AUTHENTICATE},
	},
	middleware::Next,
	response::{IntoResponse, Response},
};
// self
use crate::_prelude::*;

/// Who may reach a route.
///
/// The guard only checks that credentials are present for [`AccessRule::Authenticated`];
/// verifying them belongs to whatever issues the bearer tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRule {
	/// Anyone, with or without credentials.
	Anonymous,
	/// Requests carrying a bearer token.
	Authenticated,
	/// Nobody.
	DenyAll,
}
impl AccessRule {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			AccessRule::Anonymous => "anonymous",
			AccessRule::Authenticated => "authenticated",
			AccessRule::DenyAll => "deny_all",
		}
	}

	/// Decides whether a request with `headers` may proceed.
	pub fn evaluate(self, headers: &HeaderMap) -> Result<(), AccessDenied> {
		match self {
			AccessRule::Anonymous => Ok(()),
			AccessRule::Authenticated =>
				if has_bearer_token(headers) {
					Ok(())
				} else {
					Err(AccessDenied::Unauthenticated)
				},
			AccessRule::DenyAll => Err(AccessDenied::Forbidden),
		}
	}
}
impl Display for AccessRule {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Rejection produced by [`AccessRule::evaluate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum AccessDenied {
	/// Credentials are required but absent.
	#[error("Authentication is required.")]
	Unauthenticated,
	/// The route is closed to every caller.
	#[error("Access is forbidden.")]
	Forbidden,
}
impl IntoResponse for AccessDenied {
	fn into_response(self) -> Response {
		match self {
			AccessDenied::Unauthenticated => (
				StatusCode::UNAUTHORIZED,
				[(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
				self.to_string(),
			)
				.into_response(),
			AccessDenied::Forbidden => (StatusCode::FORBIDDEN, self.to_string()).into_response(),
		}
	}
}

/// Middleware enforcing the route's [`AccessRule`] before the handler runs.
pub async fn enforce_access(
	State(rule): State<AccessRule>,
	request: Request,
	next: Next,
) -> Response {
	match rule.evaluate(request.headers()) {
		Ok(()) => next.run(request).await,
		Err(denied) => denied.into_response(),
	}
}

fn has_bearer_token(headers: &HeaderMap) -> bool {
	headers
		.get(AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.split_once(' '))
		.is_some_and(|(scheme, token)| {
			scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty()
		})
}
