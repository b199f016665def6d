//! Strongly typed identifiers for OAuth client bindings.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}

			/// Returns the identifier as a string slice.
			pub fn as_str(&self) -> &str {
				&self.0
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 256;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (client name, client id).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (client name, client id).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed byte length.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (client name, client id).
		kind: &'static str,
		/// Maximum permitted length.
		max: usize,
	},
}

def_id! { ClientName, "Name under which an OAuth client configuration is bound.", "ClientName" }
def_id! { ClientId, "OAuth 2.0 client identifier issued by an authorization server.", "ClientId" }

impl ClientName {
	/// Returns the environment-variable fragment for this name (`company-auth` → `COMPANY_AUTH`).
	pub fn env_fragment(&self) -> String {
		env_fragment(&self.0)
	}
}

/// Maps a binding name to its environment-variable fragment.
///
/// Upper-cases ASCII letters and folds `-` and `.` into `_`, so `company-auth`,
/// `company.auth`, and `company_auth` share the fragment `COMPANY_AUTH`.
pub fn env_fragment(name: &str) -> String {
	name.chars().map(|c| if c == '-' || c == '.' { '_' } else { c.to_ascii_uppercase() }).collect()
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_whitespace_and_empty_values() {
		assert!(ClientId::new(" abc123").is_err(), "Leading whitespace must be rejected.");
		assert!(ClientId::new("abc123 ").is_err(), "Trailing whitespace must be rejected.");
		assert!(ClientName::new("").is_err());

		let id = ClientId::new("abc123").expect("Client id fixture should be valid.");

		assert_eq!(id.as_str(), "abc123");
		assert_eq!(format!("{id:?}"), "ClientId(abc123)");
	}

	#[test]
	fn serde_enforces_validation() {
		let name: ClientName = serde_json::from_str("\"companyauthserver\"")
			.expect("Client name should deserialize successfully.");

		assert_eq!(name.as_ref(), "companyauthserver");
		assert!(serde_json::from_str::<ClientName>("\"with space\"").is_err());
		assert!(serde_json::from_str::<ClientId>("\"\"").is_err());
	}

	#[test]
	fn length_limit_is_inclusive() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		ClientId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert_eq!(
			ClientId::new(&too_long),
			Err(IdentifierError::TooLong { kind: "ClientId", max: IDENTIFIER_MAX_LEN })
		);
	}

	#[test]
	fn env_fragment_upper_cases_and_maps_separators() {
		let name = ClientName::new("company-auth.server").expect("Client name should be valid.");

		assert_eq!(name.env_fragment(), "COMPANY_AUTH_SERVER");
	}

	#[test]
	fn borrow_supports_lookup_by_str() {
		let map = BTreeMap::from_iter([(
			ClientName::new("companyauthserver").expect("Client name should be valid."),
			1_u8,
		)]);

		assert_eq!(map.get("companyauthserver"), Some(&1));
	}
}
