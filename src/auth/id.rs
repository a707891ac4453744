//! Strongly typed identifiers enforced across the courier domain.

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

				check_identifier($kind, view)?;

				Ok(Self(view.to_owned()))
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
				check_identifier($kind, &value)?;

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

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (profile, tenant, client app).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (profile, tenant, client app).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (profile, tenant, client app).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { ProfileId, "Logical name a client profile is registered under.", "Profile" }
def_id! { TenantId, "Directory tenant the application is registered in.", "Tenant" }
def_id! { ClientAppId, "Application (client) registration identifier.", "ClientApp" }

fn check_identifier(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
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
	fn identifiers_reject_padding_and_emptiness() {
		assert!(ProfileId::new(" server-api").is_err(), "Leading whitespace must be rejected.");
		assert!(ProfileId::new("server-api ").is_err(), "Trailing whitespace must be rejected.");
		assert!(ProfileId::new("").is_err());
		assert!(TenantId::new("contoso tenant").is_err());

		let profile =
			ProfileId::new("server-api").expect("Profile fixture should be considered valid.");

		assert_eq!(profile.as_ref(), "server-api");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let payload = "\"11111111-2222-3333-4444-555555555555\"";
		let app: ClientAppId =
			serde_json::from_str(payload).expect("Client app id should deserialize successfully.");

		assert_eq!(app.as_ref(), "11111111-2222-3333-4444-555555555555");
		assert!(serde_json::from_str::<ClientAppId>("\"with space\"").is_err());
		assert!(serde_json::from_str::<TenantId>("\"\"").is_err());
	}

	#[test]
	fn length_limit_is_inclusive() {
		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		ProfileId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(ProfileId::new(&too_long).is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<ProfileId, u8> = HashMap::from_iter([(
			ProfileId::new("server-api").expect("Profile used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("server-api"), Some(&7));
	}
}
