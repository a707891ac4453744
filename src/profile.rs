//! Client profile definitions and the startup registry.

// std
use std::collections::hash_map::Entry;
// self
use crate::{
	_prelude::*,
	auth::{ProfileId, ScopeSet, ScopeValidationError},
};

/// Errors raised while constructing or registering profiles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProfileError {
	/// Base URL is mandatory.
	#[error("Missing base URL for profile `{profile}`.")]
	MissingBaseUrl {
		/// Profile under construction.
		profile: String,
	},
	/// Profiles must require at least one scope; checked at startup, not at
	/// first use.
	#[error("Profile `{profile}` does not configure any required scopes.")]
	EmptyScopes {
		/// Profile under construction.
		profile: String,
	},
	/// Base URLs must be plain http(s) origins.
	#[error("Profile `{profile}` base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Profile under construction.
		profile: String,
		/// Offending base URL.
		url: String,
	},
	/// Scope entries failed validation.
	#[error(transparent)]
	InvalidScope(#[from] ScopeValidationError),
	/// A profile with the same name is already registered.
	#[error("A profile named `{profile}` is already registered.")]
	Duplicate {
		/// The colliding profile name.
		profile: String,
	},
}

/// Immutable upstream API target consumed by the courier.
///
/// Created once at startup from configuration; request targets are resolved
/// against `base_url` and every attached token must cover `scopes`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
	/// Logical name the profile is registered under.
	pub name: ProfileId,
	/// Base address requests are resolved against.
	pub base_url: Url,
	/// Scopes every attached token must cover (non-empty).
	pub scopes: ScopeSet,
}
impl ClientProfile {
	/// Creates a new builder seeded with the provided name.
	pub fn builder(name: ProfileId) -> ClientProfileBuilder {
		ClientProfileBuilder::new(name)
	}
}

/// Builder for [`ClientProfile`] values.
#[derive(Debug)]
pub struct ClientProfileBuilder {
	name: ProfileId,
	base_url: Option<Url>,
	scopes: Vec<String>,
}
impl ClientProfileBuilder {
	fn new(name: ProfileId) -> Self {
		Self { name, base_url: None, scopes: Vec::new() }
	}

	/// Sets the base address.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Appends a single required scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scopes.push(scope.into());

		self
	}

	/// Appends multiple required scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes.extend(scopes.into_iter().map(Into::into));

		self
	}

	/// Consumes the builder and validates the resulting profile.
	pub fn build(self) -> Result<ClientProfile, ProfileError> {
		let base_url = self
			.base_url
			.ok_or_else(|| ProfileError::MissingBaseUrl { profile: self.name.to_string() })?;

		if !matches!(base_url.scheme(), "http" | "https") {
			return Err(ProfileError::UnsupportedScheme {
				profile: self.name.to_string(),
				url: base_url.to_string(),
			});
		}
		if self.scopes.is_empty() {
			return Err(ProfileError::EmptyScopes { profile: self.name.to_string() });
		}

		let scopes = ScopeSet::new(self.scopes)?;

		Ok(ClientProfile { name: self.name, base_url, scopes })
	}
}

/// Name-keyed collection of profiles, built once at startup and read-only
/// thereafter.
#[derive(Clone, Debug, Default)]
pub struct ProfileRegistry(HashMap<ProfileId, ClientProfile>);
impl ProfileRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a profile, rejecting duplicate names.
	pub fn register(&mut self, profile: ClientProfile) -> Result<(), ProfileError> {
		match self.0.entry(profile.name.clone()) {
			Entry::Occupied(_) =>
				Err(ProfileError::Duplicate { profile: profile.name.to_string() }),
			Entry::Vacant(slot) => {
				slot.insert(profile);

				Ok(())
			},
		}
	}

	/// Looks up a profile by name.
	pub fn get(&self, name: &str) -> Option<&ClientProfile> {
		self.0.get(name)
	}

	/// Number of registered profiles.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no profiles are registered.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterator over registered profiles.
	pub fn iter(&self) -> impl Iterator<Item = &ClientProfile> {
		self.0.values()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn name(value: &str) -> ProfileId {
		ProfileId::new(value).expect("Profile name fixture should be valid.")
	}

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse successfully.")
	}

	#[test]
	fn builder_validates_base_url_and_scopes() {
		let err = ClientProfile::builder(name("server-api"))
			.scope("user.read")
			.build()
			.expect_err("Missing base URL must be rejected.");

		assert!(matches!(err, ProfileError::MissingBaseUrl { .. }));

		let err = ClientProfile::builder(name("server-api"))
			.base_url(url("https://api.example.com/"))
			.build()
			.expect_err("Profiles without scopes must fail at startup.");

		assert!(matches!(err, ProfileError::EmptyScopes { .. }));

		let err = ClientProfile::builder(name("server-api"))
			.base_url(url("ftp://api.example.com/"))
			.scope("user.read")
			.build()
			.expect_err("Non-http(s) base URLs must be rejected.");

		assert!(matches!(err, ProfileError::UnsupportedScheme { .. }));

		let err = ClientProfile::builder(name("server-api"))
			.base_url(url("https://api.example.com/"))
			.scope("has space")
			.build()
			.expect_err("Scope validation must propagate.");

		assert!(matches!(err, ProfileError::InvalidScope(_)));
	}

	#[test]
	fn builder_normalizes_scopes() {
		let profile = ClientProfile::builder(name("server-api"))
			.base_url(url("https://api.example.com/"))
			.scopes(["files.read", "user.read", "user.read"])
			.build()
			.expect("Profile builder should succeed for valid input.");

		assert_eq!(profile.scopes.normalized(), "files.read user.read");
	}

	#[test]
	fn registry_rejects_duplicates_and_resolves_by_str() {
		let profile = ClientProfile::builder(name("server-api"))
			.base_url(url("https://api.example.com/"))
			.scope("user.read")
			.build()
			.expect("Profile builder should succeed for registry test.");
		let mut registry = ProfileRegistry::new();

		registry.register(profile.clone()).expect("First registration should succeed.");

		let err = registry
			.register(profile)
			.expect_err("Duplicate registration must be rejected.");

		assert!(matches!(err, ProfileError::Duplicate { .. }));
		assert_eq!(registry.len(), 1);
		assert!(registry.get("server-api").is_some());
		assert!(registry.get("other-api").is_none());
	}
}
