//! Startup configuration read once by the application's composition root.
//!
//! The document carries two sections: identity-provider settings handed to the
//! authentication collaborator, and the upstream API targets converted into
//! the courier's profile registry. Validation is front-loaded: a target
//! without scopes fails [`CourierConfig::build_registry`] before any courier
//! exists, never at first request.

// self
use crate::{
	_prelude::*,
	auth::{ClientAppId, ProfileId, TenantId},
	error::ConfigError,
	profile::{ClientProfile, ProfileError, ProfileRegistry},
};

/// How the application routes users into the interactive sign-in flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMode {
	#[default]
	/// Full-page redirect to the identity provider.
	Redirect,
	/// Popup window flow.
	Popup,
}

/// Identity-provider settings handed to the authentication collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySettings {
	/// Authority (tenant sign-in endpoint) URL.
	pub authority: Url,
	/// Directory tenant the application is registered in.
	pub tenant: TenantId,
	/// Application (client) registration identifier.
	pub client_app: ClientAppId,
	/// Interactive flow style.
	#[serde(default)]
	pub login_mode: LoginMode,
}

/// One upstream API target as it appears in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamApi {
	/// Logical profile name.
	pub name: ProfileId,
	/// Base address for the API.
	pub base_url: Url,
	/// Scopes tokens for this API must carry; an empty list is a fatal
	/// startup error.
	pub scopes: Vec<String>,
}

/// Root configuration document, deserialized once at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierConfig {
	/// Identity-provider section.
	pub identity: IdentitySettings,
	/// Upstream API targets.
	pub apis: Vec<UpstreamApi>,
}
impl CourierConfig {
	/// Parses a JSON configuration document, locating the offending path on
	/// failure.
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let deserializer = &mut serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(deserializer)
			.map_err(|source| ConfigError::Parse { source })
	}

	/// Validates every API entry and builds the startup profile registry.
	pub fn build_registry(&self) -> Result<ProfileRegistry, ConfigError> {
		let mut registry = ProfileRegistry::new();

		for api in &self.apis {
			if api.scopes.is_empty() {
				return Err(ProfileError::EmptyScopes { profile: api.name.to_string() }.into());
			}

			let profile = ClientProfile::builder(api.name.clone())
				.base_url(api.base_url.clone())
				.scopes(api.scopes.iter().cloned())
				.build()?;

			registry.register(profile)?;
		}

		Ok(registry)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const RAW: &str = r#"{
		"identity": {
			"authority": "https://login.example.com/common",
			"tenant": "common",
			"client_app": "11111111-2222-3333-4444-555555555555"
		},
		"apis": [
			{
				"name": "server-api",
				"base_url": "https://api.example.com/",
				"scopes": ["api://server/.default"]
			}
		]
	}"#;

	#[test]
	fn valid_documents_build_a_registry() {
		let config = CourierConfig::from_json(RAW).expect("Document fixture should parse.");

		assert_eq!(config.identity.login_mode, LoginMode::Redirect);
		assert_eq!(config.identity.tenant.as_ref(), "common");

		let registry =
			config.build_registry().expect("Registry should build from a valid document.");
		let profile = registry.get("server-api").expect("Configured profile should resolve.");

		assert_eq!(profile.base_url.as_str(), "https://api.example.com/");
		assert!(profile.scopes.contains("api://server/.default"));
	}

	#[test]
	fn parse_failures_name_the_offending_path() {
		let raw = RAW.replace("\"common\"", "\"has space\"");
		let err = CourierConfig::from_json(&raw)
			.expect_err("Invalid tenant identifier must fail parsing.");

		assert!(matches!(err, ConfigError::Parse { .. }));
		assert!(err.to_string().contains("Configuration could not be parsed"));

		let ConfigError::Parse { source } = err else {
			panic!("Parse failures should carry the located source.");
		};

		assert_eq!(source.path().to_string(), "identity.tenant");
	}

	#[test]
	fn missing_scopes_are_fatal_at_startup() {
		let raw = RAW.replace("[\"api://server/.default\"]", "[]");
		let config =
			CourierConfig::from_json(&raw).expect("Document without scopes still parses.");
		let err = config
			.build_registry()
			.expect_err("Scope-less targets must fail before any courier exists.");

		assert!(matches!(
			err,
			ConfigError::Profile(ProfileError::EmptyScopes { ref profile }) if profile == "server-api",
		));
	}

	#[test]
	fn duplicate_target_names_are_rejected() {
		let mut config = CourierConfig::from_json(RAW).expect("Document fixture should parse.");

		config.apis.push(config.apis[0].clone());

		let err = config.build_registry().expect_err("Duplicate names must be rejected.");

		assert!(matches!(err, ConfigError::Profile(ProfileError::Duplicate { .. })));
	}

	#[test]
	fn login_mode_round_trips_in_snake_case() {
		let popup: LoginMode =
			serde_json::from_str("\"popup\"").expect("Popup mode should deserialize.");

		assert_eq!(popup, LoginMode::Popup);
		assert_eq!(
			serde_json::to_string(&LoginMode::Redirect).expect("Mode should serialize."),
			"\"redirect\"",
		);
	}
}
