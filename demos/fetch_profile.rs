//! Demonstrates wiring startup configuration, an authentication collaborator, and the default
//! reqwest transport into a courier that calls a mocked upstream API with bearer tokens attached.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::Duration;
// self
use bearer_courier::{
	auth::{ScopeSet, TokenHandle},
	authn::{AcquireError, AcquireFuture, Authenticator, SignInFuture},
	config::CourierConfig,
	courier::Courier,
	session::AuthSession,
};

/// Demo collaborator that mints a fixed-lifetime token for whatever scopes are requested.
struct DemoAuthenticator;
impl Authenticator for DemoAuthenticator {
	fn acquire_token_silent<'a>(&'a self, scopes: &'a ScopeSet) -> AcquireFuture<'a> {
		Box::pin(async move {
			TokenHandle::builder(scopes.clone())
				.access_token("demo-access")
				.issued_now()
				.expires_in(Duration::minutes(15))
				.build()
				.map_err(|e| AcquireError::Failed { message: e.to_string(), retry_after: None })
		})
	}

	fn sign_in_interactive<'a>(&'a self, _scopes: &'a ScopeSet) -> SignInFuture<'a> {
		Box::pin(async move { Ok(()) })
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/profile").header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"displayName\":\"Demo User\"}");
		})
		.await;
	let raw = format!(
		r#"{{
			"identity": {{
				"authority": "https://login.example.com/common",
				"tenant": "common",
				"client_app": "11111111-2222-3333-4444-555555555555"
			}},
			"apis": [
				{{
					"name": "server-api",
					"base_url": "{}",
					"scopes": ["api://server/.default"]
				}}
			]
		}}"#,
		server.base_url(),
	);
	let config = CourierConfig::from_json(&raw)?;
	let registry = config.build_registry()?;
	let session = Arc::new(AuthSession::new());
	let courier = Courier::new(registry, Arc::new(DemoAuthenticator), session);

	courier.sign_in("server-api").await?;

	let client = courier.get_client("server-api")?;
	let response = client.get("/profile").await?;

	println!(
		"Upstream responded {} with {}.",
		response.status(),
		String::from_utf8_lossy(response.body()),
	);

	profile_mock.assert_async().await;

	Ok(())
}
