//! Rust’s turnkey authenticated-API-client provisioner—hand out bearer-ready HTTP clients with
//! silent refresh, singleflight acquisition, and interaction-aware failure surfaces in one crate
//! built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authn;
pub mod config;
pub mod courier;
pub mod error;
pub mod ext;
pub mod http;
pub mod obs;
pub mod profile;
pub mod session;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience doubles and fixtures for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		sync::atomic::{AtomicU64, Ordering},
	};
	// self
	use crate::{
		auth::{ProfileId, ScopeSet, TokenHandle},
		authn::{AcquireError, AcquireFuture, Authenticator, SignInFuture},
		courier::Courier,
		http::{ApiRequest, ApiResponse, ApiTransport, DispatchFuture},
		profile::{ClientProfile, ProfileRegistry},
		session::AuthSession,
	};
	#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

	#[cfg(feature = "reqwest")]
	/// Courier type alias used by reqwest-backed integration tests.
	pub type ReqwestTestCourier = Courier<ReqwestTransport>;

	/// Authenticator double that replays queued outcomes and counts calls.
	#[derive(Debug, Default)]
	pub struct ScriptedAuthenticator {
		outcomes: Mutex<VecDeque<Result<TokenHandle, AcquireError>>>,
		acquire_calls: AtomicU64,
		sign_in_calls: AtomicU64,
	}
	impl ScriptedAuthenticator {
		/// Queues a successful silent acquisition.
		pub fn push_token(&self, token: TokenHandle) {
			self.outcomes.lock().push_back(Ok(token));
		}

		/// Queues an interaction-required outcome.
		pub fn push_interaction_required(&self) {
			self.outcomes.lock().push_back(Err(AcquireError::InteractionRequired));
		}

		/// Queues a transient acquisition failure.
		pub fn push_failure(&self, message: impl Into<String>, retry_after: Option<Duration>) {
			self.outcomes
				.lock()
				.push_back(Err(AcquireError::Failed { message: message.into(), retry_after }));
		}

		/// Number of silent acquisitions the courier issued.
		pub fn acquire_calls(&self) -> u64 {
			self.acquire_calls.load(Ordering::Relaxed)
		}

		/// Number of interactive sign-ins the courier issued.
		pub fn sign_in_calls(&self) -> u64 {
			self.sign_in_calls.load(Ordering::Relaxed)
		}
	}
	impl Authenticator for ScriptedAuthenticator {
		fn acquire_token_silent<'a>(&'a self, _scopes: &'a ScopeSet) -> AcquireFuture<'a> {
			self.acquire_calls.fetch_add(1, Ordering::Relaxed);

			let outcome = self.outcomes.lock().pop_front().unwrap_or_else(|| {
				Err(AcquireError::Failed {
					message: "scripted authenticator has no outcome queued".into(),
					retry_after: None,
				})
			});

			Box::pin(async move { outcome })
		}

		fn sign_in_interactive<'a>(&'a self, _scopes: &'a ScopeSet) -> SignInFuture<'a> {
			self.sign_in_calls.fetch_add(1, Ordering::Relaxed);

			Box::pin(async move { Ok(()) })
		}
	}

	/// Record of one request observed by [`StaticTransport`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// Request method.
		pub method: http::Method,
		/// Fully resolved request target.
		pub uri: http::Uri,
		/// Headers as dispatched, bearer credential included.
		pub headers: http::HeaderMap,
	}

	/// In-process transport double that replays queued responses and records requests.
	#[derive(Debug, Default)]
	pub struct StaticTransport {
		replies: Mutex<VecDeque<ApiResponse>>,
		seen: Mutex<Vec<RecordedRequest>>,
	}
	impl StaticTransport {
		/// Queues a response with the provided status and an empty body.
		pub fn push_status(&self, status: http::StatusCode) {
			let mut response = ApiResponse::new(Vec::new());

			*response.status_mut() = status;

			self.replies.lock().push_back(response);
		}

		/// Requests dispatched so far.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.seen.lock().clone()
		}
	}
	impl ApiTransport for StaticTransport {
		type Error = std::io::Error;

		fn dispatch(&self, request: ApiRequest) -> DispatchFuture<'_, Self::Error> {
			self.seen.lock().push(RecordedRequest {
				method: request.method().clone(),
				uri: request.uri().clone(),
				headers: request.headers().clone(),
			});

			let response =
				self.replies.lock().pop_front().unwrap_or_else(|| ApiResponse::new(Vec::new()));

			Box::pin(async move { Ok(response) })
		}
	}

	/// Builds a fresh token fixture for the provided scopes and lifetime.
	pub fn test_token(scopes: &ScopeSet, ttl: Duration) -> TokenHandle {
		TokenHandle::builder(scopes.clone())
			.access_token(format!("access-{}", ttl.whole_seconds()))
			.issued_now()
			.expires_in(ttl)
			.build()
			.expect("Token fixture should build successfully.")
	}

	/// Builds a profile fixture.
	pub fn test_profile(name: &str, base: &str, scopes: &[&str]) -> ClientProfile {
		ClientProfile::builder(ProfileId::new(name).expect("Profile name fixture should be valid."))
			.base_url(Url::parse(base).expect("Base URL fixture should parse successfully."))
			.scopes(scopes.iter().copied())
			.build()
			.expect("Profile fixture should build successfully.")
	}

	/// Builds a single-profile registry fixture.
	pub fn test_registry(profile: ClientProfile) -> ProfileRegistry {
		let mut registry = ProfileRegistry::new();

		registry.register(profile).expect("Profile fixture should register successfully.");

		registry
	}

	/// Constructs a [`Courier`] over [`StaticTransport`] with scripted collaborators.
	#[allow(clippy::type_complexity)]
	pub fn build_static_test_courier(
		registry: ProfileRegistry,
	) -> (Courier<StaticTransport>, Arc<ScriptedAuthenticator>, Arc<AuthSession>, Arc<StaticTransport>)
	{
		let authenticator = Arc::new(ScriptedAuthenticator::default());
		let shared: Arc<dyn Authenticator> = authenticator.clone();
		let session = Arc::new(AuthSession::new());
		let transport = Arc::new(StaticTransport::default());
		let courier =
			Courier::with_transport(registry, shared, session.clone(), transport.clone());

		(courier, authenticator, session, transport)
	}

	#[cfg(feature = "reqwest")]
	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	#[cfg(feature = "reqwest")]
	/// Constructs a [`Courier`] backed by the reqwest transport used across integration tests.
	pub fn build_reqwest_test_courier(
		registry: ProfileRegistry,
	) -> (ReqwestTestCourier, Arc<ScriptedAuthenticator>, Arc<AuthSession>) {
		let authenticator = Arc::new(ScriptedAuthenticator::default());
		let shared: Arc<dyn Authenticator> = authenticator.clone();
		let session = Arc::new(AuthSession::new());
		let courier =
			Courier::with_transport(registry, shared, session.clone(), test_reqwest_transport());

		(courier, authenticator, session)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {bearer_courier as _, color_eyre as _, httpmock as _};
