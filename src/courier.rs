//! The authenticated-client provisioning core.
//!
//! [`Courier`] owns the transport, the authentication collaborator, the
//! injected session, and a private token cache. [`ApiClient`] handles produced
//! by [`Courier::get_client`] are cheap, profile-bound views: binding is by
//! configuration only, and the bearer token is resolved per request, never at
//! handle-creation time.

mod acquire;
mod cache;
mod dispatch;
mod metrics;

pub use metrics::AcquireMetrics;

// self
use crate::{
	_prelude::*,
	auth::ProfileId,
	authn::{AcquireError, Authenticator},
	courier::cache::TokenCache,
	error::{ConfigError, TokenAcquisitionError},
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, OpKind, OpOutcome, OpSpan},
	profile::{ClientProfile, ProfileRegistry},
	session::AuthSession,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Courier specialized for the crate's default reqwest transport stack.
pub type ReqwestCourier = Courier<ReqwestTransport>;

/// Provisions authenticated HTTP client handles for registered profiles.
///
/// The courier holds every collaborator behind `Arc`, so clones are cheap and
/// share the token cache, the singleflight guards, and the metrics recorder.
/// All mutable state is process-memory-only and cleared on sign-out.
pub struct Courier<T>
where
	T: ?Sized + ApiTransport,
{
	/// HTTP transport used for every upstream call.
	pub transport: Arc<T>,
	/// External collaborator that owns the identity-provider session.
	pub authenticator: Arc<dyn Authenticator>,
	/// Injected application session state.
	pub session: Arc<AuthSession>,
	/// Profiles registered at startup.
	pub registry: Arc<ProfileRegistry>,
	/// Shared metrics recorder for acquisition outcomes.
	pub acquire_metrics: Arc<AcquireMetrics>,
	refresh_leeway: Duration,
	cache: Arc<TokenCache>,
	acquire_guards: Arc<Mutex<HashMap<ProfileId, Arc<AsyncMutex<()>>>>>,
}
impl<T> Courier<T>
where
	T: ?Sized + ApiTransport,
{
	const DEFAULT_REFRESH_LEEWAY: Duration = Duration::seconds(30);

	/// Creates a courier that reuses the caller-provided transport.
	pub fn with_transport(
		registry: impl Into<Arc<ProfileRegistry>>,
		authenticator: Arc<dyn Authenticator>,
		session: Arc<AuthSession>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			authenticator,
			session,
			registry: registry.into(),
			acquire_metrics: Default::default(),
			refresh_leeway: Self::DEFAULT_REFRESH_LEEWAY,
			cache: Default::default(),
			acquire_guards: Default::default(),
		}
	}

	/// Overrides how early before expiry a cached token counts as stale.
	///
	/// Negative values clamp to zero; zero keeps cached tokens right up to the
	/// expiry instant.
	pub fn with_refresh_leeway(mut self, leeway: Duration) -> Self {
		self.refresh_leeway = if leeway.is_negative() { Duration::ZERO } else { leeway };

		self
	}

	/// Staleness margin applied to cached tokens.
	pub fn refresh_leeway(&self) -> Duration {
		self.refresh_leeway
	}

	/// Looks up a registered profile.
	pub fn profile(&self, name: &str) -> Result<&ClientProfile> {
		self.registry
			.get(name)
			.ok_or_else(|| ConfigError::UnknownProfile { profile: name.into() }.into())
	}

	/// Returns a lightweight client handle bound to the named profile.
	///
	/// Unknown names fail with a configuration error and no network activity.
	pub fn get_client(&self, name: &str) -> Result<ApiClient<T>> {
		let profile = self.profile(name)?.clone();

		Ok(ApiClient { courier: self.clone(), profile })
	}

	/// Runs the collaborator's interactive sign-in for the named profile's
	/// scopes and records the outcome in the session.
	///
	/// The session epoch advances on success, so standing interaction-required
	/// markers and tokens from the previous session read as absent afterwards.
	pub async fn sign_in(&self, name: &str) -> Result<()> {
		const KIND: OpKind = OpKind::SignIn;

		let span = OpSpan::new(KIND, "sign_in");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let profile = self.profile(name)?;

				match self.authenticator.sign_in_interactive(&profile.scopes).await {
					Ok(()) => {
						self.session.mark_signed_in();

						Ok(())
					},
					Err(err) => {
						let (message, retry_after) = match err {
							AcquireError::Failed { message, retry_after } =>
								(message, retry_after),
							AcquireError::InteractionRequired =>
								("Interactive sign-in did not complete.".into(), None),
						};

						Err(TokenAcquisitionError::Provider {
							profile: profile.name.clone(),
							message,
							retry_after,
						}
						.into())
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Tears the session down and clears every cached token.
	pub fn sign_out(&self) {
		self.session.mark_signed_out();
		self.cache.clear();
	}
}
#[cfg(feature = "reqwest")]
impl Courier<ReqwestTransport> {
	/// Creates a courier with a default reqwest transport.
	pub fn new(
		registry: impl Into<Arc<ProfileRegistry>>,
		authenticator: Arc<dyn Authenticator>,
		session: Arc<AuthSession>,
	) -> Self {
		Self::with_transport(registry, authenticator, session, ReqwestTransport::default())
	}
}
impl<T> Clone for Courier<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			authenticator: self.authenticator.clone(),
			session: self.session.clone(),
			registry: self.registry.clone(),
			acquire_metrics: self.acquire_metrics.clone(),
			refresh_leeway: self.refresh_leeway,
			cache: self.cache.clone(),
			acquire_guards: self.acquire_guards.clone(),
		}
	}
}
impl<T> Debug for Courier<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Courier")
			.field("profiles", &self.registry.len())
			.field("session", &self.session.phase())
			.field("refresh_leeway", &self.refresh_leeway)
			.finish()
	}
}

/// Profile-bound client handle produced by [`Courier::get_client`].
///
/// Handles are cheap to create and clone; they carry no live token. Every
/// [`send`](Self::send) resolves a fresh bearer credential through the shared
/// courier state.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	courier: Courier<T>,
	profile: ClientProfile,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Profile this handle is bound to.
	pub fn profile(&self) -> &ClientProfile {
		&self.profile
	}

	/// Sends `request` with a fresh bearer token attached.
	///
	/// Relative request targets are resolved against the profile base;
	/// absolute targets must share its origin. Apart from the target and the
	/// `Authorization` header the request passes through unmodified, and so
	/// does every response that is not a 401.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		self.courier.dispatch(&self.profile, request).await
	}

	/// Convenience GET for the provided target.
	pub async fn get(&self, target: &str) -> Result<ApiResponse> {
		let request = http::Request::builder()
			.method(http::Method::GET)
			.uri(target)
			.body(Vec::new())
			.map_err(ConfigError::HttpRequest)?;

		self.send(request).await
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self { courier: self.courier.clone(), profile: self.profile.clone() }
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient").field("profile", &self.profile.name).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use crate::{_preludet::*, error::ConfigError};

	#[test]
	fn unknown_profiles_fail_without_any_collaborator_call() {
		let profile = test_profile("server-api", "http://localhost:8080", &["user.read"]);
		let (courier, authenticator, _session, transport) =
			build_static_test_courier(test_registry(profile));
		let err = courier
			.get_client("other-api")
			.expect_err("Unregistered names must fail with a configuration error.");

		assert!(matches!(err, Error::Config(ConfigError::UnknownProfile { .. })));
		assert_eq!(authenticator.acquire_calls(), 0);
		assert!(transport.requests().is_empty());
	}

	#[test]
	fn refresh_leeway_clamps_negative_values() {
		let profile = test_profile("server-api", "http://localhost:8080", &["user.read"]);
		let (courier, ..) = build_static_test_courier(test_registry(profile));

		assert_eq!(courier.refresh_leeway(), Duration::seconds(30));

		let courier = courier.with_refresh_leeway(Duration::seconds(-5));

		assert_eq!(courier.refresh_leeway(), Duration::ZERO);
	}
}
