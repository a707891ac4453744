//! Silent token acquisition with per-profile singleflight de-duplication.
//!
//! Every dispatch resolves its bearer token here. The fast path reads the
//! cache under the current session epoch; the slow path serializes on a
//! per-profile guard so concurrent callers piggy-back on one in-flight
//! acquisition instead of stampeding the collaborator. A caller dropped
//! mid-acquisition abandons the attempt without mutating the cache: the cache
//! write happens after the awaited collaborator call, in the same task.

// self
use crate::{
	_prelude::*,
	auth::{ProfileId, TokenHandle},
	authn::AcquireError,
	courier::Courier,
	error::TokenAcquisitionError,
	http::ApiTransport,
	obs::{self, OpKind, OpOutcome, OpSpan},
	profile::ClientProfile,
};

impl<T> Courier<T>
where
	T: ?Sized + ApiTransport,
{
	/// Resolves a fresh token for the profile, acquiring silently on demand.
	pub(crate) async fn resolve_access_token(
		&self,
		profile: &ClientProfile,
	) -> Result<TokenHandle> {
		const KIND: OpKind = OpKind::Acquire;

		let span = OpSpan::new(KIND, "resolve_access_token");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				if let Some(handle) = self.cached_token(profile)? {
					self.acquire_metrics.record_cache_hit();

					return Ok(handle);
				}

				let guard = self.acquire_guard(&profile.name);
				let _singleflight = guard.lock().await;

				// Piggy-back on an acquisition that completed while awaiting
				// the guard.
				if let Some(handle) = self.cached_token(profile)? {
					self.acquire_metrics.record_cache_hit();

					return Ok(handle);
				}

				let epoch = self.session.epoch();

				self.acquire_metrics.record_attempt();

				if !self.session.is_signed_in() {
					self.acquire_metrics.record_interaction_denial();

					return Err(self.interaction_required(profile));
				}

				match self.authenticator.acquire_token_silent(&profile.scopes).await {
					Ok(handle) => {
						let handle = self.admit_handle(profile, handle)?;

						self.cache.store_token(&profile.name, handle.clone(), epoch);
						self.acquire_metrics.record_success();

						Ok(handle)
					},
					Err(AcquireError::InteractionRequired) => {
						self.cache.mark_interaction_required(&profile.name, epoch);
						self.acquire_metrics.record_interaction_denial();

						Err(self.interaction_required(profile))
					},
					Err(AcquireError::Failed { message, retry_after }) => {
						self.acquire_metrics.record_failure();

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

	/// Reads the cached token, honoring epoch, staleness, and scope coverage.
	///
	/// A standing interaction-required marker fails fast here, without a
	/// collaborator call, until an external sign-in advances the epoch.
	fn cached_token(&self, profile: &ClientProfile) -> Result<Option<TokenHandle>> {
		let epoch = self.session.epoch();
		let Some(state) = self.cache.state(&profile.name) else {
			return Ok(None);
		};

		if state.epoch != epoch {
			return Ok(None);
		}
		if state.needs_interaction {
			return Err(self.interaction_required(profile));
		}

		let now = OffsetDateTime::now_utc();

		Ok(state.token.filter(|token| {
			token.is_fresh_at(now, self.refresh_leeway) && token.covers(&profile.scopes)
		}))
	}

	/// Validates a freshly acquired handle before caching it.
	fn admit_handle(&self, profile: &ClientProfile, handle: TokenHandle) -> Result<TokenHandle> {
		let now = OffsetDateTime::now_utc();

		if !handle.is_fresh_at(now, Duration::ZERO) {
			self.acquire_metrics.record_failure();

			return Err(TokenAcquisitionError::StaleToken { profile: profile.name.clone() }.into());
		}
		if !handle.covers(&profile.scopes) {
			self.acquire_metrics.record_failure();

			return Err(TokenAcquisitionError::ScopeShortfall {
				profile: profile.name.clone(),
				granted: handle.scope.clone(),
				required: profile.scopes.clone(),
			}
			.into());
		}

		Ok(handle)
	}

	fn interaction_required(&self, profile: &ClientProfile) -> Error {
		Error::InteractionRequired {
			profile: profile.name.clone(),
			scopes: profile.scopes.clone(),
		}
	}

	/// Returns (and creates on demand) the singleflight guard for a profile.
	fn acquire_guard(&self, profile: &ProfileId) -> Arc<AsyncMutex<()>> {
		let mut guards = self.acquire_guards.lock();

		guards.entry(profile.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
