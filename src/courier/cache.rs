//! Private, epoch-aware token cache owned exclusively by the courier.

// self
use crate::{
	_prelude::*,
	auth::{ProfileId, TokenHandle},
};

/// Per-profile cache entry tagged with the session epoch it was written under.
///
/// Entries whose epoch trails the session are treated as absent by readers,
/// which is how sign-in and sign-out reset every profile to the no-token state
/// without touching the cache.
#[derive(Clone, Debug, Default)]
pub(crate) struct ProfileTokenState {
	pub(crate) token: Option<TokenHandle>,
	pub(crate) needs_interaction: bool,
	pub(crate) epoch: u64,
}

#[derive(Debug, Default)]
pub(crate) struct TokenCache(RwLock<HashMap<ProfileId, ProfileTokenState>>);
impl TokenCache {
	pub(crate) fn state(&self, profile: &ProfileId) -> Option<ProfileTokenState> {
		self.0.read().get(profile).cloned()
	}

	/// Replaces the cached token and clears any interaction marker.
	pub(crate) fn store_token(&self, profile: &ProfileId, token: TokenHandle, epoch: u64) {
		self.0.write().insert(
			profile.clone(),
			ProfileTokenState { token: Some(token), needs_interaction: false, epoch },
		);
	}

	/// Marks the profile as requiring interactive sign-in.
	///
	/// A token written under the same epoch is left in place; an entry carried
	/// over from an older epoch is emptied first.
	pub(crate) fn mark_interaction_required(&self, profile: &ProfileId, epoch: u64) {
		let mut guard = self.0.write();
		let entry = guard.entry(profile.clone()).or_default();

		if entry.epoch != epoch {
			entry.token = None;
		}

		entry.epoch = epoch;
		entry.needs_interaction = true;
	}

	/// Drops the cached token so the next call re-acquires.
	pub(crate) fn invalidate_token(&self, profile: &ProfileId) {
		if let Some(entry) = self.0.write().get_mut(profile) {
			entry.token = None;
		}
	}

	pub(crate) fn clear(&self) {
		self.0.write().clear();
	}
}
