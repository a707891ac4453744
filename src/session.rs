//! Injected authentication-session context with epoch-tagged resets.

// self
use crate::_prelude::*;

/// Sign-in phase for the application session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
	#[default]
	/// No user is authenticated; silent acquisition must not be attempted.
	SignedOut,
	/// A user session exists; silent acquisition may proceed.
	SignedIn,
}

/// Point-in-time view of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
	/// Current phase.
	pub phase: SessionPhase,
	/// Epoch the phase was entered under.
	pub epoch: u64,
	/// Instant of the last phase change, if any occurred.
	pub changed_at: Option<OffsetDateTime>,
}

/// Process-wide authentication state, owned by the application's composition
/// root and shared with the courier via `Arc`.
///
/// Every phase change bumps the epoch. Cached tokens and interaction-required
/// markers are tagged with the epoch they were written under, so a sign-in or
/// sign-out implicitly resets them: entries from an older epoch read as
/// absent. Mutations are driven by the authentication collaborator's sign-in
/// and sign-out outcomes, plumbed through the courier.
#[derive(Debug, Default)]
pub struct AuthSession(RwLock<SessionInner>);
#[derive(Debug, Default)]
struct SessionInner {
	phase: SessionPhase,
	epoch: u64,
	changed_at: Option<OffsetDateTime>,
}
impl AuthSession {
	/// Creates a session in the initial signed-out phase.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current phase.
	pub fn phase(&self) -> SessionPhase {
		self.0.read().phase
	}

	/// Returns true while a user session exists.
	pub fn is_signed_in(&self) -> bool {
		matches!(self.phase(), SessionPhase::SignedIn)
	}

	/// Epoch of the current phase.
	pub fn epoch(&self) -> u64 {
		self.0.read().epoch
	}

	/// Captures a consistent snapshot of phase, epoch, and change instant.
	pub fn snapshot(&self) -> SessionSnapshot {
		let inner = self.0.read();

		SessionSnapshot { phase: inner.phase, epoch: inner.epoch, changed_at: inner.changed_at }
	}

	/// Records a completed interactive sign-in and returns the new epoch.
	pub fn mark_signed_in(&self) -> u64 {
		self.advance(SessionPhase::SignedIn)
	}

	/// Tears the session down and returns the new epoch.
	pub fn mark_signed_out(&self) -> u64 {
		self.advance(SessionPhase::SignedOut)
	}

	fn advance(&self, phase: SessionPhase) -> u64 {
		let mut inner = self.0.write();

		inner.phase = phase;
		inner.epoch += 1;
		inner.changed_at = Some(OffsetDateTime::now_utc());

		inner.epoch
	}
}
