//! Bearer token handles with instant-based freshness checks and a validating builder.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::TokenSecret},
};

/// Errors produced by [`TokenHandleBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenHandleBuilderError {
	/// No access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// No expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
	/// The expiry instant does not lie after the issue instant.
	#[error("Expiry must lie strictly after the issue instant.")]
	ExpiryNotAfterIssue,
}

/// Opaque access token plus the expiry instant and scope set it was issued for.
///
/// Handles are produced by the external authentication collaborator and cached
/// privately by the courier; one is attached to a request only while fresh.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenHandle {
	/// Scopes the token was issued for.
	pub scope: ScopeSet,
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Issue instant reported by the collaborator.
	pub issued_at: OffsetDateTime,
	/// Expiry instant; the handle is never attached at or past this instant.
	pub expires_at: OffsetDateTime,
}
impl TokenHandle {
	/// Returns a builder for the provided scope set.
	pub fn builder(scope: ScopeSet) -> TokenHandleBuilder {
		TokenHandleBuilder::new(scope)
	}

	/// Returns true if the handle expires strictly after `instant`, keeping `leeway` to spare.
	pub fn is_fresh_at(&self, instant: OffsetDateTime, leeway: Duration) -> bool {
		self.expires_at - leeway > instant
	}

	/// Returns true if the handle reached its expiry at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		!self.is_fresh_at(instant, Duration::ZERO)
	}

	/// Remaining lifetime at `instant`; zero once expired.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}

	/// Returns true if the granted scopes cover `required`.
	pub fn covers(&self, required: &ScopeSet) -> bool {
		self.scope.covers(required)
	}
}
impl Debug for TokenHandle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenHandle")
			.field("scope", &self.scope)
			.field("access_token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`TokenHandle`].
#[derive(Clone, Debug)]
pub struct TokenHandleBuilder {
	scope: ScopeSet,
	access_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl TokenHandleBuilder {
	fn new(scope: ScopeSet) -> Self {
		Self { scope, access_token: None, issued_at: None, expires_at: None, expires_in: None }
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the issue instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Convenience helper that stamps `issued_at` with the current clock.
	pub fn issued_now(self) -> Self {
		self.issued_at(OffsetDateTime::now_utc())
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issue instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a validated [`TokenHandle`].
	pub fn build(self) -> Result<TokenHandle, TokenHandleBuilderError> {
		let access_token = self.access_token.ok_or(TokenHandleBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(TokenHandleBuilderError::MissingExpiry),
		};

		if expires_at <= issued_at {
			return Err(TokenHandleBuilderError::ExpiryNotAfterIssue);
		}

		Ok(TokenHandle { scope: self.scope, access_token, issued_at, expires_at })
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn scope() -> ScopeSet {
		ScopeSet::new(["user.read"]).expect("Scope fixture should be valid for handle tests.")
	}

	#[test]
	fn freshness_is_strict_at_the_expiry_instant() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let expires = macros::datetime!(2025-01-01 01:00 UTC);
		let handle = TokenHandle::builder(scope())
			.access_token("access")
			.issued_at(issued)
			.expires_at(expires)
			.build()
			.expect("Handle builder should succeed for freshness checks.");

		assert!(handle.is_fresh_at(macros::datetime!(2025-01-01 00:59 UTC), Duration::ZERO));
		assert!(!handle.is_fresh_at(expires, Duration::ZERO), "Expiry instant itself is stale.");
		assert!(handle.is_expired_at(macros::datetime!(2025-01-01 01:01 UTC)));
		assert_eq!(
			handle.remaining_at(macros::datetime!(2025-01-01 00:30 UTC)),
			Duration::minutes(30),
		);
		assert_eq!(handle.remaining_at(macros::datetime!(2025-01-01 02:00 UTC)), Duration::ZERO);
	}

	#[test]
	fn leeway_moves_the_staleness_boundary_forward() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let handle = TokenHandle::builder(scope())
			.access_token("access")
			.issued_at(issued)
			.expires_in(Duration::minutes(10))
			.build()
			.expect("Handle builder should support relative expiry.");

		assert_eq!(handle.expires_at, macros::datetime!(2025-01-01 00:10 UTC));

		let probe = macros::datetime!(2025-01-01 00:06 UTC);

		assert!(handle.is_fresh_at(probe, Duration::ZERO));
		assert!(!handle.is_fresh_at(probe, Duration::minutes(5)));
	}

	#[test]
	fn builder_validates_inputs() {
		let err = TokenHandle::builder(scope())
			.issued_now()
			.expires_in(Duration::minutes(5))
			.build()
			.expect_err("Missing access token must be rejected.");

		assert_eq!(err, TokenHandleBuilderError::MissingAccessToken);

		let err = TokenHandle::builder(scope())
			.access_token("access")
			.build()
			.expect_err("Missing expiry must be rejected.");

		assert_eq!(err, TokenHandleBuilderError::MissingExpiry);

		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let err = TokenHandle::builder(scope())
			.access_token("access")
			.issued_at(issued)
			.expires_at(issued)
			.build()
			.expect_err("Expiry at the issue instant must be rejected.");

		assert_eq!(err, TokenHandleBuilderError::ExpiryNotAfterIssue);
	}

	#[test]
	fn debug_redacts_the_access_token() {
		let handle = TokenHandle::builder(scope())
			.access_token("super-secret")
			.issued_now()
			.expires_in(Duration::minutes(5))
			.build()
			.expect("Handle builder should succeed for debug output.");
		let rendered = format!("{handle:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("super-secret"));
	}
}
