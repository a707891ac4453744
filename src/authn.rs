//! Contract for the external authentication collaborator.
//!
//! The courier never implements the identity protocol itself. It calls the two
//! operations below and interprets their outcomes; implementations wrap
//! whatever identity library owns the provider session. Both operations are
//! suspend points: a caller dropped mid-call abandons the attempt without any
//! courier-side state change.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenHandle},
};

/// Boxed future returned by [`Authenticator::acquire_token_silent`].
pub type AcquireFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TokenHandle, AcquireError>> + 'a + Send>>;
/// Boxed future returned by [`Authenticator::sign_in_interactive`].
pub type SignInFuture<'a> = Pin<Box<dyn Future<Output = Result<(), AcquireError>> + 'a + Send>>;

/// External collaborator that owns the identity-provider session.
///
/// Injected into the courier at construction (no ambient lookup); typically a
/// thin adapter over the application's identity library, shared behind `Arc`.
pub trait Authenticator
where
	Self: Send + Sync,
{
	/// Attempts to obtain a token covering `scopes` without user interaction.
	fn acquire_token_silent<'a>(&'a self, scopes: &'a ScopeSet) -> AcquireFuture<'a>;

	/// Runs the user-facing sign-in flow requesting `scopes`.
	fn sign_in_interactive<'a>(&'a self, scopes: &'a ScopeSet) -> SignInFuture<'a>;
}

/// Failure surface reported by [`Authenticator`] operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum AcquireError {
	/// No token can be minted without user consent or login.
	#[error("Silent acquisition requires an interactive sign-in.")]
	InteractionRequired,
	/// Any other failure (network, provider outage, throttling).
	#[error("Token acquisition failed: {message}.")]
	Failed {
		/// Collaborator-supplied failure summary.
		message: String,
		/// Retry hint, if the provider supplied one.
		retry_after: Option<Duration>,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn acquire_errors_render_their_context() {
		let err = AcquireError::Failed {
			message: "token endpoint unreachable".into(),
			retry_after: Some(Duration::seconds(30)),
		};

		assert!(err.to_string().contains("token endpoint unreachable"));
		assert_eq!(
			AcquireError::InteractionRequired.to_string(),
			"Silent acquisition requires an interactive sign-in.",
		);
	}
}
