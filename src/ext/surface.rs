//! Maps the failure taxonomy onto the two user-visible surfaces.

// self
use crate::{
	_prelude::*,
	auth::{ProfileId, ScopeSet},
	error::TokenAcquisitionError,
};

/// User-facing disposition for a failed call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureSurface {
	/// Route the user into the interactive sign-in flow.
	LoginRedirect {
		/// Profile whose token needs the interactive flow.
		profile: ProfileId,
		/// Scopes the flow must request.
		scopes: ScopeSet,
	},
	/// Show a generic request-failed state.
	RequestFailed {
		/// Whether an eventual retry may succeed.
		retryable: bool,
		/// Backoff hint, when one is known.
		retry_after: Option<Duration>,
	},
}

/// Classifies a courier error for presentation.
///
/// Interaction-required failures map to a sign-in redirect carrying the
/// context an interactive flow needs; everything else maps to a request-failed
/// state, retryable for transient and unauthorized outcomes.
pub fn surface(error: &Error) -> FailureSurface {
	match error {
		Error::InteractionRequired { profile, scopes } =>
			FailureSurface::LoginRedirect { profile: profile.clone(), scopes: scopes.clone() },
		Error::TokenAcquisition(TokenAcquisitionError::Provider { retry_after, .. }) =>
			FailureSurface::RequestFailed { retryable: true, retry_after: *retry_after },
		Error::Unauthorized { .. } | Error::Transport(_) =>
			FailureSurface::RequestFailed { retryable: true, retry_after: None },
		Error::Config(_) | Error::TokenAcquisition(_) =>
			FailureSurface::RequestFailed { retryable: false, retry_after: None },
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::ConfigError;

	fn profile_id() -> ProfileId {
		ProfileId::new("server-api").expect("Profile fixture should be valid.")
	}

	fn scopes() -> ScopeSet {
		ScopeSet::new(["user.read"]).expect("Scope fixture should be valid.")
	}

	#[test]
	fn interaction_required_maps_to_a_login_redirect() {
		let err = Error::InteractionRequired { profile: profile_id(), scopes: scopes() };
		let FailureSurface::LoginRedirect { profile, scopes } = surface(&err) else {
			panic!("Interaction-required failures should surface as redirects.");
		};

		assert_eq!(profile.as_ref(), "server-api");
		assert!(scopes.contains("user.read"));
	}

	#[test]
	fn everything_else_is_a_request_failed_state() {
		let err = Error::Unauthorized { profile: profile_id() };

		assert_eq!(
			surface(&err),
			FailureSurface::RequestFailed { retryable: true, retry_after: None },
		);

		let err: Error = ConfigError::UnknownProfile { profile: "missing".into() }.into();

		assert_eq!(
			surface(&err),
			FailureSurface::RequestFailed { retryable: false, retry_after: None },
		);

		let err = Error::TokenAcquisition(TokenAcquisitionError::Provider {
			profile: profile_id(),
			message: "outage".into(),
			retry_after: Some(Duration::seconds(15)),
		});

		assert_eq!(
			surface(&err),
			FailureSurface::RequestFailed {
				retryable: true,
				retry_after: Some(Duration::seconds(15)),
			},
		);

		let err = Error::TokenAcquisition(TokenAcquisitionError::StaleToken {
			profile: profile_id(),
		});

		assert_eq!(
			surface(&err),
			FailureSurface::RequestFailed { retryable: false, retry_after: None },
		);
	}
}
