//! Courier-level error types shared across configuration, acquisition, and dispatch.

// self
use crate::{
	_prelude::*,
	auth::{ProfileId, ScopeSet},
};

/// Courier-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical courier error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; fatal to the call that raised it.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token acquisition failed before any request was sent.
	#[error(transparent)]
	TokenAcquisition(#[from] TokenAcquisitionError),
	/// Transport failure (DNS, TCP, TLS) while dispatching the request.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Silent acquisition cannot proceed without a user-facing sign-in.
	///
	/// Carries enough context to route the user into an interactive flow;
	/// never retried automatically.
	#[error("Interactive sign-in is required for profile `{profile}`.")]
	InteractionRequired {
		/// Profile whose token needs the interactive flow.
		profile: ProfileId,
		/// Scopes the interactive flow must request.
		scopes: ScopeSet,
	},
	/// Upstream rejected the attached token; the cached handle was invalidated
	/// so the next call re-acquires. Retrying stays with the caller.
	#[error("Upstream rejected the bearer token for profile `{profile}`.")]
	Unauthorized {
		/// Profile whose cached token was invalidated.
		profile: ProfileId,
	},
}

/// Configuration and validation failures raised by the courier.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// `get_client` was called with a name no profile was registered under.
	#[error("No client profile is registered under `{profile}`.")]
	UnknownProfile {
		/// The unresolved profile name.
		profile: String,
	},
	/// Profile construction or registration failed.
	#[error(transparent)]
	Profile(#[from] crate::profile::ProfileError),
	/// Identifier validation failed while reading configuration.
	#[error("Configuration contains an invalid identifier.")]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Scope validation failed while reading configuration.
	#[error("Configuration contains invalid scopes.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Configuration document could not be deserialized.
	#[error("Configuration could not be parsed.")]
	Parse {
		/// Structured parsing failure locating the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Absolute request target does not share the profile base's origin.
	#[error("Request target `{url}` is outside the `{profile}` base address.")]
	RequestOutsideBase {
		/// Profile whose base address was violated.
		profile: ProfileId,
		/// Offending absolute target.
		url: String,
	},
	/// Request target could not be resolved against the profile base.
	#[error("Request target could not be resolved against the profile base.")]
	InvalidRequestTarget {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Token acquisition failures; the request is never sent.
#[derive(Debug, ThisError)]
pub enum TokenAcquisitionError {
	/// The collaborator failed for a transient reason; retry with backoff.
	#[error("Token acquisition failed for profile `{profile}`: {message}.")]
	Provider {
		/// Profile the acquisition ran for.
		profile: ProfileId,
		/// Collaborator-supplied failure summary.
		message: String,
		/// Retry hint from the collaborator, if supplied.
		retry_after: Option<Duration>,
	},
	/// The collaborator returned a handle that had already expired.
	#[error("Acquired token for profile `{profile}` is already expired.")]
	StaleToken {
		/// Profile the acquisition ran for.
		profile: ProfileId,
	},
	/// The collaborator returned a handle that does not cover the required scopes.
	#[error("Acquired token for profile `{profile}` does not cover the required scopes.")]
	ScopeShortfall {
		/// Profile the acquisition ran for.
		profile: ProfileId,
		/// Scopes the token was issued for.
		granted: ScopeSet,
		/// Scopes the profile requires.
		required: ScopeSet,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the upstream API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the upstream API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::ProfileId;

	#[test]
	fn layered_errors_convert_into_the_canonical_error() {
		let profile = ProfileId::new("server-api").expect("Profile fixture should be valid.");
		let err: Error = TokenAcquisitionError::StaleToken { profile }.into();

		assert!(matches!(err, Error::TokenAcquisition(_)));

		let err: Error = ConfigError::UnknownProfile { profile: "missing".into() }.into();

		assert!(matches!(err, Error::Config(ConfigError::UnknownProfile { .. })));
		assert!(err.to_string().contains("missing"));
	}

	#[test]
	fn transport_errors_preserve_their_source() {
		let io = std::io::Error::other("socket closed");
		let err = TransportError::from(io);

		assert!(matches!(err, TransportError::Io(_)));

		let err = TransportError::network(std::io::Error::other("dns failure"));
		let source = StdError::source(&err).expect("Network errors should expose a source.");

		assert!(source.to_string().contains("dns failure"));
	}
}
