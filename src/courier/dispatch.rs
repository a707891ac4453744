//! Per-request bearer attachment and upstream dispatch.

// self
use crate::{
	_prelude::*,
	auth::TokenHandle,
	courier::Courier,
	error::ConfigError,
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, OpKind, OpOutcome, OpSpan},
	profile::ClientProfile,
};

impl<T> Courier<T>
where
	T: ?Sized + ApiTransport,
{
	/// Resolves a token, attaches it, and forwards the request to the
	/// profile's upstream.
	pub(crate) async fn dispatch(
		&self,
		profile: &ClientProfile,
		request: ApiRequest,
	) -> Result<ApiResponse> {
		const KIND: OpKind = OpKind::Dispatch;

		let span = OpSpan::new(KIND, "dispatch");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = self.resolve_access_token(profile).await?;
				let request = attach_bearer(profile, &token, request)?;
				let response = self
					.transport
					.dispatch(request)
					.await
					.map_err(|e| Error::Transport(e.into()))?;

				if response.status() == http::StatusCode::UNAUTHORIZED {
					// The next call self-heals by re-acquiring; this one still
					// fails and retrying stays with the caller.
					self.cache.invalidate_token(&profile.name);

					return Err(Error::Unauthorized { profile: profile.name.clone() });
				}

				Ok(response)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}
}

/// Resolves the request target against the profile base and attaches the
/// bearer credential; the request is otherwise left untouched.
fn attach_bearer(
	profile: &ClientProfile,
	token: &TokenHandle,
	request: ApiRequest,
) -> Result<ApiRequest> {
	let (mut parts, body) = request.into_parts();
	let target = resolve_target(profile, &parts.uri)?;

	parts.uri = http::Uri::try_from(target.as_str())
		.map_err(http::Error::from)
		.map_err(ConfigError::from)?;

	let mut value =
		http::HeaderValue::from_str(&format!("Bearer {}", token.access_token.expose()))
			.map_err(http::Error::from)
			.map_err(ConfigError::from)?;

	value.set_sensitive(true);
	parts.headers.insert(http::header::AUTHORIZATION, value);

	Ok(ApiRequest::from_parts(parts, body))
}

/// Joins relative targets onto the profile base; absolute targets must share
/// its origin so bearer credentials never leak to a foreign host.
fn resolve_target(profile: &ClientProfile, uri: &http::Uri) -> Result<Url, ConfigError> {
	if uri.scheme().is_some() {
		let absolute = Url::parse(&uri.to_string())
			.map_err(|source| ConfigError::InvalidRequestTarget { source })?;

		if absolute.origin() != profile.base_url.origin() {
			return Err(ConfigError::RequestOutsideBase {
				profile: profile.name.clone(),
				url: absolute.to_string(),
			});
		}

		return Ok(absolute);
	}

	let relative = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

	profile.base_url.join(relative).map_err(|source| ConfigError::InvalidRequestTarget { source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	fn profile() -> ClientProfile {
		test_profile("server-api", "http://localhost:8080", &["user.read"])
	}

	#[test]
	fn relative_targets_join_the_profile_base() {
		let target = resolve_target(
			&profile(),
			&http::Uri::from_static("/me?fields=id"),
		)
		.expect("Relative targets should resolve against the base.");

		assert_eq!(target.as_str(), "http://localhost:8080/me?fields=id");
	}

	#[test]
	fn absolute_targets_must_share_the_base_origin() {
		let same_origin = resolve_target(
			&profile(),
			&http::Uri::from_static("http://localhost:8080/reports"),
		)
		.expect("Same-origin absolute targets should be allowed.");

		assert_eq!(same_origin.as_str(), "http://localhost:8080/reports");

		let err = resolve_target(
			&profile(),
			&http::Uri::from_static("http://evil.example.com/reports"),
		)
		.expect_err("Cross-origin targets must be rejected.");

		assert!(matches!(err, ConfigError::RequestOutsideBase { .. }));
	}

	#[tokio::test]
	async fn dispatch_attaches_a_sensitive_bearer_header() {
		let profile = profile();
		let (courier, authenticator, session, transport) =
			build_static_test_courier(test_registry(profile.clone()));

		session.mark_signed_in();
		authenticator.push_token(
			crate::auth::TokenHandle::builder(profile.scopes.clone())
				.access_token("unit-access")
				.issued_now()
				.expires_in(Duration::seconds(600))
				.build()
				.expect("Token fixture should build successfully."),
		);
		transport.push_status(http::StatusCode::OK);

		let client = courier.get_client("server-api").expect("Registered profile should resolve.");
		let response = client.get("/me?fields=id").await.expect("Dispatch should succeed.");

		assert_eq!(response.status(), http::StatusCode::OK);

		let seen = transport.requests();

		assert_eq!(seen.len(), 1);
		assert_eq!(seen[0].method, http::Method::GET);
		assert_eq!(seen[0].uri.to_string(), "http://localhost:8080/me?fields=id");

		let header = seen[0]
			.headers
			.get(http::header::AUTHORIZATION)
			.expect("Dispatched request should carry the bearer header.");

		assert_eq!(
			header.to_str().expect("Bearer header should be printable."),
			"Bearer unit-access",
		);
		assert!(header.is_sensitive());
	}

	#[tokio::test]
	async fn unauthorized_responses_invalidate_the_cache() {
		let profile = profile();
		let (courier, authenticator, session, transport) =
			build_static_test_courier(test_registry(profile.clone()));

		session.mark_signed_in();
		authenticator.push_token(test_token(&profile.scopes, Duration::seconds(600)));
		authenticator.push_token(test_token(&profile.scopes, Duration::seconds(900)));
		transport.push_status(http::StatusCode::UNAUTHORIZED);
		transport.push_status(http::StatusCode::OK);

		let client = courier.get_client("server-api").expect("Registered profile should resolve.");
		let err = client.get("/me").await.expect_err("Rejected tokens should fail the call.");

		assert!(matches!(err, Error::Unauthorized { .. }));

		let response = client.get("/me").await.expect("Self-healed call should succeed.");

		assert_eq!(response.status(), http::StatusCode::OK);
		assert_eq!(authenticator.acquire_calls(), 2, "The 401 must force a re-acquisition.");
	}
}
