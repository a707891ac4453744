//! Retry guidance for courier failures and throttled upstream responses.
//!
//! The courier never retries on its own: a 401 invalidates the cache and the
//! call fails, transient acquisition failures surface immediately, and
//! interaction-required failures must reach the user. This module encodes the
//! recommended caller reaction so applications do not re-derive it.

// crates.io
use http::{HeaderMap, header::RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TokenAcquisitionError, http::ApiResponse};

/// Advises callers when to retry a failed or throttled call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryDirective {
	/// Instant when it is safe to retry.
	pub earliest_retry_at: OffsetDateTime,
	/// Suggested backoff duration.
	pub recommended_backoff: Duration,
	/// Optional descriptive string.
	pub reason: Option<String>,
}
impl RetryDirective {
	/// Creates a directive from a backoff relative to now.
	pub fn after(backoff: Duration) -> Self {
		Self {
			earliest_retry_at: OffsetDateTime::now_utc() + backoff,
			recommended_backoff: backoff,
			reason: None,
		}
	}

	/// Adds a human-readable reason.
	pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
		self.reason = Some(reason.into());

		self
	}
}

/// Recommended caller reaction to a courier error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryAdvice {
	/// Do not retry; the failure is not transient.
	Abort,
	/// Retry the call after the directive's backoff.
	RetryAfter(RetryDirective),
	/// Retry immediately, once: the cache was invalidated and the next call
	/// re-acquires the token.
	ReacquireAndRetry,
}

/// Policy encoding the failure-taxonomy retry contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// How many unauthorized retries to allow.
	pub unauthorized_retries: u32,
	/// Fallback backoff when no hint is available.
	pub acquisition_backoff: Duration,
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { unauthorized_retries: 1, acquisition_backoff: Duration::seconds(5) }
	}
}
impl RetryPolicy {
	/// Advises on a failed call, given how many retries already ran.
	pub fn advise(&self, error: &Error, completed_retries: u32) -> RetryAdvice {
		match error {
			Error::Unauthorized { .. } if completed_retries < self.unauthorized_retries =>
				RetryAdvice::ReacquireAndRetry,
			Error::TokenAcquisition(TokenAcquisitionError::Provider { retry_after, .. }) =>
				RetryAdvice::RetryAfter(RetryDirective::after(
					retry_after.unwrap_or(self.acquisition_backoff),
				)),
			Error::Transport(_) =>
				RetryAdvice::RetryAfter(RetryDirective::after(self.acquisition_backoff)),
			_ => RetryAdvice::Abort,
		}
	}

	/// Advises on a throttled upstream response, honoring its `Retry-After`.
	///
	/// Returns `None` for statuses other than 429 and 503; those responses
	/// passed through the courier unmodified and carry no retry contract.
	pub fn advise_response(&self, response: &ApiResponse) -> Option<RetryDirective> {
		let status = response.status();

		if status != http::StatusCode::TOO_MANY_REQUESTS
			&& status != http::StatusCode::SERVICE_UNAVAILABLE
		{
			return None;
		}

		let backoff = parse_retry_after(response.headers()).unwrap_or(self.acquisition_backoff);

		Some(RetryDirective::after(backoff).with_reason(format!("upstream responded {status}")))
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
