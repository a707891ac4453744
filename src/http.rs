//! Transport primitives for authenticated upstream calls.
//!
//! [`ApiTransport`] is the courier's only dependency on an HTTP stack. The
//! default reqwest-backed implementation lives behind the `reqwest` feature;
//! custom stacks implement the trait over the same `http` request/response
//! types and convert their errors into [`TransportError`].

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Outgoing request type carried through the courier.
pub type ApiRequest = http::Request<Vec<u8>>;
/// Response type returned by the courier, unmodified from the upstream.
pub type ApiResponse = http::Response<Vec<u8>>;
/// Boxed future returned by [`ApiTransport::dispatch`].
pub type DispatchFuture<'a, E> = Pin<Box<dyn Future<Output = Result<ApiResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports able to execute upstream API calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be
/// shared across courier clones behind `Arc`, and the returned futures must be
/// `Send` so callers can hop executors freely.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying HTTP stack.
	type Error: 'static + Send + Sync + StdError + Into<TransportError>;

	/// Executes one request against the upstream API.
	fn dispatch(&self, request: ApiRequest) -> DispatchFuture<'_, Self::Error>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one
/// place. The courier attaches credentials per request, so any redirect policy
/// configured on the client should avoid forwarding the `Authorization` header
/// across origins.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	type Error = ReqwestError;

	fn dispatch(&self, request: ApiRequest) -> DispatchFuture<'_, Self::Error> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut rebuilt = ApiResponse::new(response.bytes().await?.to_vec());

			*rebuilt.status_mut() = status;
			*rebuilt.headers_mut() = headers;

			Ok(rebuilt)
		})
	}
}
