//! HTTP client seam used by the transport.
//!
//! [`ApiHttpClient`] is the crate's only dependency on an HTTP stack. It takes a fully built
//! [`HttpRequest`] and resolves to a buffered [`HttpResponse`] or to the client's own
//! transport error, which a [`crate::transport::TransportErrorMapper`] later folds into
//! [`crate::error::Error`]. The default implementation wraps reqwest with a cookie store so
//! the dashboard's session cookie rides along on every call.

// crates.io
use ::http::{
	HeaderMap,
	header::{CONTENT_TYPE, RETRY_AFTER},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Outbound request handed to an [`ApiHttpClient`].
pub type HttpRequest = ::http::Request<Vec<u8>>;
/// Buffered response produced by an [`ApiHttpClient`].
pub type HttpResponse = ::http::Response<Vec<u8>>;
/// Boxed future returned by [`ApiHttpClient::execute`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing API requests.
///
/// Implementations must be `Send + Sync + 'static` so one client can be shared by the
/// transport and every detached pairing poll. The returned future must own whatever it needs,
/// because poll calls outlive the tick that dispatched them.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and buffers the full response body.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'static, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client that stores and replays session cookies.
	pub fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.cookie_store(true)
			.build()
			.map_err(crate::error::ConfigError::from)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	///
	/// Enable `cookie_store` on custom clients, otherwise session cookies are not attached.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'static, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut buffered = HttpResponse::new(response.bytes().await?.to_vec());

			*buffered.status_mut() = status;
			*buffered.headers_mut() = headers;

			Ok(buffered)
		})
	}
}

/// Returns the response `content-type`, if present and readable.
pub fn content_type(headers: &HeaderMap) -> Option<&str> {
	headers.get(CONTENT_TYPE)?.to_str().ok()
}

/// Returns `true` for `application/json` and any `+json` structured syntax suffix.
pub fn is_json_content_type(value: Option<&str>) -> bool {
	let Some(value) = value else {
		return false;
	};
	let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

	essence == "application/json" || essence.ends_with("+json")
}

/// Parses a `Retry-After` header given as delta-seconds or an HTTP date.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use ::http::HeaderValue;
	// self
	use super::*;

	#[test]
	fn json_detection_accepts_parameters_and_suffixes() {
		assert!(is_json_content_type(Some("application/json")));
		assert!(is_json_content_type(Some("application/json; charset=utf-8")));
		assert!(is_json_content_type(Some("Application/JSON")));
		assert!(is_json_content_type(Some("application/problem+json")));
		assert!(!is_json_content_type(Some("text/html")));
		assert!(!is_json_content_type(Some("application/octet-stream")));
		assert!(!is_json_content_type(None));
	}

	#[test]
	fn retry_after_accepts_seconds_and_ignores_garbage() {
		let mut headers = HeaderMap::new();

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(120)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));

		assert_eq!(parse_retry_after(&headers), None, "Past dates yield no hint.");
	}
}
