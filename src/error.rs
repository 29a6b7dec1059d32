//! Error taxonomy shared by the transport and the pairing poller.

// self
use crate::{_prelude::*, descriptor::DescriptorError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error raised by [`crate::transport::ApiClient::issue`] and friends.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The backend answered 403 while the caller still considered its session valid.
	#[error("Authentication session has expired.")]
	AuthExpired,
	/// The backend answered 503.
	#[error("Service is temporarily unavailable.")]
	ServiceUnavailable {
		/// Retry-After hint from upstream, if supplied. Nothing retries automatically.
		retry_after: Option<Duration>,
	},
	/// The backend answered 500 and the liveness probe failed too.
	#[error("Server is offline.")]
	ServerOffline,
	/// Any other non-2xx response.
	#[error("{reason}")]
	Http {
		/// HTTP status code returned by the backend.
		status: u16,
		/// Formatted `"<METHOD> request to '<path>' failed with code <status> (<reason>)"` text.
		reason: String,
	},

	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure below HTTP (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Successful response whose payload could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
}
impl Error {
	/// Returns `true` when the caller should force a fresh sign-in.
	pub fn requires_reauthentication(&self) -> bool {
		matches!(self, Self::AuthExpired)
	}

	/// HTTP status associated with the failure, when one is known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::AuthExpired => Some(403),
			Self::ServiceUnavailable { .. } => Some(503),
			Self::ServerOffline => Some(500),
			Self::Http { status, .. } => Some(*status),
			Self::Decode(DecodeError::Json { status, .. }) => Some(*status),
			Self::Config(_) | Self::Transport(_) => None,
		}
	}
}

/// Configuration and request construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Request URL could not be assembled.
	#[error("Request URL `{url}` is invalid.")]
	InvalidUrl {
		/// URL text that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request method is not a valid HTTP token.
	#[error("HTTP method `{method}` is invalid.")]
	InvalidMethod {
		/// Rejected method string.
		method: String,
	},
	/// Structured request body could not be serialized.
	#[error("Request body could not be serialized.")]
	BodySerialize {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// API descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] DescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures below HTTP, raised before any status line arrives.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling `{path}`.")]
	Network {
		/// Request path that failed.
		path: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete in time.
	#[error("Request to `{path}` timed out.")]
	Timeout {
		/// Request path that failed.
		path: String,
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(path: impl Into<String>, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { path: path.into(), source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(path: impl Into<String>, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Timeout { path: path.into(), source: Box::new(src) }
	}
}

/// Payload decoding failures for successful responses.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Response body was not the JSON shape the caller asked for.
	#[error("Response from `{path}` returned malformed JSON.")]
	Json {
		/// Request path that produced the payload.
		path: String,
		/// HTTP status code of the response.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_auth_expired_requires_reauthentication() {
		assert!(Error::AuthExpired.requires_reauthentication());
		assert!(!Error::ServerOffline.requires_reauthentication());
		assert!(!Error::ServiceUnavailable { retry_after: None }.requires_reauthentication());
		assert!(
			!Error::Http { status: 403, reason: "GET request to '/x' failed with code 403".into() }
				.requires_reauthentication()
		);
	}

	#[test]
	fn status_reflects_classified_variant() {
		assert_eq!(Error::AuthExpired.status(), Some(403));
		assert_eq!(Error::ServerOffline.status(), Some(500));
		assert_eq!(Error::ServiceUnavailable { retry_after: None }.status(), Some(503));
		assert_eq!(Error::Http { status: 418, reason: String::new() }.status(), Some(418));
		assert_eq!(
			Error::from(ConfigError::InvalidMethod { method: "BAD METHOD".into() }).status(),
			None
		);
	}

	#[test]
	fn transport_errors_name_the_failing_path() {
		let io = || std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let network = Error::from(TransportError::network("/api/health", io()));
		let timeout = Error::from(TransportError::timeout("/api/pairing/pin", io()));

		assert_eq!(network.to_string(), "Network error occurred while calling `/api/health`.");
		assert_eq!(timeout.to_string(), "Request to `/api/pairing/pin` timed out.");
		assert_eq!(network.status(), None);
		assert!(StdError::source(&network).is_some());
	}

	#[test]
	fn http_error_displays_formatted_reason() {
		let err = Error::Http {
			status: 404,
			reason: "GET request to '/api/items' failed with code 404 (Not Found)".into(),
		};

		assert_eq!(err.to_string(), "GET request to '/api/items' failed with code 404 (Not Found)");
	}
}
