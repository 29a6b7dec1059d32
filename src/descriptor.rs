//! Backend API descriptor: base URL, well-known paths, and pairing policy.
//!
//! Every [`crate::transport::ApiClient`] is bound to one validated [`ApiDescriptor`]. The
//! descriptor is plain data (serde-friendly) so it can be loaded from configuration files,
//! while [`ApiDescriptorBuilder`] enforces the invariants the transport and the pairing poller
//! rely on.

/// Builder API for assembling API descriptors.
pub mod builder;

pub use builder::*;

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::ConfigError};

/// Well-known backend paths used by the core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiPaths {
	/// Secondary health check issued after a 500 response.
	pub liveness: String,
	/// Endpoint that creates a pairing PIN.
	pub pairing_start: String,
	/// Endpoint polled for the pairing result.
	pub pairing_poll: String,
}
impl Default for ApiPaths {
	fn default() -> Self {
		Self {
			liveness: "/api/health".into(),
			pairing_start: "/api/pairing/pin".into(),
			pairing_poll: "/api/pairing/pin".into(),
		}
	}
}

/// Timing policy for the pairing poller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingPolicy {
	/// Delay between two poll ticks.
	pub poll_interval: StdDuration,
	/// Lifetime of a pairing session, measured from the moment it starts waiting.
	pub deadline: StdDuration,
}
impl PairingPolicy {
	/// Default delay between poll ticks.
	pub const DEFAULT_POLL_INTERVAL: StdDuration = StdDuration::from_millis(1_000);
	/// Default session lifetime.
	pub const DEFAULT_DEADLINE: StdDuration = StdDuration::from_millis(60_000);
}
impl Default for PairingPolicy {
	fn default() -> Self {
		Self { poll_interval: Self::DEFAULT_POLL_INTERVAL, deadline: Self::DEFAULT_DEADLINE }
	}
}

/// Immutable API descriptor consumed by the transport and the pairing poller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescriptor {
	/// Origin (plus optional path prefix) every request path is appended to.
	pub base_url: Url,
	/// Well-known paths.
	#[serde(default)]
	pub paths: ApiPaths,
	/// Pairing timing policy.
	#[serde(default)]
	pub pairing: PairingPolicy,
}
impl ApiDescriptor {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ApiDescriptorBuilder {
		ApiDescriptorBuilder::new(base_url)
	}

	/// Resolves a request path (with its query already appended) against the base URL.
	pub fn url_for(&self, path_and_query: &str) -> Result<Url, ConfigError> {
		let raw = format!("{}{path_and_query}", self.base_url.as_str().trim_end_matches('/'));

		Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { url: raw, source })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn descriptor(base: &str) -> ApiDescriptor {
		ApiDescriptor::builder(Url::parse(base).expect("Base URL fixture should parse."))
			.build()
			.expect("Default descriptor should validate.")
	}

	#[test]
	fn url_for_joins_without_double_slashes() {
		let root = descriptor("http://dashboard.local:8080/");
		let prefixed = descriptor("https://example.com/dash");

		assert_eq!(
			root.url_for("/api/items?page=2").expect("Path should resolve.").as_str(),
			"http://dashboard.local:8080/api/items?page=2"
		);
		assert_eq!(
			prefixed.url_for("/api/health").expect("Path should resolve.").as_str(),
			"https://example.com/dash/api/health"
		);
	}

	#[test]
	fn deserializes_with_default_paths_and_policy() {
		let descriptor: ApiDescriptor =
			serde_json::from_str("{\"base_url\":\"http://localhost:3000\"}")
				.expect("Descriptor JSON should deserialize.");

		assert_eq!(descriptor.paths, ApiPaths::default());
		assert_eq!(descriptor.pairing.poll_interval, StdDuration::from_secs(1));
		assert_eq!(descriptor.pairing.deadline, StdDuration::from_secs(60));
	}
}
