// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	descriptor::{ApiDescriptor, ApiPaths, PairingPolicy},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum DescriptorError {
	/// Base URL must use HTTP or HTTPS.
	#[error("The base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL must not carry a query or fragment.
	#[error("The base URL must not contain a query or fragment: {url}.")]
	BaseUrlHasQuery {
		/// Base URL that failed validation.
		url: String,
	},
	/// Well-known paths must be absolute.
	#[error("The {name} path must start with '/': {path}.")]
	RelativePath {
		/// Which path failed validation.
		name: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// Poll interval must be positive.
	#[error("The pairing poll interval must be greater than zero.")]
	ZeroPollInterval,
	/// Deadline must leave room for at least one poll.
	#[error("The pairing deadline must not be shorter than the poll interval.")]
	DeadlineShorterThanInterval,
}

/// Builder for [`ApiDescriptor`] values.
#[derive(Debug)]
pub struct ApiDescriptorBuilder {
	/// Base URL for every request.
	pub base_url: Url,
	/// Well-known paths.
	pub paths: ApiPaths,
	/// Pairing timing policy.
	pub pairing: PairingPolicy,
}
impl ApiDescriptorBuilder {
	/// Creates a new builder seeded with default paths and policy.
	pub fn new(base_url: Url) -> Self {
		Self { base_url, paths: ApiPaths::default(), pairing: PairingPolicy::default() }
	}

	/// Sets the liveness probe path.
	pub fn liveness_path(mut self, path: impl Into<String>) -> Self {
		self.paths.liveness = path.into();

		self
	}

	/// Sets the pairing start path.
	pub fn pairing_start_path(mut self, path: impl Into<String>) -> Self {
		self.paths.pairing_start = path.into();

		self
	}

	/// Sets the pairing poll path.
	pub fn pairing_poll_path(mut self, path: impl Into<String>) -> Self {
		self.paths.pairing_poll = path.into();

		self
	}

	/// Overrides the delay between poll ticks.
	pub fn poll_interval(mut self, interval: StdDuration) -> Self {
		self.pairing.poll_interval = interval;

		self
	}

	/// Overrides the pairing session lifetime.
	pub fn pairing_deadline(mut self, deadline: StdDuration) -> Self {
		self.pairing.deadline = deadline;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ApiDescriptor, DescriptorError> {
		let descriptor =
			ApiDescriptor { base_url: self.base_url, paths: self.paths, pairing: self.pairing };

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ApiDescriptor {
	/// Validates invariants for the descriptor.
	pub fn validate(&self) -> Result<(), DescriptorError> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(DescriptorError::UnsupportedScheme { url: self.base_url.to_string() });
		}
		if self.base_url.query().is_some() || self.base_url.fragment().is_some() {
			return Err(DescriptorError::BaseUrlHasQuery { url: self.base_url.to_string() });
		}

		validate_path("liveness", &self.paths.liveness)?;
		validate_path("pairing start", &self.paths.pairing_start)?;
		validate_path("pairing poll", &self.paths.pairing_poll)?;

		if self.pairing.poll_interval.is_zero() {
			return Err(DescriptorError::ZeroPollInterval);
		}
		if self.pairing.deadline < self.pairing.poll_interval {
			return Err(DescriptorError::DeadlineShorterThanInterval);
		}

		Ok(())
	}
}

fn validate_path(name: &'static str, path: &str) -> Result<(), DescriptorError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(DescriptorError::RelativePath { name, path: path.to_owned() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse descriptor URL fixture.")
	}

	#[test]
	fn rejects_unsupported_schemes_and_queries() {
		let err = ApiDescriptor::builder(url("ftp://example.com"))
			.build()
			.expect_err("Non-HTTP schemes should be rejected.");

		assert!(matches!(err, DescriptorError::UnsupportedScheme { .. }));

		let err = ApiDescriptor::builder(url("https://example.com/?tenant=1"))
			.build()
			.expect_err("Base URLs with a query should be rejected.");

		assert!(matches!(err, DescriptorError::BaseUrlHasQuery { .. }));
	}

	#[test]
	fn rejects_relative_paths() {
		let err = ApiDescriptor::builder(url("https://example.com"))
			.liveness_path("health")
			.build()
			.expect_err("Relative liveness paths should be rejected.");

		assert_eq!(err, DescriptorError::RelativePath { name: "liveness", path: "health".into() });
	}

	#[test]
	fn rejects_inconsistent_pairing_policy() {
		let err = ApiDescriptor::builder(url("https://example.com"))
			.poll_interval(StdDuration::ZERO)
			.build()
			.expect_err("Zero poll intervals should be rejected.");

		assert_eq!(err, DescriptorError::ZeroPollInterval);

		let err = ApiDescriptor::builder(url("https://example.com"))
			.poll_interval(StdDuration::from_secs(5))
			.pairing_deadline(StdDuration::from_secs(1))
			.build()
			.expect_err("Deadlines shorter than the poll interval should be rejected.");

		assert_eq!(err, DescriptorError::DeadlineShorterThanInterval);
	}

	#[test]
	fn builder_overrides_defaults() {
		let descriptor = ApiDescriptor::builder(url("http://127.0.0.1:9000"))
			.liveness_path("/healthz")
			.pairing_start_path("/api/link/start")
			.pairing_poll_path("/api/link/check")
			.poll_interval(StdDuration::from_millis(250))
			.pairing_deadline(StdDuration::from_secs(5))
			.build()
			.expect("Descriptor with overrides should validate.");

		assert_eq!(descriptor.paths.liveness, "/healthz");
		assert_eq!(descriptor.paths.pairing_start, "/api/link/start");
		assert_eq!(descriptor.paths.pairing_poll, "/api/link/check");
		assert_eq!(descriptor.pairing.poll_interval, StdDuration::from_millis(250));
		assert_eq!(descriptor.pairing.deadline, StdDuration::from_secs(5));
	}
}
