//! Immutable request descriptors accepted by [`crate::transport::ApiClient::issue`].

// crates.io
use ::http::{Method, header::CONTENT_TYPE};
// self
use crate::{
	_prelude::*,
	descriptor::ApiDescriptor,
	error::ConfigError,
	http::HttpRequest,
	query::{self, Query},
};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Request payload.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
	/// Structured value serialized as JSON with an `application/json` content type.
	Json(Value),
	/// Raw payload sent untouched.
	Raw {
		/// Payload bytes.
		bytes: Vec<u8>,
		/// Content type to announce, if any.
		content_type: Option<String>,
	},
}

/// One outbound API call: `{ method, path, body, query }`.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	method: String,
	path: String,
	body: Option<RequestBody>,
	query: Option<Query>,
}
impl ApiRequest {
	/// Creates a `GET` request for `path`.
	pub fn new(path: impl Into<String>) -> Self {
		Self { method: Method::GET.to_string(), path: path.into(), body: None, query: None }
	}

	/// Shorthand for [`ApiRequest::new`].
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(path)
	}

	/// Creates a `POST` request for `path`.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(path).with_method(Method::POST.as_str())
	}

	/// Creates a `PUT` request for `path`.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(path).with_method(Method::PUT.as_str())
	}

	/// Creates a `PATCH` request for `path`.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(path).with_method(Method::PATCH.as_str())
	}

	/// Creates a `DELETE` request for `path`.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(path).with_method(Method::DELETE.as_str())
	}

	/// Overrides the method; it is upper-cased and validated when the request is sent.
	pub fn with_method(mut self, method: impl AsRef<str>) -> Self {
		self.method = method.as_ref().to_ascii_uppercase();

		self
	}

	/// Attaches a structured body.
	pub fn with_json<T>(mut self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let value =
			serde_json::to_value(body).map_err(|source| ConfigError::BodySerialize { source })?;

		self.body = Some(RequestBody::Json(value));

		Ok(self)
	}

	/// Attaches an already-built JSON value.
	pub fn with_json_value(mut self, value: Value) -> Self {
		self.body = Some(RequestBody::Json(value));

		self
	}

	/// Attaches a raw payload.
	pub fn with_raw(mut self, bytes: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
		self.body = Some(RequestBody::Raw {
			bytes: bytes.into(),
			content_type: content_type.map(str::to_owned),
		});

		self
	}

	/// Attaches the query mapping.
	pub fn with_query(mut self, query: Query) -> Self {
		self.query = Some(query);

		self
	}

	/// Upper-cased method name.
	pub fn method(&self) -> &str {
		&self.method
	}

	/// Path without the query string.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Attached body, if any.
	pub fn body(&self) -> Option<&RequestBody> {
		self.body.as_ref()
	}

	/// Attached query mapping, if any.
	pub fn query(&self) -> Option<&Query> {
		self.query.as_ref()
	}

	/// Path with the encoded query appended when at least one pair survives.
	pub fn path_and_query(&self) -> String {
		query::append_query(&self.path, self.query.as_ref())
	}

	/// Builds the outbound HTTP request against `descriptor`.
	pub fn to_http(&self, descriptor: &ApiDescriptor) -> Result<HttpRequest> {
		let method = Method::from_bytes(self.method.as_bytes())
			.map_err(|_| ConfigError::InvalidMethod { method: self.method.clone() })?;
		let url = descriptor.url_for(&self.path_and_query())?;
		let mut builder = ::http::Request::builder().method(method).uri(url.as_str());
		let payload = match &self.body {
			None => Vec::new(),
			Some(RequestBody::Json(value)) => {
				builder = builder.header(CONTENT_TYPE, JSON_MEDIA_TYPE);

				serde_json::to_vec(value).map_err(|source| ConfigError::BodySerialize { source })?
			},
			Some(RequestBody::Raw { bytes, content_type }) => {
				if let Some(content_type) = content_type {
					builder = builder.header(CONTENT_TYPE, content_type.as_str());
				}

				bytes.clone()
			},
		};

		Ok(builder.body(payload).map_err(ConfigError::from)?)
	}
}
