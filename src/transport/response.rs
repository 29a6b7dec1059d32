//! Successful response outcomes.

// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// Outcome of a successful (2xx) call.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResponse {
	/// 204: body ignored.
	Empty,
	/// JSON content type: parsed body.
	Json(Value),
	/// Any other content type: body left for the caller to interpret.
	Raw(RawBody),
}
impl ApiResponse {
	/// Returns the structured payload; [`ApiResponse::Empty`] yields an empty object.
	pub fn into_json(self) -> Option<Value> {
		match self {
			Self::Empty => Some(Value::Object(Default::default())),
			Self::Json(value) => Some(value),
			Self::Raw(_) => None,
		}
	}

	/// Returns the raw body for non-JSON responses.
	pub fn into_raw(self) -> Option<RawBody> {
		match self {
			Self::Raw(body) => Some(body),
			Self::Empty | Self::Json(_) => None,
		}
	}
}

/// Buffered non-JSON body.
#[derive(Clone, PartialEq, Eq)]
pub struct RawBody {
	status: u16,
	content_type: Option<String>,
	bytes: Vec<u8>,
}
impl RawBody {
	pub(crate) fn new(status: u16, content_type: Option<String>, bytes: Vec<u8>) -> Self {
		Self { status, content_type, bytes }
	}

	/// HTTP status of the response.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Announced content type, if any.
	pub fn content_type(&self) -> Option<&str> {
		self.content_type.as_deref()
	}

	/// Body bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.bytes)
	}

	/// Consumes the body into its bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.bytes
	}
}
impl Debug for RawBody {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RawBody")
			.field("status", &self.status)
			.field("content_type", &self.content_type)
			.field("len", &self.bytes.len())
			.finish()
	}
}
