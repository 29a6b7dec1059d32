//! Pure response classification.
//!
//! [`classify`] only looks at the status, the content type, and the caller's session state.
//! The transport acts on the returned [`Classification`]; the only decision that needs I/O is
//! [`Classification::ProbeLiveness`], which the transport resolves with a secondary request.

// crates.io
use ::http::StatusCode;
// self
use crate::{_prelude::*, http::is_json_content_type, transport::SessionState};

/// Decision reached for one response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
	/// 204.
	Empty,
	/// 2xx with a JSON content type.
	Json,
	/// 2xx with any other content type.
	Raw,
	/// 403 while the session is considered valid.
	AuthExpired,
	/// 503.
	ServiceUnavailable,
	/// 500: check liveness before deciding between offline and a generic failure.
	ProbeLiveness,
	/// Any other failure.
	Failure,
}

/// Maps `(status, content type, session)` to a [`Classification`].
pub fn classify(status: u16, content_type: Option<&str>, session: SessionState) -> Classification {
	if (200..300).contains(&status) {
		return if status == 204 {
			Classification::Empty
		} else if is_json_content_type(content_type) {
			Classification::Json
		} else {
			Classification::Raw
		};
	}

	match status {
		403 if session.is_authenticated() => Classification::AuthExpired,
		500 => Classification::ProbeLiveness,
		503 => Classification::ServiceUnavailable,
		_ => Classification::Failure,
	}
}

/// Extracts the failure reason: the JSON `message` field, else the canonical reason phrase.
pub fn failure_reason(status: u16, content_type: Option<&str>, body: &[u8]) -> String {
	if is_json_content_type(content_type) {
		let message = serde_json::from_slice::<Value>(body)
			.ok()
			.and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_owned));

		if let Some(message) = message {
			return message;
		}
	}

	StatusCode::from_u16(status)
		.ok()
		.and_then(|code| code.canonical_reason())
		.unwrap_or_default()
		.to_owned()
}

/// Formats `"<METHOD> request to '<path>' failed with code <status>[ (<reason>)]"`.
pub fn format_failure(method: &str, path: &str, status: u16, reason: &str) -> String {
	let mut message = format!("{method} request to '{path}' failed with code {status}");

	if !reason.is_empty() {
		message.push_str(&format!(" ({reason})"));
	}

	message
}
