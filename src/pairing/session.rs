// std
use std::time::Duration as StdDuration;
// crates.io
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	secret::TokenSecret,
	transport::{self, ApiResponse},
};

/// Poll reply meaning the user has not approved the pairing yet.
pub const WAITING_FOR_AUTH: &str = "waiting for auth";

/// Payload returned by the start-pairing endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinGrant {
	/// Identifier of the pending PIN; numeric ids are accepted and kept as text.
	#[serde(deserialize_with = "string_or_number")]
	pub pin_id: String,
	/// User-facing pairing code.
	pub code: String,
	/// Client identifier the PIN was issued to.
	pub client_id: String,
	/// Page where the user approves the pairing.
	pub auth_url: Url,
}

/// Live pairing session. Replaced wholesale by the next `start()`; never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairingSession {
	/// Identifier of the pending PIN.
	pub pin_id: String,
	/// Client identifier the PIN was issued to.
	pub client_id: String,
	/// User-facing pairing code.
	pub code: String,
	/// Page where the user approves the pairing.
	pub auth_url: Url,
	/// Instant the session started waiting.
	pub created_at: OffsetDateTime,
	/// Instant after which the session times out.
	pub deadline_at: OffsetDateTime,
}
impl PairingSession {
	pub(crate) fn from_grant(grant: PinGrant, deadline: StdDuration) -> Self {
		let created_at = OffsetDateTime::now_utc();
		let lifetime = Duration::try_from(deadline).unwrap_or(Duration::MAX);
		let deadline_at = created_at.checked_add(lifetime).unwrap_or(created_at);
		let PinGrant { pin_id, code, client_id, auth_url } = grant;

		Self { pin_id, client_id, code, auth_url, created_at, deadline_at }
	}

	/// Time left before the deadline, measured against `now`.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		(self.deadline_at - now).max(Duration::ZERO)
	}
}

/// Credential payload that ends a successful pairing.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingCredential {
	/// Third-party access token.
	pub token: TokenSecret,
	/// Third-party account description, passed through untouched.
	#[serde(default)]
	pub external_user: Value,
	/// Client identifier the token was issued to.
	pub client_id: String,
}

/// Decoded poll reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PollReply {
	Waiting,
	Authorized(PairingCredential),
}
impl PollReply {
	/// Anything other than the waiting message must decode as a credential.
	pub(crate) fn from_response(path: &str, status: u16, response: ApiResponse) -> Result<Self> {
		if let ApiResponse::Json(value) = &response
			&& value.get("message").and_then(Value::as_str) == Some(WAITING_FOR_AUTH)
		{
			return Ok(Self::Waiting);
		}

		transport::decode_response(path, status, response).map(Self::Authorized)
	}
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Text(String),
		Number(serde_json::Number),
	}

	Ok(match Raw::deserialize(deserializer)? {
		Raw::Text(value) => value,
		Raw::Number(value) => value.to_string(),
	})
}
