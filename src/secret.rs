//! Redacted wrapper for credential tokens returned by the pairing flow.

// self
use crate::_prelude::*;

/// Credential token that never prints its value through `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a token value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw token. Callers must keep it out of logs.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatters_hide_the_token() {
		let secret = TokenSecret::new("pairing-token-123");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(secret.to_string(), "<redacted>");
		assert_eq!(secret.expose(), "pairing-token-123");
	}

	#[test]
	fn deserializes_from_a_bare_string() {
		let secret: TokenSecret =
			serde_json::from_str("\"abc\"").expect("Token should deserialize from a JSON string.");

		assert_eq!(secret.expose(), "abc");
	}
}
