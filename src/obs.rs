//! Optional observability helpers for transport calls and pairing sessions.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `pairlink.op` with the `op` (operation)
//!   and `stage` (call site) fields, plus debug events for discarded results.
//! - Enable `metrics` to increment the `pairlink_operation_total` counter for every
//!   attempt/success/failure/discard/skip, labeled by `op` + `outcome`, and the
//!   `pairlink_pairing_session_total` counter once per ended pairing session, labeled by
//!   `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Generic [`crate::transport::ApiClient::issue`] call.
	Request,
	/// Secondary liveness probe after a 500.
	Liveness,
	/// Pairing session creation.
	PairingStart,
	/// Pairing poll tick.
	PairingPoll,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Request => "request",
			OperationKind::Liveness => "liveness",
			OperationKind::PairingStart => "pairing_start",
			OperationKind::PairingPoll => "pairing_poll",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Result arrived for a session that was no longer live and was dropped.
	Discarded,
	/// Poll tick skipped because the previous poll was still in flight.
	Skipped,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
			OperationOutcome::Discarded => "discarded",
			OperationOutcome::Skipped => "skipped",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How a pairing session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionEnd {
	/// The user approved the PIN and a credential arrived.
	Succeeded,
	/// The deadline passed while waiting.
	TimedOut,
	/// The caller cancelled the session.
	Cancelled,
	/// A newer `start()` replaced the session.
	Superseded,
	/// The start call or a poll failed.
	Failed,
}
impl SessionEnd {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionEnd::Succeeded => "succeeded",
			SessionEnd::TimedOut => "timed_out",
			SessionEnd::Cancelled => "cancelled",
			SessionEnd::Superseded => "superseded",
			SessionEnd::Failed => "failed",
		}
	}
}
impl Display for SessionEnd {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
