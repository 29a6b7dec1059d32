// self
use crate::{
	_prelude::*,
	pairing::{PairingCredential, PairingSession},
};

/// Pairing failures; cheap to clone so one value can feed both the caller and the sink.
#[derive(Clone, Debug, ThisError)]
pub enum PairingError {
	/// The start endpoint call failed.
	#[error("Failed to start pairing: {source}")]
	StartFailed {
		/// Underlying transport or decode failure.
		#[source]
		source: Arc<Error>,
	},
	/// A poll call failed or returned an undecodable credential.
	#[error("Failed to poll pairing status: {source}")]
	PollFailed {
		/// Underlying transport or decode failure.
		#[source]
		source: Arc<Error>,
	},
	/// The session reached its deadline without authorization.
	#[error("Pairing session expired before it was authorized.")]
	TimedOut,
	/// The session was cancelled or replaced by a newer one.
	#[error("Pairing session was cancelled.")]
	Cancelled,
}
impl PairingError {
	pub(crate) fn start_failed(source: Error) -> Self {
		Self::StartFailed { source: Arc::new(source) }
	}

	pub(crate) fn poll_failed(source: Error) -> Self {
		Self::PollFailed { source: Arc::new(source) }
	}

	/// Returns the transport-level cause, if any.
	pub fn cause(&self) -> Option<&Error> {
		match self {
			Self::StartFailed { source } | Self::PollFailed { source } => Some(&**source),
			Self::TimedOut | Self::Cancelled => None,
		}
	}

	/// Returns `true` when the cause tells the caller to sign in again.
	pub fn requires_reauthentication(&self) -> bool {
		self.cause().is_some_and(Error::requires_reauthentication)
	}
}

/// Where a pairing session stands.
#[derive(Clone, Debug)]
pub enum PairingOutcome {
	/// Polling; the user has not approved yet.
	Waiting,
	/// The user approved and the credential arrived.
	Succeeded(PairingCredential),
	/// The deadline passed first.
	TimedOut,
	/// The caller cancelled or superseded the session.
	Cancelled,
	/// Starting or polling failed.
	Failed(PairingError),
}
impl PairingOutcome {
	/// Returns `true` for every outcome except [`PairingOutcome::Waiting`].
	pub fn is_terminal(&self) -> bool {
		!matches!(self, Self::Waiting)
	}
}

/// Poller phase, including the states that precede a session.
#[derive(Clone, Debug, Default)]
pub enum PairingPhase {
	/// No session has been started.
	#[default]
	Idle,
	/// The start call is in flight.
	Starting,
	/// A session exists and has this outcome.
	Outcome(PairingOutcome),
}

/// Read-only view of the poller.
#[derive(Clone, Debug)]
pub struct PairingSnapshot {
	/// Identifier of the most recent start or cancel.
	pub epoch: u64,
	/// Current phase.
	pub phase: PairingPhase,
	/// Most recent session, if one was created.
	pub session: Option<PairingSession>,
}
impl PairingSnapshot {
	/// Returns the session outcome once the start call has resolved.
	pub fn outcome(&self) -> Option<&PairingOutcome> {
		match &self.phase {
			PairingPhase::Outcome(outcome) => Some(outcome),
			PairingPhase::Idle | PairingPhase::Starting => None,
		}
	}

	/// Returns `true` while the session is polling.
	pub fn is_waiting(&self) -> bool {
		matches!(self.outcome(), Some(PairingOutcome::Waiting))
	}
}
