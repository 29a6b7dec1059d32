// self
use crate::obs::{OperationKind, OperationOutcome, SessionEnd};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_operation_outcome(kind: OperationKind, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"pairlink_operation_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records how a pairing session ended via the global metrics recorder (when enabled).
pub fn record_session_end(end: SessionEnd) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("pairlink_pairing_session_total", "outcome" => end.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = end;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_operation_outcome_noop_without_metrics() {
		record_operation_outcome(OperationKind::PairingPoll, OperationOutcome::Discarded);
		record_operation_outcome(OperationKind::PairingPoll, OperationOutcome::Skipped);
	}

	#[test]
	fn record_session_end_noop_without_metrics() {
		record_session_end(SessionEnd::Superseded);
	}
}
