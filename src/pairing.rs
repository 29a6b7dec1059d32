//! PIN pairing state machine.
//!
//! [`PairingPoller::start`] asks the backend for a pairing PIN, then polls until the user
//! approves it, the deadline passes, or the caller cancels:
//!
//! ```text
//! Idle → Starting → Waiting → Succeeded | TimedOut | Cancelled | Failed
//! ```
//!
//! Every transition happens under one lock and is tagged with an epoch. Results that arrive for
//! an older epoch, or after the session left `Waiting`, are dropped without inspection, so a
//! late credential can never resurrect a timed-out session. The [`PairingSink`] hears exactly
//! one terminal outcome per session and never hears [`PairingOutcome::Cancelled`].

mod metrics;
mod outcome;
mod session;
mod timer;

pub use metrics::*;
pub use outcome::*;
pub use session::*;

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::time::{self, Instant, MissedTickBehavior};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::ApiHttpClient,
	obs::{self, OperationKind, OperationOutcome, OperationSpan, SessionEnd},
	pairing::timer::SessionTimer,
	query::Query,
	transport::{ApiClient, ApiRequest, ApiResponse, SessionState, TransportErrorMapper},
};
#[cfg(feature = "reqwest")]
use crate::{
	descriptor::ApiDescriptor,
	http::ReqwestHttpClient,
	transport::{ReqwestApiClient, ReqwestTransportErrorMapper},
};

#[cfg(feature = "reqwest")]
/// Pairing poller specialized for the crate's default reqwest transport stack.
pub type ReqwestPairingPoller = PairingPoller<ReqwestHttpClient, ReqwestTransportErrorMapper>;

type SessionCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// Receives terminal pairing outcomes.
///
/// Called outside the poller lock, exactly once per session.
pub trait PairingSink: Send + Sync {
	/// Handles the terminal outcome of one session.
	fn notify(&self, outcome: PairingOutcome);
}
impl<F> PairingSink for F
where
	F: Fn(PairingOutcome) + Send + Sync,
{
	fn notify(&self, outcome: PairingOutcome) {
		self(outcome)
	}
}

#[derive(Debug, Default)]
struct PollerState {
	epoch: u64,
	phase: PairingPhase,
	session: Option<PairingSession>,
	timer: Option<SessionTimer>,
	poll_in_flight: bool,
}
impl PollerState {
	fn is_live(&self, epoch: u64) -> bool {
		self.epoch == epoch && matches!(self.phase, PairingPhase::Outcome(PairingOutcome::Waiting))
	}

	fn is_pending(&self) -> bool {
		matches!(
			self.phase,
			PairingPhase::Starting | PairingPhase::Outcome(PairingOutcome::Waiting)
		)
	}

	/// Drops the timer token and any in-flight marker.
	fn disarm(&mut self) {
		self.timer = None;
		self.poll_in_flight = false;
	}

	fn settle(&mut self, outcome: PairingOutcome) {
		self.disarm();
		self.phase = PairingPhase::Outcome(outcome);
	}
}

/// Drives device pairing sessions against one backend.
///
/// Cloning is cheap; clones share the same state and observe the same sessions.
pub struct PairingPoller<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: ApiClient<C, M>,
	sink: Arc<dyn PairingSink>,
	session_check: SessionCheck,
	metrics: Arc<PairingMetrics>,
	state: Arc<Mutex<PollerState>>,
}
impl<C, M> PairingPoller<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an idle poller; the descriptor's pairing policy is validated up front.
	pub fn new(client: ApiClient<C, M>, sink: impl 'static + PairingSink) -> Result<Self> {
		client.descriptor.validate().map_err(ConfigError::from)?;

		Ok(Self {
			client,
			sink: Arc::new(sink),
			session_check: Arc::new(|| false),
			metrics: Default::default(),
			state: Default::default(),
		})
	}

	/// Supplies the predicate evaluated before every call to decide the [`SessionState`].
	pub fn with_session_check<F>(mut self, check: F) -> Self
	where
		F: 'static + Fn() -> bool + Send + Sync,
	{
		self.session_check = Arc::new(check);

		self
	}

	/// Shared counters for every session driven by this poller.
	pub fn metrics(&self) -> &PairingMetrics {
		&self.metrics
	}

	/// Underlying API client.
	pub fn client(&self) -> &ApiClient<C, M> {
		&self.client
	}

	/// Returns a read-only copy of the current state.
	pub fn snapshot(&self) -> PairingSnapshot {
		let state = self.state.lock();

		PairingSnapshot {
			epoch: state.epoch,
			phase: state.phase.clone(),
			session: state.session.clone(),
		}
	}

	/// Starts a new session, silently cancelling any session that is still starting or waiting.
	///
	/// Resolves once the start call returns. Polling continues in the background until the
	/// session settles; the outcome is delivered to the sink.
	///
	/// The first poll goes out as soon as the session is waiting, then one per poll interval.
	/// With the default 1 s interval and 60 s deadline, polls land at 0, 1, ..., 59 s and the
	/// deadline wins a tie with a tick at 60 s.
	pub async fn start(&self) -> Result<PairingSession, PairingError> {
		const KIND: OperationKind = OperationKind::PairingStart;

		let span = OperationSpan::new(KIND, "start");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let epoch = self.begin_start();
		let request = ApiRequest::post(&self.client.descriptor.paths.pairing_start);
		let result = span
			.instrument(self.client.issue_json::<PinGrant>(&request, self.session_state()))
			.await;
		let result = self.finish_start(epoch, result);

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(PairingError::Cancelled) =>
				obs::record_operation_outcome(KIND, OperationOutcome::Discarded),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	/// Cancels the session if it is starting or waiting; returns whether anything changed.
	///
	/// In-flight calls keep running; their results are discarded when they arrive.
	pub fn cancel(&self) -> bool {
		let mut state = self.state.lock();

		if !state.is_pending() {
			return false;
		}

		state.epoch += 1;
		state.settle(PairingOutcome::Cancelled);
		self.metrics.record_cancelled();
		obs::record_session_end(SessionEnd::Cancelled);
		obs::trace_session_event(OperationKind::PairingPoll, state.epoch, "session cancelled");

		true
	}

	fn session_state(&self) -> SessionState {
		(self.session_check)().into()
	}

	fn begin_start(&self) -> u64 {
		let mut state = self.state.lock();

		if state.is_pending() {
			state.phase = PairingPhase::Outcome(PairingOutcome::Cancelled);
			self.metrics.record_superseded();
			obs::record_session_end(SessionEnd::Superseded);
			obs::trace_session_event(OperationKind::PairingStart, state.epoch, "session superseded");
		}

		state.disarm();
		state.epoch += 1;
		state.phase = PairingPhase::Starting;
		state.session = None;
		self.metrics.record_started();

		state.epoch
	}

	fn finish_start(
		&self,
		epoch: u64,
		result: Result<PinGrant>,
	) -> Result<PairingSession, PairingError> {
		let (result, notification) = {
			let mut state = self.state.lock();

			if state.epoch != epoch {
				self.metrics.record_discarded();
				obs::trace_session_event(OperationKind::PairingStart, epoch, "stale start discarded");

				return Err(PairingError::Cancelled);
			}

			match result {
				Ok(grant) => {
					let policy = &self.client.descriptor.pairing;
					let session = PairingSession::from_grant(grant, policy.deadline);

					state.phase = PairingPhase::Outcome(PairingOutcome::Waiting);
					state.session = Some(session.clone());
					state.timer = Some(self.arm(epoch, policy.poll_interval, policy.deadline));

					(Ok(session), None)
				},
				Err(e) => {
					let err = PairingError::start_failed(e);

					state.settle(PairingOutcome::Failed(err.clone()));
					self.metrics.record_failed();
					obs::record_session_end(SessionEnd::Failed);

					(Err(err.clone()), Some(PairingOutcome::Failed(err)))
				},
			}
		};

		if let Some(outcome) = notification {
			self.sink.notify(outcome);
		}

		result
	}

	/// Spawns the driver that owns both the poll interval and the deadline of one session.
	fn arm(&self, epoch: u64, period: StdDuration, deadline: StdDuration) -> SessionTimer {
		let poller = self.clone();
		let deadline = Instant::now() + deadline;
		let driver = tokio::spawn(async move {
			let mut ticker = time::interval(period);

			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			let expiry = time::sleep_until(deadline);

			tokio::pin!(expiry);

			loop {
				tokio::select! {
					biased;
					_ = &mut expiry => {
						poller.expire(epoch);

						return;
					},
					_ = ticker.tick() => poller.tick(epoch),
				}
			}
		});

		SessionTimer::new(driver.abort_handle())
	}

	fn expire(&self, epoch: u64) {
		{
			let mut state = self.state.lock();

			if !state.is_live(epoch) {
				return;
			}

			state.settle(PairingOutcome::TimedOut);
			self.metrics.record_timed_out();
			obs::record_session_end(SessionEnd::TimedOut);
		}

		self.sink.notify(PairingOutcome::TimedOut);
	}

	fn tick(&self, epoch: u64) {
		let session = {
			let mut state = self.state.lock();

			if !state.is_live(epoch) {
				return;
			}
			if state.poll_in_flight {
				self.metrics.record_skipped_tick();
				obs::record_operation_outcome(
					OperationKind::PairingPoll,
					OperationOutcome::Skipped,
				);
				obs::trace_session_event(OperationKind::PairingPoll, epoch, "tick skipped");

				return;
			}

			let Some(session) = state.session.clone() else {
				return;
			};

			state.poll_in_flight = true;

			session
		};
		let poller = self.clone();

		self.metrics.record_poll();
		tokio::spawn(async move { poller.poll(epoch, session).await });
	}

	async fn poll(&self, epoch: u64, session: PairingSession) {
		const KIND: OperationKind = OperationKind::PairingPoll;

		let span = OperationSpan::new(KIND, "poll");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let path = &self.client.descriptor.paths.pairing_poll;
		let request = ApiRequest::get(path).with_query(
			Query::new()
				.with("pinId", &session.pin_id)
				.with("clientId", &session.client_id)
				.with("code", &session.code),
		);
		let result =
			span.instrument(self.client.issue_with_status(&request, self.session_state())).await;

		self.resolve_poll(epoch, path, result);
	}

	fn resolve_poll(&self, epoch: u64, path: &str, result: Result<(u16, ApiResponse)>) {
		const KIND: OperationKind = OperationKind::PairingPoll;

		let outcome = {
			let mut state = self.state.lock();

			if !state.is_live(epoch) {
				self.metrics.record_discarded();
				obs::record_operation_outcome(KIND, OperationOutcome::Discarded);
				obs::trace_session_event(KIND, epoch, "stale poll result discarded");

				return;
			}

			state.poll_in_flight = false;

			let reply = result
				.and_then(|(status, response)| PollReply::from_response(path, status, response));
			let outcome = match reply {
				Ok(PollReply::Waiting) => {
					obs::record_operation_outcome(KIND, OperationOutcome::Success);

					return;
				},
				Ok(PollReply::Authorized(credential)) => {
					obs::record_operation_outcome(KIND, OperationOutcome::Success);
					self.metrics.record_succeeded();
					obs::record_session_end(SessionEnd::Succeeded);

					PairingOutcome::Succeeded(credential)
				},
				Err(e) => {
					obs::record_operation_outcome(KIND, OperationOutcome::Failure);
					self.metrics.record_failed();
					obs::record_session_end(SessionEnd::Failed);

					PairingOutcome::Failed(PairingError::poll_failed(e))
				},
			};

			state.settle(outcome.clone());

			outcome
		};

		self.sink.notify(outcome);
	}
}
#[cfg(feature = "reqwest")]
impl PairingPoller<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a poller on top of a fresh reqwest-backed [`ApiClient`].
	pub fn with_descriptor(
		descriptor: ApiDescriptor,
		sink: impl 'static + PairingSink,
	) -> Result<Self> {
		Self::new(ReqwestApiClient::new(descriptor)?, sink)
	}
}
impl<C, M> Clone for PairingPoller<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			client: self.client.clone(),
			sink: Arc::clone(&self.sink),
			session_check: Arc::clone(&self.session_check),
			metrics: Arc::clone(&self.metrics),
			state: Arc::clone(&self.state),
		}
	}
}
impl<C, M> Debug for PairingPoller<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PairingPoller")
			.field("client", &self.client)
			.field("state", &*self.state.lock())
			.finish()
	}
}
