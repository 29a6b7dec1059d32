//! Scripted in-process backend for driving the pairing poller under paused time.

#![allow(dead_code)]

// std
use std::{
	collections::{HashMap, VecDeque},
	sync::Arc,
	time::Duration,
};
// crates.io
use http::{Method, Response, header::CONTENT_TYPE};
use parking_lot::Mutex;
use serde_json::{Value, json};
use url::Url;
// self
use pairlink::{
	descriptor::ApiDescriptor,
	error::{Error, TransportError},
	http::{ApiHttpClient, HttpFuture, HttpRequest, HttpResponse},
	pairing::{PairingOutcome, PairingPoller, WAITING_FOR_AUTH},
	transport::{ApiClient, TransportErrorMapper},
};

pub const PAIRING_PATH: &str = "/api/pairing/pin";
pub const HEALTH_PATH: &str = "/api/health";

/// Failure raised for [`Reply::Unreachable`].
#[derive(Debug, thiserror::Error)]
#[error("Scripted backend is unreachable.")]
pub struct Unreachable;

#[derive(Clone, Debug)]
pub enum Reply {
	Json(u16, Value),
	Unreachable,
}

/// One scripted answer, delivered after `delay` of (paused) tokio time.
#[derive(Clone, Debug)]
pub struct Step {
	pub delay: Duration,
	pub reply: Reply,
}
impl Step {
	pub fn json(status: u16, body: Value) -> Self {
		Self { delay: Duration::ZERO, reply: Reply::Json(status, body) }
	}

	pub fn unreachable() -> Self {
		Self { delay: Duration::ZERO, reply: Reply::Unreachable }
	}

	pub fn after(mut self, delay: Duration) -> Self {
		self.delay = delay;

		self
	}
}

pub fn grant(pin_id: &str, client_id: &str) -> Step {
	Step::json(
		200,
		json!({
			"pinId": pin_id,
			"code": "WXYZ",
			"clientId": client_id,
			"authUrl": format!("https://link.example.test/pin/{pin_id}"),
		}),
	)
}

pub fn waiting() -> Step {
	Step::json(200, json!({ "message": WAITING_FOR_AUTH }))
}

pub fn credential(client_id: &str) -> Step {
	Step::json(
		200,
		json!({
			"token": format!("token-{client_id}"),
			"externalUser": { "username": "viewer" },
			"clientId": client_id,
		}),
	)
}

#[derive(Debug, Default)]
struct Script {
	starts: VecDeque<Step>,
	polls: HashMap<String, VecDeque<Step>>,
	start_calls: usize,
	poll_calls: HashMap<String, usize>,
	health_calls: usize,
	healthy: bool,
}

/// In-process [`ApiHttpClient`] routing by method, path, and `pinId`.
///
/// Polls for a PIN without scripted steps answer "waiting for auth"; the health endpoint is up
/// unless [`ScriptedBackend::set_healthy`] says otherwise.
#[derive(Clone, Debug)]
pub struct ScriptedBackend {
	script: Arc<Mutex<Script>>,
}
impl ScriptedBackend {
	pub fn new() -> Self {
		Self { script: Arc::new(Mutex::new(Script { healthy: true, ..Default::default() })) }
	}

	pub fn push_start(&self, step: Step) -> &Self {
		self.script.lock().starts.push_back(step);

		self
	}

	pub fn push_poll(&self, pin_id: &str, step: Step) -> &Self {
		self.script.lock().polls.entry(pin_id.to_owned()).or_default().push_back(step);

		self
	}

	pub fn push_polls(&self, pin_id: &str, step: Step, times: usize) -> &Self {
		for _ in 0..times {
			self.push_poll(pin_id, step.clone());
		}

		self
	}

	pub fn set_healthy(&self, healthy: bool) {
		self.script.lock().healthy = healthy;
	}

	pub fn start_calls(&self) -> usize {
		self.script.lock().start_calls
	}

	pub fn poll_calls(&self, pin_id: &str) -> usize {
		self.script.lock().poll_calls.get(pin_id).copied().unwrap_or_default()
	}

	pub fn health_calls(&self) -> usize {
		self.script.lock().health_calls
	}

	fn route(&self, request: &HttpRequest) -> Step {
		let mut script = self.script.lock();
		let method = request.method().clone();

		match request.uri().path() {
			PAIRING_PATH if method == Method::POST => {
				script.start_calls += 1;

				script.starts.pop_front().unwrap_or_else(|| Step::json(404, json!({})))
			},
			PAIRING_PATH if method == Method::GET => {
				let pin_id = query_value(request, "pinId").unwrap_or_default();

				*script.poll_calls.entry(pin_id.clone()).or_default() += 1;

				script.polls.get_mut(&pin_id).and_then(VecDeque::pop_front).unwrap_or_else(waiting)
			},
			HEALTH_PATH => {
				script.health_calls += 1;

				if script.healthy {
					Step::json(200, json!({ "status": "ok" }))
				} else {
					Step::unreachable()
				}
			},
			_ => Step::json(404, json!({ "message": "Unknown route" })),
		}
	}
}
impl ApiHttpClient for ScriptedBackend {
	type TransportError = Unreachable;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'static, Self::TransportError> {
		let step = self.route(&request);

		Box::pin(async move {
			if !step.delay.is_zero() {
				tokio::time::sleep(step.delay).await;
			}

			match step.reply {
				Reply::Json(status, body) => Ok(json_response(status, &body)),
				Reply::Unreachable => Err(Unreachable),
			}
		})
	}
}

#[derive(Debug, Default)]
pub struct ScriptedMapper;
impl TransportErrorMapper<Unreachable> for ScriptedMapper {
	fn map_transport_error(&self, path: &str, error: Unreachable) -> Error {
		TransportError::network(path, error).into()
	}
}

/// Collects every outcome delivered to the sink.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
	outcomes: Arc<Mutex<Vec<PairingOutcome>>>,
}
impl Recorder {
	pub fn sink(&self) -> impl Fn(PairingOutcome) + Send + Sync + 'static {
		let outcomes = Arc::clone(&self.outcomes);

		move |outcome| outcomes.lock().push(outcome)
	}

	pub fn outcomes(&self) -> Vec<PairingOutcome> {
		self.outcomes.lock().clone()
	}
}

pub type ScriptedPoller = PairingPoller<ScriptedBackend, ScriptedMapper>;

pub fn descriptor() -> ApiDescriptor {
	ApiDescriptor::builder(
		Url::parse("http://dashboard.test").expect("Scripted base URL should parse."),
	)
	.build()
	.expect("Default descriptor should validate.")
}

pub fn poller(backend: &ScriptedBackend, recorder: &Recorder) -> ScriptedPoller {
	let client = ApiClient::with_http_client(descriptor(), backend.clone(), ScriptedMapper);

	PairingPoller::new(client, recorder.sink()).expect("Scripted poller should build.")
}

fn query_value(request: &HttpRequest, key: &str) -> Option<String> {
	request.uri().query()?.split('&').find_map(|pair| {
		let (name, value) = pair.split_once('=')?;

		(name == key).then(|| value.to_owned())
	})
}

fn json_response(status: u16, body: &Value) -> HttpResponse {
	let bytes = serde_json::to_vec(body).expect("Scripted body should serialize.");

	Response::builder()
		.status(status)
		.header(CONTENT_TYPE, "application/json")
		.body(bytes)
		.expect("Scripted response should build.")
}
