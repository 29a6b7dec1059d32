//! Demonstrates linking a third-party account through the PIN pairing poller against a mock
//! dashboard backend: the first polls report "waiting for auth", then the credential arrives.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use pairlink::{
	descriptor::ApiDescriptor,
	pairing::{PairingOutcome, ReqwestPairingPoller, WAITING_FOR_AUTH},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let start_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/pairing/pin");
			then.status(200).json_body(json!({
				"pinId": 7031,
				"code": "K4TZ",
				"clientId": "demo-dashboard",
				"authUrl": "https://link.example.com/pin?code=K4TZ",
			}));
		})
		.await;
	let mut waiting_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/pairing/pin").query_param("pinId", "7031");
			then.status(200).json_body(json!({ "message": WAITING_FOR_AUTH }));
		})
		.await;
	let descriptor = ApiDescriptor::builder(Url::parse(&server.base_url())?)
		.poll_interval(Duration::from_millis(250))
		.pairing_deadline(Duration::from_secs(10))
		.build()?;
	let poller = ReqwestPairingPoller::with_descriptor(descriptor, |outcome: PairingOutcome| {
		println!("Pairing settled: {outcome:?}");
	})?;
	let session = poller.start().await?;

	println!("Visit {} and enter code {}.", session.auth_url, session.code);

	tokio::time::sleep(Duration::from_secs(1)).await;

	// The user approves the PIN: later polls receive the credential.
	let credential_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/pairing/pin").query_param("pinId", "7031");
			then.status(200).json_body(json!({
				"token": "demo-token",
				"externalUser": { "username": "demo-viewer" },
				"clientId": "demo-dashboard",
			}));
		})
		.await;

	waiting_mock.delete_async().await;

	while !poller.snapshot().outcome().is_some_and(PairingOutcome::is_terminal) {
		tokio::time::sleep(Duration::from_millis(100)).await;
	}

	let metrics = poller.metrics();

	println!(
		"Polls dispatched: {}, succeeded sessions: {}.",
		metrics.polls(),
		metrics.succeeded()
	);

	start_mock.assert_async().await;
	credential_mock.assert_async().await;

	Ok(())
}
