//! Typed API transport and a race-free device-pairing poller for media-server dashboards.
//!
//! Every screen of the dashboard goes through [`transport::ApiClient::issue`], which builds the
//! request, sends it through a pluggable [`http::ApiHttpClient`], and classifies the response
//! into an [`transport::ApiResponse`] or a precise [`error::Error`]. Linking the third-party
//! account uses [`pairing::PairingPoller`], a PIN pairing state machine that reports exactly one
//! terminal outcome per session and discards every stale result.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod descriptor;
pub mod error;
pub mod http;
pub mod obs;
pub mod pairing;
pub mod query;
pub mod secret;
pub mod transport;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
