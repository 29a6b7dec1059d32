//! Generic request/response transport shared by every dashboard screen.
//!
//! [`ApiClient::issue`] builds one request from an [`ApiRequest`], sends it through the
//! configured [`ApiHttpClient`], and classifies the answer:
//!
//! - 2xx resolves to [`ApiResponse::Empty`] (204), [`ApiResponse::Json`], or [`ApiResponse::Raw`];
//! - 403 with an authenticated [`SessionState`] raises [`Error::AuthExpired`];
//! - 500 triggers a liveness probe and raises [`Error::ServerOffline`] when the probe fails;
//! - 503 raises [`Error::ServiceUnavailable`] without probing;
//! - everything else raises [`Error::Http`] with a formatted reason.
//!
//! The transport never retries.

pub mod classify;
pub mod request;
pub mod response;

pub use classify::*;
pub use request::*;
pub use response::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	descriptor::ApiDescriptor,
	error::{ConfigError, DecodeError, TransportError},
	http::{self, ApiHttpClient, HttpResponse},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// API client specialized for the crate's default reqwest transport stack.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Whether the caller currently considers its dashboard session authenticated.
///
/// Evaluated by the caller for every call; the transport never stores it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
	/// A signed-in session is believed valid, so a 403 means it expired.
	Authenticated,
	/// No session is believed valid, so a 403 is an ordinary failure.
	#[default]
	Anonymous,
}
impl SessionState {
	/// Returns `true` for [`SessionState::Authenticated`].
	pub fn is_authenticated(self) -> bool {
		matches!(self, Self::Authenticated)
	}
}
impl From<bool> for SessionState {
	fn from(authenticated: bool) -> Self {
		if authenticated { Self::Authenticated } else { Self::Anonymous }
	}
}

/// Maps HTTP client failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts a failure raised while calling `path` into a crate error.
	fn map_transport_error(&self, path: &str, error: E) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, path: &str, error: ReqwestError) -> Error {
		if error.is_builder() {
			return ConfigError::from(error).into();
		}
		if error.is_timeout() {
			return TransportError::timeout(path, error).into();
		}

		TransportError::network(path, error).into()
	}
}

/// Issues API calls against a single backend descriptor.
pub struct ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Backend descriptor (base URL, well-known paths, pairing policy).
	pub descriptor: ApiDescriptor,
}
impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		descriptor: ApiDescriptor,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self { http_client: http_client.into(), transport_mapper: mapper.into(), descriptor }
	}

	/// Sends `request` and classifies the response.
	pub async fn issue(&self, request: &ApiRequest, session: SessionState) -> Result<ApiResponse> {
		self.issue_with_status(request, session).await.map(|(_, response)| response)
	}

	/// Sends `request` and decodes a successful structured payload into `T`.
	///
	/// [`ApiResponse::Empty`] decodes from `{}`; raw bodies are parsed as JSON regardless of
	/// their announced content type. Decode failures carry the status the backend answered with.
	pub async fn issue_json<T>(&self, request: &ApiRequest, session: SessionState) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let (status, response) = self.issue_with_status(request, session).await?;

		decode_response(request.path(), status, response)
	}

	/// Like [`ApiClient::issue`], keeping the 2xx status next to the classified response.
	pub(crate) async fn issue_with_status(
		&self,
		request: &ApiRequest,
		session: SessionState,
	) -> Result<(u16, ApiResponse)> {
		const KIND: OperationKind = OperationKind::Request;

		let span = OperationSpan::new(KIND, "issue");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span.instrument(self.dispatch(request, session)).await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	/// Issues a bare `GET` against the liveness path; `true` when reachable and 2xx.
	pub async fn probe_liveness(&self) -> bool {
		const KIND: OperationKind = OperationKind::Liveness;

		let span = OperationSpan::new(KIND, "probe_liveness");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let alive = span
			.instrument(async {
				let Ok(request) = ApiRequest::get(&self.descriptor.paths.liveness)
					.to_http(&self.descriptor)
				else {
					return false;
				};

				matches!(
					self.http_client.execute(request).await,
					Ok(response) if response.status().is_success()
				)
			})
			.await;

		obs::record_operation_outcome(
			KIND,
			if alive { OperationOutcome::Success } else { OperationOutcome::Failure },
		);

		alive
	}

	async fn dispatch(
		&self,
		request: &ApiRequest,
		session: SessionState,
	) -> Result<(u16, ApiResponse)> {
		let outbound = request.to_http(&self.descriptor)?;
		let response = self
			.http_client
			.execute(outbound)
			.await
			.map_err(|err| self.transport_mapper.map_transport_error(request.path(), err))?;

		self.interpret(request, response, session).await
	}

	async fn interpret(
		&self,
		request: &ApiRequest,
		response: HttpResponse,
		session: SessionState,
	) -> Result<(u16, ApiResponse)> {
		let status = response.status().as_u16();
		let content_type = http::content_type(response.headers()).map(str::to_owned);
		let classified = match classify(status, content_type.as_deref(), session) {
			Classification::Empty => Ok(ApiResponse::Empty),
			Classification::Json =>
				decode_slice(request.path(), status, response.body()).map(ApiResponse::Json),
			Classification::Raw =>
				Ok(ApiResponse::Raw(RawBody::new(status, content_type, response.into_body()))),
			Classification::AuthExpired => Err(Error::AuthExpired),
			Classification::ServiceUnavailable => Err(Error::ServiceUnavailable {
				retry_after: http::parse_retry_after(response.headers()),
			}),
			Classification::ProbeLiveness =>
				if self.probe_liveness().await {
					Err(generic_failure(request, status, content_type.as_deref(), response.body()))
				} else {
					Err(Error::ServerOffline)
				},
			Classification::Failure =>
				Err(generic_failure(request, status, content_type.as_deref(), response.body())),
		};

		classified.map(|response| (status, response))
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client backed by a cookie-keeping reqwest transport.
	pub fn new(descriptor: ApiDescriptor) -> Result<Self> {
		Ok(Self::with_http_client(
			descriptor,
			ReqwestHttpClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}
}
impl<C, M> Clone for ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			transport_mapper: Arc::clone(&self.transport_mapper),
			descriptor: self.descriptor.clone(),
		}
	}
}
impl<C, M> Debug for ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient").field("descriptor", &self.descriptor).finish()
	}
}

fn generic_failure(
	request: &ApiRequest,
	status: u16,
	content_type: Option<&str>,
	body: &[u8],
) -> Error {
	let reason = failure_reason(status, content_type, body);

	Error::Http { status, reason: format_failure(request.method(), request.path(), status, &reason) }
}

/// Decodes a classified 2xx response into `T`; `Empty` decodes from `{}`.
pub(crate) fn decode_response<T>(path: &str, status: u16, response: ApiResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	match response {
		ApiResponse::Empty => decode_value(path, status, Value::Object(Default::default())),
		ApiResponse::Json(value) => decode_value(path, status, value),
		ApiResponse::Raw(body) => decode_slice(path, body.status(), body.as_bytes()),
	}
}

fn decode_slice<T>(path: &str, status: u16, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| DecodeError::Json { path: path.to_owned(), status, source }.into())
}

fn decode_value<T>(path: &str, status: u16, value: Value) -> Result<T>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(value)
		.map_err(|source| DecodeError::Json { path: path.to_owned(), status, source }.into())
}
