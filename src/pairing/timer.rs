// crates.io
use tokio::task::AbortHandle;

/// Ownership token for a session's poll interval and deadline.
///
/// Both timers run inside one driver task; dropping the token aborts it, so clearing the
/// token disarms both at once.
#[derive(Debug)]
pub(crate) struct SessionTimer {
	handle: AbortHandle,
}
impl SessionTimer {
	pub(crate) fn new(handle: AbortHandle) -> Self {
		Self { handle }
	}
}
impl Drop for SessionTimer {
	fn drop(&mut self) {
		self.handle.abort();
	}
}
