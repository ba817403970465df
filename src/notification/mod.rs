//! Hands finished payloads to the downstream notify function.
//!
//! The router only knows the [`Dispatcher`] trait; the Lambda-backed client
//! and the dry-run logger are interchangeable behind it.
pub mod lambda;
pub mod logging;

use crate::core::NotificationPayload;
use async_trait::async_trait;

/// Errors from reaching the notify function at all.
///
/// An application error reported *by* the function is not a `DispatchError`;
/// it comes back inside [`DispatchResponse::function_error`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to encode notification payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("error when invoking notify function: {0}")]
    Invoke(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// What the notify function answered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchResponse {
    /// Set when the function ran and failed, e.g. `"Unhandled"`.
    pub function_error: Option<String>,
    /// The raw response body.
    pub payload: Vec<u8>,
}

impl DispatchResponse {
    /// The body as JSON, falling back to a string for non-JSON bodies.
    pub fn body_json(&self) -> serde_json::Value {
        if self.payload.is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_slice(&self.payload).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&self.payload).into_owned())
        })
    }
}

/// Delivers one payload with a single blocking request/response.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// The downstream function name, used in logs and errors.
    fn name(&self) -> &str;

    /// Sends a payload. No retries are attempted.
    async fn dispatch(
        &self,
        payload: &NotificationPayload,
    ) -> Result<DispatchResponse, DispatchError>;
}
