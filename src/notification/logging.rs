//! A dispatcher that only logs what it would have sent.
//!
//! Used when `dispatcher.dry_run` is set, to check routing and formatting
//! against real alarms without notifying anyone.

use crate::core::NotificationPayload;
use crate::notification::{DispatchError, DispatchResponse, Dispatcher};
use async_trait::async_trait;
use tracing::{info, instrument};

pub struct LoggingDispatcher {
    name: String,
}

impl LoggingDispatcher {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() { "dry-run".to_string() } else { name },
        }
    }
}

#[async_trait]
impl Dispatcher for LoggingDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(function = %self.name))]
    async fn dispatch(
        &self,
        payload: &NotificationPayload,
    ) -> Result<DispatchResponse, DispatchError> {
        let body = serde_json::to_string(payload)?;
        info!(message_type = payload.message_type(), payload = %body, "Dry run, not invoking notify function");
        Ok(DispatchResponse {
            function_error: None,
            payload: b"{}".to_vec(),
        })
    }
}
