//! A client for handing notifications to the notify Lambda function.

use crate::config::DispatcherConfig;
use crate::core::NotificationPayload;
use crate::notification::{DispatchError, DispatchResponse, Dispatcher};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_lambda::operation::invoke::InvokeOutput;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::Client;
use tracing::{debug, instrument};

/// Invokes the notify function synchronously (`RequestResponse`).
pub struct LambdaDispatcher {
    client: Client,
    function_name: String,
}

impl LambdaDispatcher {
    /// Creates a new `LambdaDispatcher` around an existing SDK client.
    pub fn new(client: Client, function_name: String) -> Self {
        Self {
            client,
            function_name,
        }
    }

    /// Builds the SDK client for the configured region.
    pub async fn from_config(config: &DispatcherConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        Self::new(Client::new(&sdk_config), config.function_name.clone())
    }
}

impl From<InvokeOutput> for DispatchResponse {
    fn from(output: InvokeOutput) -> Self {
        Self {
            function_error: output.function_error,
            payload: output.payload.map(Blob::into_inner).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Dispatcher for LambdaDispatcher {
    fn name(&self) -> &str {
        &self.function_name
    }

    #[instrument(name = "invoke_notify", skip_all, fields(function = %self.function_name, message_type = payload.message_type()))]
    async fn dispatch(
        &self,
        payload: &NotificationPayload,
    ) -> Result<DispatchResponse, DispatchError> {
        let body = serde_json::to_vec(payload)?;

        let output = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .payload(Blob::new(body))
            .send()
            .await
            .map_err(|e| DispatchError::Invoke(Box::new(e)))?;

        debug!(status = output.status_code, "Notify function responded");
        Ok(output.into())
    }
}
