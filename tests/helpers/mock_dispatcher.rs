//! A mock dispatcher for testing the router without AWS.

use alarm_router::notification::{DispatchError, DispatchResponse, Dispatcher};
use alarm_router::NotificationPayload;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// How the mock answers each call.
#[derive(Clone, Debug)]
pub enum MockBehavior {
    Respond(DispatchResponse),
    FunctionError(String),
    TransportError(String),
}

#[derive(Debug)]
pub struct MockDispatcher {
    pub sent: Mutex<Vec<NotificationPayload>>,
    behavior: MockBehavior,
}

impl MockDispatcher {
    pub fn new(behavior: MockBehavior) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            behavior,
        })
    }

    /// Answers every call with `body`.
    pub fn responding(body: &str) -> Arc<Self> {
        Self::new(MockBehavior::Respond(DispatchResponse {
            function_error: None,
            payload: body.as_bytes().to_vec(),
        }))
    }

    pub fn sent_payloads(&self) -> Vec<NotificationPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for MockDispatcher {
    fn name(&self) -> &str {
        "mock-notify"
    }

    async fn dispatch(
        &self,
        payload: &NotificationPayload,
    ) -> Result<DispatchResponse, DispatchError> {
        self.sent.lock().unwrap().push(payload.clone());
        match &self.behavior {
            MockBehavior::Respond(response) => Ok(response.clone()),
            MockBehavior::FunctionError(error) => Ok(DispatchResponse {
                function_error: Some(error.clone()),
                payload: br#"{"errorMessage":"delivery failed"}"#.to_vec(),
            }),
            MockBehavior::TransportError(message) => {
                Err(DispatchError::Invoke(message.clone().into()))
            }
        }
    }
}
