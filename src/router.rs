//! Turns alarm batches into notifications.
//!
//! Records are handled strictly in order. The first error aborts the whole
//! batch; nothing is retried here.

use crate::config::RecipientTable;
use crate::core::{AlarmContext, AlarmEvent, AlarmRecord, CardPayload, EmailPayload, NotificationPayload};
use crate::error::{Result, RouterError};
use crate::formatting::{build_message_card, build_template_vars};
use crate::notification::{DispatchResponse, Dispatcher};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// What happens to alarms whose trigger namespace matches the routed one.
#[derive(Debug, Clone, PartialEq)]
pub enum NamespaceRoute {
    /// Send one templated email per recipient instead of a card.
    Email {
        template_id: String,
        recipients: RecipientTable,
    },
    /// Send the usual card, but to this webhook.
    CardOverride { webhook_url: String },
}

/// Routes CloudWatch alarm notifications to the notify function.
pub struct AlarmRouter {
    namespace: String,
    route: NamespaceRoute,
    dispatcher: Arc<dyn Dispatcher>,
}

impl AlarmRouter {
    /// Creates a router for alarms in `namespace`.
    pub fn new(
        namespace: impl Into<String>,
        route: NamespaceRoute,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            route,
            dispatcher,
        }
    }

    /// Processes every record of the batch and returns the last response.
    ///
    /// Returns `Ok(None)` for an empty batch.
    #[instrument(skip_all, fields(records = event.records.len()))]
    pub async fn process(&self, event: &AlarmEvent) -> Result<Option<DispatchResponse>> {
        info!("Processing alarm batch.");
        let mut last = None;
        for record in &event.records {
            match self.process_record(record).await {
                Ok(response) => last = Some(response),
                Err(e) => {
                    error!(error = %e, kind = e.kind(), "Aborting alarm batch");
                    return Err(e);
                }
            }
        }
        Ok(last)
    }

    async fn process_record(&self, record: &AlarmRecord) -> Result<DispatchResponse> {
        let alarm = AlarmContext::from_record(record)?;
        debug!(message = ?alarm.message, "Decoded alarm message");
        info!(
            alarm = %alarm.message.alarm_name,
            namespace = %alarm.message.trigger.namespace,
            new_state = %alarm.message.new_state,
            region = %alarm.region,
            "Routing alarm"
        );

        let payloads = self.build_payloads(&alarm)?;
        let mut last = DispatchResponse::default();
        for payload in &payloads {
            last = self.dispatch(payload).await?;
        }
        Ok(last)
    }

    /// Builds every payload for one alarm. Never returns an empty list.
    pub fn build_payloads(&self, alarm: &AlarmContext) -> Result<Vec<NotificationPayload>> {
        let in_namespace = alarm.message.trigger.namespace == self.namespace;

        match &self.route {
            NamespaceRoute::Email {
                template_id,
                recipients,
            } if in_namespace => {
                let alarm_name = &alarm.message.alarm_name;
                let recipients = recipients
                    .recipients_for(alarm_name)
                    .ok_or_else(|| RouterError::UnknownAlarm(alarm_name.clone()))?;
                let template_vars = build_template_vars(alarm);

                Ok(recipients
                    .into_iter()
                    .map(|to| {
                        NotificationPayload::Email(EmailPayload {
                            to,
                            template_id: template_id.clone(),
                            template_vars: template_vars.clone(),
                        })
                    })
                    .collect())
            }
            NamespaceRoute::CardOverride { webhook_url } => {
                Ok(vec![NotificationPayload::Card(CardPayload {
                    body: build_message_card(alarm)?,
                    webhook_url: in_namespace.then(|| webhook_url.clone()),
                })])
            }
            NamespaceRoute::Email { .. } => Ok(vec![NotificationPayload::Card(CardPayload {
                body: build_message_card(alarm)?,
                webhook_url: None,
            })]),
        }
    }

    async fn dispatch(&self, payload: &NotificationPayload) -> Result<DispatchResponse> {
        let function = self.dispatcher.name();
        debug!(message_type = payload.message_type(), function, "Dispatching notification");

        let response = self.dispatcher.dispatch(payload).await.map_err(|e| {
            error!(error = %e, function, "Error when invoking notify function.");
            RouterError::from(e)
        })?;

        if let Some(function_error) = &response.function_error {
            info!(function_error = %function_error, function, "FunctionError");
            return Err(RouterError::DownstreamNotifyFailed {
                function: function.to_string(),
                error: function_error.clone(),
            });
        }
        Ok(response)
    }
}
