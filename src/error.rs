//! Error taxonomy for alarm routing.
//!
//! Every variant is fatal to the batch being processed. The router logs the
//! error once, tagged with [`RouterError::kind`], and hands it back to the
//! Lambda runtime, which owns redelivery.

use crate::notification::DispatchError;

/// Errors raised while turning an alarm batch into notifications.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The SNS message body is not JSON or lacks a required alarm field.
    #[error("malformed alarm message: {0}")]
    MalformedMessage(#[source] serde_json::Error),

    /// The SNS delivery timestamp is not ISO-8601.
    #[error("malformed timestamp '{value}': {source}")]
    MalformedTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The subscription ARN has fewer than four colon-delimited segments.
    #[error("malformed subscription ARN '{0}'")]
    MalformedArn(String),

    /// No recipients are configured for the alarm.
    #[error("no recipients configured for alarm '{0}'")]
    UnknownAlarm(String),

    /// The alarm state has no theme colour.
    #[error("unknown alarm state '{0}'")]
    UnknownState(String),

    /// The notify function ran but reported an application error.
    #[error("{function} failed to notify: {error}")]
    DownstreamNotifyFailed { function: String, error: String },

    /// The notify function could not be reached.
    #[error(transparent)]
    DispatchTransport(#[from] DispatchError),
}

impl RouterError {
    /// A stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RouterError::MalformedMessage(_) => "malformed_message",
            RouterError::MalformedTimestamp { .. } => "malformed_timestamp",
            RouterError::MalformedArn(_) => "malformed_arn",
            RouterError::UnknownAlarm(_) => "unknown_alarm",
            RouterError::UnknownState(_) => "unknown_state",
            RouterError::DownstreamNotifyFailed { .. } => "downstream_notify_failed",
            RouterError::DispatchTransport(_) => "dispatch_transport",
        }
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_is_transparent() {
        let inner = DispatchError::Invoke("connection reset".into());
        let expected = inner.to_string();
        let err = RouterError::from(inner);

        assert_eq!(err.to_string(), expected);
        assert_eq!(err.kind(), "dispatch_transport");
    }

    #[test]
    fn test_downstream_failure_names_function() {
        let err = RouterError::DownstreamNotifyFailed {
            function: "devops-notify".to_string(),
            error: "Unhandled".to_string(),
        };
        assert_eq!(err.to_string(), "devops-notify failed to notify: Unhandled");
    }
}
