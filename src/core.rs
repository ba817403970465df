//! Core domain types for the alarm router
//!
//! This module defines the incoming SNS alarm records, the decoded alarm
//! message, and the payloads handed to the notify function.

use crate::error::{Result, RouterError};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Input
// =============================================================================

/// A batch of alarm notifications, as delivered by SNS to Lambda.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AlarmEvent {
    #[serde(rename = "Records")]
    pub records: Vec<AlarmRecord>,
}

/// One SNS delivery wrapping a CloudWatch alarm notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "SnsRecord", into = "SnsRecord")]
pub struct AlarmRecord {
    /// ARN of the subscription that delivered the message.
    pub subscription_arn: String,
    /// The JSON-encoded alarm message.
    pub sns_message: String,
    /// ISO 8601 delivery time, e.g. `2019-10-02T17:04:40.091Z`.
    pub timestamp: String,
}

#[derive(Serialize, Deserialize)]
struct SnsRecord {
    #[serde(rename = "EventSubscriptionArn")]
    event_subscription_arn: String,
    #[serde(rename = "Sns")]
    sns: SnsEnvelope,
}

#[derive(Serialize, Deserialize)]
struct SnsEnvelope {
    #[serde(rename = "Message")]
    message: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
}

impl From<SnsRecord> for AlarmRecord {
    fn from(raw: SnsRecord) -> Self {
        Self {
            subscription_arn: raw.event_subscription_arn,
            sns_message: raw.sns.message,
            timestamp: raw.sns.timestamp,
        }
    }
}

impl From<AlarmRecord> for SnsRecord {
    fn from(record: AlarmRecord) -> Self {
        Self {
            event_subscription_arn: record.subscription_arn,
            sns: SnsEnvelope {
                message: record.sns_message,
                timestamp: record.timestamp,
            },
        }
    }
}

/// A CloudWatch alarm state-change notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlarmMessage {
    #[serde(rename = "AlarmName")]
    pub alarm_name: String,
    #[serde(rename = "OldStateValue")]
    pub old_state: String,
    #[serde(rename = "NewStateValue")]
    pub new_state: String,
    #[serde(rename = "NewStateReason")]
    pub reason: String,
    #[serde(rename = "Trigger")]
    pub trigger: Trigger,
}

/// The metric comparison that caused the transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Trigger {
    pub namespace: String,
    pub statistic: String,
    pub metric_name: String,
    pub comparison_operator: String,
    pub threshold: f64,
    pub evaluation_periods: u32,
    /// Seconds.
    pub period: u32,
}

/// The three states a CloudWatch alarm can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmState {
    Ok,
    Alarm,
    InsufficientData,
}

impl AlarmState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmState::Ok => "OK",
            AlarmState::Alarm => "ALARM",
            AlarmState::InsufficientData => "INSUFFICIENT_DATA",
        }
    }

    /// Card theme colour, as a hex string without `#`.
    pub fn theme_color(&self) -> &'static str {
        match self {
            AlarmState::InsufficientData => "fce94f",
            AlarmState::Alarm => "ef2929",
            AlarmState::Ok => "acda00",
        }
    }
}

impl FromStr for AlarmState {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OK" => Ok(AlarmState::Ok),
            "ALARM" => Ok(AlarmState::Alarm),
            "INSUFFICIENT_DATA" => Ok(AlarmState::InsufficientData),
            other => Err(RouterError::UnknownState(other.to_string())),
        }
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record after decoding: everything the payload builders need.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmContext {
    pub message: AlarmMessage,
    pub timestamp: DateTime<FixedOffset>,
    pub region: String,
}

impl AlarmContext {
    /// Decodes the message, then the timestamp, then the region.
    pub fn from_record(record: &AlarmRecord) -> Result<Self> {
        let message: AlarmMessage =
            serde_json::from_str(&record.sns_message).map_err(RouterError::MalformedMessage)?;
        let timestamp = parse_timestamp(&record.timestamp)?;
        let region = region_from_arn(&record.subscription_arn)?.to_string();

        Ok(Self {
            message,
            timestamp,
            region,
        })
    }
}

/// Parses an ISO 8601 timestamp, reading a trailing `Z` as `+00:00`.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    let normalized = match raw.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => raw.to_string(),
    };
    DateTime::parse_from_rfc3339(&normalized).map_err(|source| RouterError::MalformedTimestamp {
        value: raw.to_string(),
        source,
    })
}

/// Formats a timestamp as `YYYY-MM-DDTHH:MM:SS[.ffffff]+HH:MM`.
///
/// The fractional part is printed with microsecond precision and only when
/// it is non-zero.
pub fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    if timestamp.timestamp_subsec_micros() == 0 {
        timestamp.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    } else {
        timestamp.format("%Y-%m-%dT%H:%M:%S%.6f%:z").to_string()
    }
}

/// Returns the region segment of an ARN (`arn:aws:sns:REGION:...`).
pub fn region_from_arn(arn: &str) -> Result<&str> {
    arn.split(':')
        .nth(3)
        .ok_or_else(|| RouterError::MalformedArn(arn.to_string()))
}

// =============================================================================
// Output
// =============================================================================

/// A message for the notify function, tagged by `message_type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "message_type")]
pub enum NotificationPayload {
    #[serde(rename = "email")]
    Email(EmailPayload),
    #[serde(rename = "teams")]
    Card(CardPayload),
}

impl NotificationPayload {
    pub fn message_type(&self) -> &'static str {
        match self {
            NotificationPayload::Email(_) => "email",
            NotificationPayload::Card(_) => "teams",
        }
    }
}

/// A templated email to a single recipient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailPayload {
    pub to: String,
    pub template_id: String,
    pub template_vars: TemplateVars,
}

/// Variables substituted into the alarm email template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateVars {
    pub alarm_name: String,
    pub statistic: String,
    pub metric_name: String,
    pub operator: String,
    pub threshold: f64,
    pub eval_periods: u32,
    pub period: u32,
    pub time: String,
    pub old_state: String,
    pub new_state: String,
    pub reason: String,
    pub region: String,
    /// The alarm name, percent-encoded for use in links.
    pub quoted_alarm_name: String,
}

/// A chat message card, optionally sent to a specific webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardPayload {
    pub body: MessageCard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// An Office 365 connector `MessageCard`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: String,
    #[serde(rename = "@context")]
    pub context: String,
    pub summary: String,
    pub title: String,
    #[serde(rename = "themeColor")]
    pub theme_color: String,
    pub sections: Vec<CardSection>,
    #[serde(rename = "potentialAction")]
    pub potential_action: Vec<CardAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardSection {
    pub title: String,
    pub text: String,
    pub facts: Vec<CardFact>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardFact {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardAction {
    #[serde(rename = "@type")]
    pub action_type: String,
    pub name: String,
    pub targets: Vec<ActionTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionTarget {
    pub os: String,
    pub uri: String,
}
