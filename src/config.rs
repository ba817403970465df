//! Configuration management for the alarm router
//!
//! This module defines the main `Config` struct and its sub-structs. It uses
//! the `figment` crate to load configuration from an `alarm-router.toml` file
//! and merge it with environment variables. Configuration is loaded once per
//! process and never changes afterwards.

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::router::NamespaceRoute;

/// Environment variable naming the TOML file to load.
pub const CONFIG_PATH_ENV: &str = "ALARM_ROUTER_CONFIG";
/// Config file used when `ALARM_ROUTER_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "alarm-router.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level, used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Where notifications are sent.
    pub dispatcher: DispatcherConfig,
    /// How alarms are routed by namespace.
    pub routing: RoutingConfig,
    /// Email recipients per alarm name.
    #[serde(default)]
    pub recipients: RecipientTable,
}

/// Configuration for the downstream notify function.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DispatcherConfig {
    /// Name or ARN of the notify Lambda function.
    pub function_name: String,
    /// Region the notify function lives in.
    pub region: String,
    /// Log payloads instead of invoking the function.
    #[serde(default)]
    pub dry_run: bool,
}

/// Which behaviour applies to alarms from the routed namespace.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// One templated email per configured recipient.
    Email,
    /// The usual card, sent to an override webhook.
    CardOverride,
}

/// Configuration for namespace routing.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RoutingConfig {
    /// The metric namespace that gets special treatment.
    pub namespace: String,
    pub policy: RoutingPolicy,
    /// Email template, required by the `email` policy.
    pub template_id: Option<String>,
    /// Card destination, required by the `card_override` policy.
    pub webhook_url: Option<String>,
}

/// Maps alarm names to comma-separated recipient lists.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct RecipientTable(BTreeMap<String, String>);

impl RecipientTable {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }

    /// Recipients for an alarm, in configured order.
    ///
    /// Names are matched exactly first, then case-insensitively. Returns
    /// `None` when the alarm is absent or its list is blank.
    pub fn recipients_for(&self, alarm_name: &str) -> Option<Vec<String>> {
        let raw = self.0.get(alarm_name).or_else(|| {
            self.0
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(alarm_name))
                .map(|(_, list)| list)
        })?;

        let recipients: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect();

        if recipients.is_empty() {
            None
        } else {
            Some(recipients)
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RecipientTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Config {
    /// Loads the configuration from the file named by `ALARM_ROUTER_CONFIG`.
    pub fn from_env() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(&path)
    }

    /// Loads the application configuration from the specified file.
    ///
    /// # Arguments
    /// * `config_path` - The path to the TOML configuration file.
    pub fn load(config_path: &str) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // The notify function name has always been passed this way.
            .merge(
                Env::raw()
                    .only(&["NOTIFY_LAMBDA_NAME"])
                    .map(|_| "dispatcher.function_name".into()),
            )
            // e.g. ALARM_ROUTER_ROUTING__POLICY=card_override
            .merge(Env::prefixed("ALARM_ROUTER_").split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the selected policy has what it needs.
    pub fn validate(&self) -> Result<()> {
        if !self.dispatcher.dry_run && self.dispatcher.function_name.trim().is_empty() {
            bail!("dispatcher.function_name must be set (or NOTIFY_LAMBDA_NAME)");
        }
        if self.routing.namespace.is_empty() {
            bail!("routing.namespace must not be empty");
        }
        match self.routing.policy {
            RoutingPolicy::Email if self.routing.template_id.is_none() => {
                bail!("routing.template_id is required by the email policy")
            }
            RoutingPolicy::CardOverride if self.routing.webhook_url.is_none() => {
                bail!("routing.webhook_url is required by the card_override policy")
            }
            _ => Ok(()),
        }
    }

    /// The route for alarms in the configured namespace.
    pub fn route(&self) -> Result<NamespaceRoute> {
        self.validate()?;
        let route = match self.routing.policy {
            RoutingPolicy::Email => NamespaceRoute::Email {
                template_id: self.routing.template_id.clone().unwrap_or_default(),
                recipients: self.recipients.clone(),
            },
            RoutingPolicy::CardOverride => NamespaceRoute::CardOverride {
                webhook_url: self.routing.webhook_url.clone().unwrap_or_default(),
            },
        };
        Ok(route)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            dispatcher: DispatcherConfig {
                function_name: String::new(),
                region: "eu-west-1".to_string(),
                dry_run: false,
            },
            routing: RoutingConfig {
                namespace: "ETL".to_string(),
                policy: RoutingPolicy::Email,
                template_id: None,
                webhook_url: None,
            },
            recipients: RecipientTable::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipients_are_trimmed_and_ordered() {
        let table: RecipientTable = [("MyAlarm", "a@x.com, b@x.com ,c@x.com")].into_iter().collect();
        assert_eq!(
            table.recipients_for("MyAlarm").unwrap(),
            vec!["a@x.com", "b@x.com", "c@x.com"]
        );
    }

    #[test]
    fn test_recipient_lookup_ignores_case() {
        let table: RecipientTable = [("nightly-load", "ops@x.com")].into_iter().collect();
        assert_eq!(table.recipients_for("Nightly-Load").unwrap(), vec!["ops@x.com"]);
        assert!(table.recipients_for("other").is_none());
    }

    #[test]
    fn test_blank_recipient_list_counts_as_missing() {
        let table: RecipientTable = [("MyAlarm", " , ")].into_iter().collect();
        assert!(table.recipients_for("MyAlarm").is_none());
    }

    #[test]
    fn test_email_policy_requires_template() {
        let mut config = Config::default();
        config.dispatcher.function_name = "notify".to_string();
        assert!(config.validate().is_err());

        config.routing.template_id = Some("etl-alarm".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_card_override_requires_webhook() {
        let mut config = Config::default();
        config.dispatcher.function_name = "notify".to_string();
        config.routing.policy = RoutingPolicy::CardOverride;
        assert!(config.validate().is_err());

        config.routing.webhook_url = Some("https://example.com/hook".to_string());
        assert!(matches!(
            config.route().unwrap(),
            NamespaceRoute::CardOverride { webhook_url } if webhook_url == "https://example.com/hook"
        ));
    }

    #[test]
    fn test_dry_run_does_not_need_function_name() {
        let mut config = Config::default();
        config.routing.template_id = Some("etl-alarm".to_string());
        assert!(config.validate().is_err());

        config.dispatcher.dry_run = true;
        assert!(config.validate().is_ok());
    }
}
