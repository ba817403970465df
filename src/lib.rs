//! Alarm Router - routes CloudWatch alarm notifications to a notify function
//!
//! This library decodes alarm state-change events delivered through SNS,
//! turns each one into a templated email or a chat card, and hands the
//! result to the downstream notify Lambda.

pub mod config;
pub mod core;
pub mod error;
pub mod formatting;
pub mod notification;
pub mod router;

// Re-export core types for convenience
pub use crate::core::*;
pub use crate::error::RouterError;
pub use crate::router::{AlarmRouter, NamespaceRoute};
