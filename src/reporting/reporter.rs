// Fatal error reporting with a bounded flush

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::errors::{CallboxError, Result};

/// Longest we hold a caller on the line waiting for a report to go out
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Fatal,
}

/// Event posted to the error-reporting endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    /// Short error label, e.g. `backend_status`
    pub kind: String,
    pub message: String,
    /// The call payload being handled when the error happened
    pub extra: serde_json::Value,
}

/// Sends error events to an HTTP collector.
///
/// Reporting never fails the call: send errors and timeouts are logged and
/// swallowed.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    collector: Option<Collector>,
    flush_timeout: Duration,
}

#[derive(Debug, Clone)]
struct Collector {
    client: Client,
    endpoint: String,
}

impl ErrorReporter {
    pub fn new(endpoint: Option<String>) -> Result<Self> {
        let collector = match endpoint {
            Some(endpoint) => {
                let client = Client::builder()
                    .user_agent(concat!("callbox/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .map_err(|e| {
                        CallboxError::Config(format!("failed to create reporting client: {e}"))
                    })?;
                Some(Collector { client, endpoint })
            }
            None => None,
        };

        Ok(Self {
            collector,
            flush_timeout: FLUSH_TIMEOUT,
        })
    }

    /// Reporter that only logs
    pub fn disabled() -> Self {
        Self {
            collector: None,
            flush_timeout: FLUSH_TIMEOUT,
        }
    }

    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    /// Report a fatal error and wait (bounded) until it has been delivered.
    /// Returns whether the collector acknowledged the event.
    pub async fn report_fatal(
        &self,
        kind: &str,
        error: &(dyn std::fmt::Display + Send + Sync),
        extra: serde_json::Value,
    ) -> bool {
        self.report(Level::Fatal, kind, error, extra).await
    }

    pub async fn report(
        &self,
        level: Level,
        kind: &str,
        error: &(dyn std::fmt::Display + Send + Sync),
        extra: serde_json::Value,
    ) -> bool {
        let event = ErrorEvent {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level,
            kind: kind.to_string(),
            message: error.to_string(),
            extra,
        };

        tracing::error!(
            event_id = %event.event_id,
            severity = ?event.level,
            kind = %event.kind,
            error = %event.message,
            "Reporting callbox error"
        );

        self.flush(&event).await
    }

    async fn flush(&self, event: &ErrorEvent) -> bool {
        let Some(collector) = &self.collector else {
            return false;
        };

        let send = collector
            .client
            .post(collector.endpoint.as_str())
            .json(event)
            .send();

        match tokio::time::timeout(self.flush_timeout, send).await {
            Ok(Ok(response)) if response.status().is_success() => true,
            Ok(Ok(response)) => {
                tracing::warn!(
                    event_id = %event.event_id,
                    status = %response.status(),
                    "Error collector rejected report"
                );
                false
            }
            Ok(Err(e)) => {
                tracing::warn!(event_id = %event.event_id, error = %e, "Failed to send error report");
                false
            }
            Err(_) => {
                tracing::warn!(
                    event_id = %event.event_id,
                    timeout_ms = self.flush_timeout.as_millis() as u64,
                    "Error report flush timed out"
                );
                false
            }
        }
    }
}
