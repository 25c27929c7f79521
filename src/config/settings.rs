// Configuration structs

use serde::Deserialize;

use crate::errors::{CallboxError, Result};

/// Runtime configuration for the callbox service.
///
/// Injected into the router and server; nothing below `main` reads the
/// process environment.
#[derive(Debug, Clone, Deserialize)]
pub struct CallboxConfig {
    /// Base URL of the access-control service (no trailing slash needed)
    pub service_url: String,

    /// Static credential sent on every access-control request
    pub service_key: String,

    /// Number dialed whenever the backend cannot be trusted
    pub fallback_number: String,

    /// Endpoint that receives fatal error reports
    #[serde(default)]
    pub error_report_url: Option<String>,

    /// Telephony provider credentials, used to validate inbound webhooks
    #[serde(default)]
    pub provider: ProviderCredentials,

    /// Externally visible base URL (scheme + host) of this service
    #[serde(default)]
    pub public_url: Option<String>,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Path of the webhook; also the target of denial redirects
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// Unit/floor directions spoken to first-time and single-use visitors
    #[serde(default = "default_directions")]
    pub directions: String,

    /// DTMF digits that make the door controller release the lock
    #[serde(default = "default_unlock_digits")]
    pub unlock_digits: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderCredentials {
    #[serde(default)]
    pub account_sid: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_webhook_path() -> String {
    "/callbox".to_string()
}

fn default_directions() -> String {
    "Take the elevator to the fourth floor. The unit is the second door on the left.".to_string()
}

fn default_unlock_digits() -> String {
    "9".to_string()
}

impl CallboxConfig {
    pub fn new(
        service_url: impl Into<String>,
        service_key: impl Into<String>,
        fallback_number: impl Into<String>,
    ) -> Self {
        Self {
            service_url: service_url.into(),
            service_key: service_key.into(),
            fallback_number: fallback_number.into(),
            error_report_url: None,
            provider: ProviderCredentials::default(),
            public_url: None,
            bind_address: default_bind_address(),
            webhook_path: default_webhook_path(),
            directions: default_directions(),
            unlock_digits: default_unlock_digits(),
        }
    }

    /// Check values that deserialization alone cannot
    pub fn validate(&self) -> Result<()> {
        if self.service_url.trim().is_empty() {
            return Err(CallboxError::Config("service_url is empty".to_string()));
        }
        if !self.service_url.starts_with("http://") && !self.service_url.starts_with("https://") {
            return Err(CallboxError::Config(format!(
                "service_url must be an http(s) URL, got {}",
                self.service_url
            )));
        }
        if self.service_key.is_empty() {
            return Err(CallboxError::Config("service_key is empty".to_string()));
        }
        if self.fallback_number.trim().is_empty() {
            return Err(CallboxError::Config("fallback_number is empty".to_string()));
        }
        if !self.webhook_path.starts_with('/') {
            return Err(CallboxError::Config(format!(
                "webhook_path must start with '/', got {}",
                self.webhook_path
            )));
        }
        if self.unlock_digits.is_empty()
            || !self
                .unlock_digits
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '*' | '#' | 'w'))
        {
            return Err(CallboxError::Config(format!(
                "unlock_digits must be DTMF characters, got {:?}",
                self.unlock_digits
            )));
        }
        if self.provider.auth_token.is_some() && self.public_url.is_none() {
            return Err(CallboxError::Config(
                "public_url is required to validate provider signatures".to_string(),
            ));
        }
        Ok(())
    }

    /// Signature validation is on only when both the token and the public
    /// URL it signs against are known.
    pub fn signature_validation_enabled(&self) -> bool {
        self.provider.auth_token.is_some() && self.public_url.is_some()
    }

    /// Service URL joined with an endpoint name
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.service_url.trim_end_matches('/'), name)
    }
}
