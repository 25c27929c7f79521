// HTTP client for the access-control service

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{AuthRequest, AuthResult, CallEvent, TriggerResult};
use crate::config::CallboxConfig;
use crate::errors::{CallboxError, Result};

pub const TRIGGER_ENDPOINT: &str = "callbox_trigger";
pub const AUTH_ENDPOINT: &str = "callbox_auth";

/// Header carrying the static service credential
pub const SERVICE_KEY_HEADER: &str = "x-api-key";

/// Client for the two access-control endpoints.
///
/// No timeout and no retry: the telephony provider bounds the whole
/// webhook, and a failed trigger goes straight to the fallback number.
#[derive(Debug, Clone)]
pub struct AccessClient {
    client: Client,
    trigger_url: String,
    auth_url: String,
    service_key: String,
}

impl AccessClient {
    pub fn new(config: &CallboxConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("callbox/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CallboxError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &CallboxConfig) -> Self {
        Self {
            client,
            trigger_url: config.endpoint(TRIGGER_ENDPOINT),
            auth_url: config.endpoint(AUTH_ENDPOINT),
            service_key: config.service_key.clone(),
        }
    }

    /// Announce a new call and fetch what the callbox should do with it
    pub async fn trigger(&self, event: &CallEvent) -> Result<TriggerResult> {
        self.post(TRIGGER_ENDPOINT, &self.trigger_url, event).await
    }

    /// Ask whether `code` opens the door
    pub async fn authorize(&self, code: &str) -> Result<AuthResult> {
        self.post(AUTH_ENDPOINT, &self.auth_url, &AuthRequest { code })
            .await
    }

    async fn post<B, T>(&self, endpoint: &'static str, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(endpoint, "Calling access-control service");

        let response = self
            .client
            .post(url)
            .header(SERVICE_KEY_HEADER, &self.service_key)
            .json(body)
            .send()
            .await
            .map_err(|source| CallboxError::Transport { endpoint, source })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| CallboxError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(CallboxError::Backend {
                endpoint,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| CallboxError::Decode { endpoint, source })
    }
}
