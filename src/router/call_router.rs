// Callbox call flow

use serde_json::json;

use super::decision::{CallOutcome, CallPhase};
use crate::access::{AccessClient, AuthResult, CallEvent, Grant};
use crate::config::CallboxConfig;
use crate::errors::{CallboxError, Result};
use crate::reporting::{ErrorReporter, Level};
use crate::voice::VoiceResponse;

pub const GATHER_PROMPT: &str =
    "Please enter your access code, or stay on the line to be connected.";
pub const SINGLE_USE_ANNOUNCEMENT: &str = "Your code has been accepted. Unlocking the door now.";
pub const GENERIC_WELCOME: &str = "Welcome.";
pub const AUTH_UNAVAILABLE: &str =
    "Sorry, we could not check your code right now. Connecting you to someone who can help.";

/// Gather timeouts in seconds. Single-use codes usually belong to guests
/// reading the code off a message, so they get longer.
pub const GATHER_TIMEOUT_SECS: u32 = 10;
pub const SINGLE_USE_GATHER_TIMEOUT_SECS: u32 = 20;

/// Pause before the unlock tone so the door controller hears it cleanly
pub const UNLOCK_PAUSE_SECS: u32 = 1;

/// The voice response for one webhook invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedCall {
    pub outcome: CallOutcome,
    pub response: VoiceResponse,
}

impl RoutedCall {
    fn new(outcome: CallOutcome, response: VoiceResponse) -> Self {
        Self { outcome, response }
    }
}

/// Decides the next voice action for a call event.
///
/// Holds no per-call state; one instance serves every request.
#[derive(Debug, Clone)]
pub struct CallRouter {
    access: AccessClient,
    reporter: ErrorReporter,
    fallback_number: String,
    entry_point: String,
    directions: String,
    unlock_digits: String,
}

impl CallRouter {
    pub fn new(config: &CallboxConfig, access: AccessClient, reporter: ErrorReporter) -> Self {
        Self {
            access,
            reporter,
            fallback_number: config.fallback_number.clone(),
            entry_point: config.webhook_path.clone(),
            directions: config.directions.clone(),
            unlock_digits: config.unlock_digits.clone(),
        }
    }

    /// Build a router with the HTTP clients derived from `config`
    pub fn from_config(config: &CallboxConfig) -> Result<Self> {
        let access = AccessClient::new(config)?;
        let reporter = ErrorReporter::new(config.error_report_url.clone())?;
        Ok(Self::new(config, access, reporter))
    }

    /// Route a call event to exactly one access-control endpoint
    pub async fn route(&self, event: &CallEvent) -> RoutedCall {
        let phase = CallPhase::of(event);
        let routed = match &phase {
            CallPhase::Initial => self.trigger_initial_call(event).await,
            CallPhase::Authenticating { code } => self.verify_authorization(event, code).await,
        };

        tracing::info!(
            phase = phase.as_str(),
            outcome = routed.outcome.as_str(),
            called = %event.to,
            "Call routed"
        );

        routed
    }

    /// First leg of a call: prompt for a code, fall through to the
    /// resident's forwarding target.
    pub async fn trigger_initial_call(&self, event: &CallEvent) -> RoutedCall {
        match self.prompt_for_code(event).await {
            Ok(response) => RoutedCall::new(CallOutcome::Prompted, response),
            Err(err) => {
                let payload = serde_json::to_value(event).unwrap_or_else(|_| json!({}));
                self.reporter
                    .report_fatal(err.kind(), &err, json!({ "event": payload }))
                    .await;
                RoutedCall::new(CallOutcome::Fallback, self.fallback())
            }
        }
    }

    async fn prompt_for_code(&self, event: &CallEvent) -> Result<VoiceResponse> {
        let trigger = self.access.trigger(event).await?;

        let target = trigger.forwarding_target(&event.to).ok_or_else(|| {
            CallboxError::MissingForwardingTarget {
                called: event.to.clone(),
            }
        })?;

        let timeout = if trigger.has_single_use_codes() {
            SINGLE_USE_GATHER_TIMEOUT_SECS
        } else {
            GATHER_TIMEOUT_SECS
        };

        tracing::debug!(
            digits = trigger.digits,
            timeout,
            codes = trigger.num_codes,
            single_use = trigger.num_single_use_codes,
            target = %target.name,
            "Prompting for access code"
        );

        Ok(VoiceResponse::new()
            .gather(trigger.digits, timeout, GATHER_PROMPT)
            .say(format!("Connecting you to {}.", target.name))
            .dial(target.phone_number.as_str()))
    }

    /// Second leg: the caller typed `code`
    pub async fn verify_authorization(&self, event: &CallEvent, code: &str) -> RoutedCall {
        match self.access.authorize(code).await {
            Ok(AuthResult::Denied) => RoutedCall::new(
                CallOutcome::Denied,
                VoiceResponse::new()
                    .say(format!("The code {} is invalid.", spell_digits(code)))
                    .redirect(self.entry_point.as_str()),
            ),
            Ok(AuthResult::Granted(grant)) => {
                RoutedCall::new(CallOutcome::Unlocked, self.unlock(&grant))
            }
            Err(err) => {
                // Never echo the entered code into reports
                let extra = json!({ "from": event.from, "to": event.to });
                self.reporter
                    .report(Level::Error, err.kind(), &err, extra)
                    .await;
                RoutedCall::new(
                    CallOutcome::Fallback,
                    VoiceResponse::new()
                        .say(AUTH_UNAVAILABLE)
                        .dial(self.fallback_number.as_str()),
                )
            }
        }
    }

    fn unlock(&self, grant: &Grant) -> VoiceResponse {
        let response = if grant.is_single_use {
            VoiceResponse::new()
                .say(SINGLE_USE_ANNOUNCEMENT)
                .say(self.directions.as_str())
        } else {
            let welcome = match grant.name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => format!("Welcome {name}."),
                _ => GENERIC_WELCOME.to_string(),
            };
            let response = VoiceResponse::new().say(welcome);
            if grant.is_first_visit() {
                response.say(self.directions.as_str())
            } else {
                response
            }
        };

        response
            .pause(UNLOCK_PAUSE_SECS)
            .play_digits(self.unlock_digits.as_str())
    }

    /// Straight to a human, no prompt
    pub fn fallback(&self) -> VoiceResponse {
        VoiceResponse::new().dial(self.fallback_number.as_str())
    }
}

/// "123" -> "1-2-3", so the speech engine reads digits instead of a number
pub fn spell_digits(code: &str) -> String {
    code.chars()
        .map(String::from)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spell_digits() {
        assert_eq!(spell_digits("12"), "1-2");
        assert_eq!(spell_digits("7"), "7");
        assert_eq!(spell_digits(""), "");
    }

    fn router() -> CallRouter {
        let mut config = CallboxConfig::new("http://127.0.0.1:9", "key", "+15550009999");
        config.directions = "Fourth floor.".to_string();
        let access = AccessClient::new(&config).unwrap();
        CallRouter::new(&config, access, ErrorReporter::disabled())
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_route_future_is_send() {
        let router = router();
        let event = CallEvent::new("+15550003333", "+15550001111");
        // Handlers run on a multi-threaded runtime
        let future = router.route(&event);
        assert_send(&future);
    }

    #[test]
    fn test_fallback_only_dials() {
        let response = router().fallback();
        assert_eq!(response.dialed(), vec!["+15550009999"]);
        assert!(!response.has_gather());
    }

    #[test]
    fn test_returning_named_visitor_skips_directions() {
        let grant = Grant {
            name: Some("Sam".to_string()),
            visit_number: 2,
            is_single_use: false,
            last_visit: None,
        };
        let response = router().unlock(&grant);
        assert_eq!(response.spoken(), vec!["Welcome Sam."]);
    }
}
