// Wire types exchanged with the access-control service

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// An inbound call event as posted by the telephony provider.
///
/// Field names follow the provider's webhook parameters so the event can be
/// forwarded verbatim to the trigger endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEvent {
    /// Caller number
    #[serde(rename = "From")]
    pub from: String,

    /// Called number (the callbox line)
    #[serde(rename = "To")]
    pub to: String,

    /// Digits entered during a previous gather, if any
    #[serde(rename = "Digits", default, skip_serializing_if = "Option::is_none")]
    pub digits: Option<String>,

    #[serde(rename = "AccountSid", default, skip_serializing_if = "Option::is_none")]
    pub account_sid: Option<String>,

    /// Remaining provider parameters (CallSid, CallStatus, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl CallEvent {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            digits: None,
            account_sid: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_digits(mut self, digits: impl Into<String>) -> Self {
        self.digits = Some(digits.into());
        self
    }

    /// Build an event from raw webhook parameters. Missing `From`/`To`
    /// become empty strings; the provider always sends both.
    pub fn from_params(mut params: BTreeMap<String, String>) -> Self {
        let from = params.remove("From").unwrap_or_default();
        let to = params.remove("To").unwrap_or_default();
        let digits = params.remove("Digits");
        let account_sid = params.remove("AccountSid");
        Self {
            from,
            to,
            digits,
            account_sid,
            extra: params,
        }
    }
}

/// Who to dial when the visitor does not enter a code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingTarget {
    pub name: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
}

/// Response of `POST /callbox_trigger`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResult {
    /// Current unlock code (never spoken). Kept opaque; the service may
    /// send it as a string or a number.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    /// Called number -> who answers that line
    pub forwarding_targets: HashMap<String, ForwardingTarget>,
    /// Expected length of an access code
    pub digits: u32,
    #[serde(default)]
    pub num_codes: u32,
    #[serde(default)]
    pub num_single_use_codes: u32,
}

impl TriggerResult {
    pub fn forwarding_target(&self, called: &str) -> Option<&ForwardingTarget> {
        self.forwarding_targets.get(called)
    }

    pub fn has_single_use_codes(&self) -> bool {
        self.num_single_use_codes > 0
    }
}

/// Body of `POST /callbox_auth`
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest<'a> {
    pub code: &'a str,
}

/// Response of `POST /callbox_auth`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AuthResult {
    Denied,
    Granted(Grant),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    #[serde(default)]
    pub name: Option<String>,
    /// 1 on the visitor's first recorded visit
    #[serde(default)]
    pub visit_number: u32,
    #[serde(default)]
    pub is_single_use: bool,
    /// Informational only; timestamp string or epoch millis
    #[serde(default)]
    pub last_visit: Option<serde_json::Value>,
}

impl Grant {
    pub fn is_first_visit(&self) -> bool {
        self.visit_number == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trigger_result_parses_service_payload() {
        let body = json!({
            "code": "4821",
            "forwardingTargets": {
                "+15550001111": { "name": "Front desk", "phoneNumber": "+15550002222" }
            },
            "digits": 4,
            "numCodes": 3,
            "numSingleUseCodes": 1
        });
        let result: TriggerResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.digits, 4);
        assert!(result.has_single_use_codes());
        assert_eq!(
            result.forwarding_target("+15550001111").unwrap().phone_number,
            "+15550002222"
        );
        assert!(result.forwarding_target("+15559999999").is_none());
    }

    #[test]
    fn test_auth_result_variants() {
        let denied: AuthResult = serde_json::from_value(json!({ "status": "denied" })).unwrap();
        assert_eq!(denied, AuthResult::Denied);

        let granted: AuthResult = serde_json::from_value(json!({
            "status": "granted",
            "name": null,
            "visitNumber": 1,
            "isSingleUse": false,
            "lastVisit": "2026-10-01T12:00:00Z"
        }))
        .unwrap();
        match granted {
            AuthResult::Granted(grant) => {
                assert!(grant.name.is_none());
                assert!(grant.is_first_visit());
                assert!(!grant.is_single_use);
            }
            AuthResult::Denied => panic!("expected grant"),
        }
    }

    #[test]
    fn test_opaque_fields_accept_any_shape() {
        let granted: AuthResult = serde_json::from_value(json!({
            "status": "granted",
            "name": "Sam",
            "visitNumber": 2,
            "isSingleUse": false,
            "lastVisit": 1760000000000u64
        }))
        .unwrap();
        match granted {
            AuthResult::Granted(grant) => {
                assert_eq!(grant.last_visit, Some(json!(1760000000000u64)));
            }
            AuthResult::Denied => panic!("expected grant"),
        }

        let trigger: TriggerResult = serde_json::from_value(json!({
            "code": 4821,
            "forwardingTargets": {},
            "digits": 4
        }))
        .unwrap();
        assert_eq!(trigger.code, Some(json!(4821)));
    }

    #[test]
    fn test_unknown_status_is_an_error() {
        let parsed = serde_json::from_value::<AuthResult>(json!({ "status": "maybe" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_call_event_keeps_provider_parameters() {
        let mut event = CallEvent::new("+15550003333", "+15550001111");
        event.extra.insert("CallSid".to_string(), "CA42".to_string());

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["From"], "+15550003333");
        assert_eq!(value["CallSid"], "CA42");
        assert!(value.get("Digits").is_none());
    }
}
