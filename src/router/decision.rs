// Call phase decision

use crate::access::CallEvent;

/// Where a call is in the callbox flow.
///
/// The provider posts back to the same webhook after a gather, so the only
/// thing telling the phases apart is whether digits came along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallPhase {
    /// Fresh call: ask the service what to do with it
    Initial,
    /// The caller typed a code
    Authenticating { code: String },
}

impl CallPhase {
    pub fn of(event: &CallEvent) -> Self {
        match event.digits.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => CallPhase::Authenticating {
                code: code.to_string(),
            },
            _ => CallPhase::Initial,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CallPhase::Initial => "initial",
            CallPhase::Authenticating { .. } => "authenticating",
        }
    }
}

/// Outcome of a routed call, for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// Gather prompt issued, forwarding target dialed if nobody types
    Prompted,
    Denied,
    Unlocked,
    /// Backend unusable, fallback number dialed
    Fallback,
}

impl CallOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            CallOutcome::Prompted => "prompted",
            CallOutcome::Denied => "denied",
            CallOutcome::Unlocked => "unlocked",
            CallOutcome::Fallback => "fallback",
        }
    }
}
