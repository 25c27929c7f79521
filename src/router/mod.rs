// Router module
// Public interface for call routing

mod call_router;
mod decision;

pub use call_router::{
    spell_digits, CallRouter, RoutedCall, AUTH_UNAVAILABLE, GATHER_PROMPT,
    GATHER_TIMEOUT_SECS, GENERIC_WELCOME, SINGLE_USE_ANNOUNCEMENT,
    SINGLE_USE_GATHER_TIMEOUT_SECS, UNLOCK_PAUSE_SECS,
};
pub use decision::{CallOutcome, CallPhase};
