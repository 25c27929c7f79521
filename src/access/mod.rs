// Access-control service client module
// Public interface for the trigger and auth endpoints

mod client;
mod types;

pub use client::{AccessClient, AUTH_ENDPOINT, SERVICE_KEY_HEADER, TRIGGER_ENDPOINT};
pub use types::{AuthRequest, AuthResult, CallEvent, ForwardingTarget, Grant, TriggerResult};
