// Voice markup returned to the telephony provider

mod response;

pub use response::{Verb, VoiceResponse};
