// Callbox - Apartment callbox webhook
// Library exports

pub mod access; // Access-control service client
pub mod config;
pub mod errors;
pub mod reporting;
pub mod router; // Call flow decisions
pub mod server; // HTTP webhook server
pub mod voice; // Voice markup
