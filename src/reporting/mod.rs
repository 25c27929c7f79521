// Error reporting module

mod reporter;

pub use reporter::{ErrorEvent, ErrorReporter, Level, FLUSH_TIMEOUT};
