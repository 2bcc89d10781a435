//! Process-wide tracing setup.

mod tracing;

pub use tracing::{LogFormat, ParseLogFormatError, init};
