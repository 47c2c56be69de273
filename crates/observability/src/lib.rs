//! `inkwell-observability` — process-wide logging setup shared by every binary.

pub mod tracing;

pub use self::tracing::{DEFAULT_FILTER, LogFormat, init};
