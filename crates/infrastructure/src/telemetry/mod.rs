//! Logging infrastructure

mod logging;

pub use logging::{TelemetryError, build_filter, init_tracing};
