//! Bootstrap layer — modules that run before the service starts.
//!
//! - **logger** — tracing-subscriber initialisation.
//! - **service** — config source, event sink and provider assembly.

pub mod logger;
pub mod service;
