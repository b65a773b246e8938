//! Application-wide error types.
//!
//! Startup and process-level failures only. Request-scoped failures have
//! their own enums next to the code that raises them (`AiConfigError`,
//! `ProviderError`, `GenerateError`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("startup error: {0}")]
    Startup(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().contains("missing field"));
        assert!(e.to_string().starts_with("config error"));
    }

    #[test]
    fn logger_error_display() {
        let e = AppError::Logger("already initialized".into());
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn server_error_display() {
        let e = AppError::Server("bind failed on 0.0.0.0:8000".into());
        assert!(e.to_string().contains("0.0.0.0:8000"));
    }

    #[test]
    fn startup_error_is_std_error() {
        let e = AppError::Startup("LLM providers: bad header".into());
        let _: &dyn Error = &e;
        assert!(e.to_string().starts_with("startup error"));
    }
}
