//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Brokerage error: {0}")]
    Broker(#[from] alertbridge_broker::BrokerError),

    #[error("Executor error: {0}")]
    Executor(#[from] alertbridge_executor::ExecutorError),

    #[error("Intake error: {0}")]
    Intake(#[from] alertbridge_intake::IntakeError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] alertbridge_telemetry::TelemetryError),

    #[error("Server task failed: {0}")]
    Server(String),
}

pub type AppResult<T> = Result<T, AppError>;
