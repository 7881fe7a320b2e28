use std::fmt;
use std::fmt::Formatter;
use std::sync::PoisonError;
use thiserror::Error;
use crate::manager_bms::errors::BmsError;

/// Error depicting errors that occur while loading or validating the configuration
///
#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError: {}", self.0)
    }
}
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self { ConfigError(e.to_string()) }
}
impl std::error::Error for ConfigError {}

/// Error depicting errors that occur while setting up the logger
///
#[derive(Error, Debug)]
#[error("LoggingError: {0}")]
pub struct LoggingError(pub String);
impl From<std::io::Error> for LoggingError {
    fn from(e: std::io::Error) -> Self { LoggingError(e.to_string()) }
}
impl From<log::SetLoggerError> for LoggingError {
    fn from(e: log::SetLoggerError) -> Self { LoggingError(e.to_string()) }
}

/// Errors from reading or writing elements of the display document
///
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("no element with id '{0}'")]
    MissingElement(String),
    #[error("document lock poisoned")]
    Poisoned,
}
impl<T> From<PoisonError<T>> for DocumentError {
    fn from(_: PoisonError<T>) -> Self { DocumentError::Poisoned }
}

/// Failure of a single poll, handed to the outcome handler
///
#[derive(Error, Debug)]
pub enum PollError {
    #[error(transparent)]
    Bms(#[from] BmsError),
    #[error("render error: {0}")]
    Document(#[from] DocumentError),
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("document is missing required elements: {}", .0.join(", "))]
    MissingElements(Vec<String>),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Error depicting errors that occur during initialization
///
#[derive(Error, Debug)]
#[error("InitError: {0}")]
pub struct InitError(pub String);
impl From<BmsError> for InitError {
    fn from(e: BmsError) -> Self { InitError(e.to_string()) }
}
impl From<DashboardError> for InitError {
    fn from(e: DashboardError) -> Self { InitError(e.to_string()) }
}

/// Error depicting errors that occur while running the dashboard
///
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("WorkerError::Dashboard: {0}")]
    Dashboard(#[from] DashboardError),
    #[error("WorkerError::Document: {0}")]
    Document(#[from] DocumentError),
    #[error("WorkerError::Io: {0}")]
    Io(#[from] std::io::Error),
}
