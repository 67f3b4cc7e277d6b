//! CLI error types
//!
//! All CLI errors are FATAL: the command prints the error and exits
//! non-zero.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::partition::PartitionError;
use crate::routing::RoutingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Request is not valid JSON or has the wrong shape
    InvalidRequest,
    /// The selector rejected the request
    SelectionFailed,
    /// Unknown partition scheme name
    UnknownScheme,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "POLY_CLI_CONFIG_ERROR",
            Self::IoError => "POLY_CLI_IO_ERROR",
            Self::InvalidRequest => "POLY_CLI_INVALID_REQUEST",
            Self::SelectionFailed => "POLY_CLI_SELECTION_FAILED",
            Self::UnknownScheme => "POLY_CLI_UNKNOWN_SCHEME",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidRequest, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_request(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::ConfigError, e.to_string())
    }
}

impl From<RoutingError> for CliError {
    fn from(e: RoutingError) -> Self {
        Self::new(CliErrorCode::SelectionFailed, e.to_string())
    }
}

impl From<PartitionError> for CliError {
    fn from(e: PartitionError) -> Self {
        Self::new(CliErrorCode::UnknownScheme, e.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
