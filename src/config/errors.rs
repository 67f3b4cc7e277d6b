//! Configuration errors
//!
//! All configuration errors are FATAL: the engine refuses to start with a
//! configuration it cannot honor.

use std::fmt;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    /// File could not be read
    PolyConfigUnreadable,
    /// File is not valid JSON or has the wrong shape
    PolyConfigInvalidJson,
    /// A value is outside its allowed domain
    PolyConfigInvalidValue,
}

impl ConfigErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigErrorCode::PolyConfigUnreadable => "POLY_CONFIG_UNREADABLE",
            ConfigErrorCode::PolyConfigInvalidJson => "POLY_CONFIG_INVALID_JSON",
            ConfigErrorCode::PolyConfigInvalidValue => "POLY_CONFIG_INVALID_VALUE",
        }
    }
}

impl fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct ConfigError {
    code: ConfigErrorCode,
    message: String,
    source: Option<io::Error>,
}

impl ConfigError {
    pub fn unreadable(path: &str, source: io::Error) -> Self {
        Self {
            code: ConfigErrorCode::PolyConfigUnreadable,
            message: format!("cannot read config file '{}'", path),
            source: Some(source),
        }
    }

    pub fn invalid_json(err: serde_json::Error) -> Self {
        Self {
            code: ConfigErrorCode::PolyConfigInvalidJson,
            message: format!("invalid config JSON: {}", err),
            source: None,
        }
    }

    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self {
            code: ConfigErrorCode::PolyConfigInvalidValue,
            message: format!("{}: {}", field, reason.into()),
            source: None,
        }
    }

    pub fn code(&self) -> ConfigErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
