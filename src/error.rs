use serde::Serialize;
use thiserror::Error;

/// Structured error type for command handling. Every variant that can occur while
/// dispatching a call is turned into a failed `DispatchResult`; nothing here is
/// allowed to escape a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "code", content = "detail")]
pub enum AppError {
    #[error("unknown operation {name}")]
    UnknownOperation { name: String },

    #[error("invalid parameters for {operation}: {message}")]
    InvalidParameters { operation: String, message: String },

    #[error("invalid {field} '{value}' (expected one of: {})", allowed.join(", "))]
    InvalidValue {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{message}")]
    InvalidState { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("settings error: {message}")]
    Settings { message: String },
}

impl AppError {
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        AppError::UnknownOperation { name: name.into() }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        AppError::InvalidState {
            message: message.into(),
        }
    }

    /// Short machine-readable code, mirrors the serde tag.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::UnknownOperation { .. } => "UnknownOperation",
            AppError::InvalidParameters { .. } => "InvalidParameters",
            AppError::InvalidValue { .. } => "InvalidValue",
            AppError::InvalidState { .. } => "InvalidState",
            AppError::Io { .. } => "Io",
            AppError::Settings { .. } => "Settings",
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Settings {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_operation_message() {
        let err = AppError::unknown_operation("fly_to_moon");
        assert_eq!(err.to_string(), "unknown operation fly_to_moon");
    }

    #[test]
    fn invalid_value_lists_allowed() {
        let err = AppError::InvalidValue {
            field: "speed".into(),
            value: "ultra".into(),
            allowed: vec!["low".into(), "high".into()],
        };
        assert_eq!(
            err.to_string(),
            "invalid speed 'ultra' (expected one of: low, high)"
        );
        assert_eq!(err.code(), "InvalidValue");
    }
}
