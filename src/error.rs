use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagfigError {
    #[error("Invalid type: {0}")]
    Shape(#[from] ShapeError),

    #[error("Failed to load config file {path}: {source}")]
    ConfigLoad { path: PathBuf, source: LoadError },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl TagfigError {
    /// True for errors raised by the shape guard or the field-kind check.
    pub fn is_shape(&self) -> bool {
        matches!(self, TagfigError::Shape(_))
    }

    /// The required-field violations, if this is a validation failure.
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            TagfigError::Validation(err) => Some(&err.violations),
            _ => None,
        }
    }
}

/// The target value does not have the shape the binder works on: a struct
/// whose fields all serialize as strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("must be a mutable reference to a struct")]
    NotAStruct,

    #[error("field '{field}' must be a string, found {kind}")]
    UnsupportedField { field: String, kind: &'static str },

    #[error("tag declared for unknown field '{0}'")]
    UnknownTaggedField(String),

    #[error("{0}")]
    Custom(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found")]
    NotFound,

    #[error(transparent)]
    Io(std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[cfg(feature = "json")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format '{0}'")]
    UnsupportedFormat(String),

    #[error("value for '{key}' must be a scalar, found {kind}")]
    UnsupportedValue { key: String, kind: &'static str },

    #[error("{}", format_unknown_keys(.0))]
    UnknownKeys(Vec<UnknownKey>),
}

/// A key present in a config file that matches no field (strict mode only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey {
    pub key: String,
    /// 1-indexed; 0 when the line could not be located.
    pub line: usize,
}

fn format_unknown_keys(keys: &[UnknownKey]) -> String {
    let parts: Vec<String> = keys
        .iter()
        .map(|k| format!("unknown key '{}' (line {})", k.key, k.line))
        .collect();
    parts.join(", ")
}

/// Every required field that resolved to an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: missing required values:")?;
        for violation in &self.violations {
            write!(f, "\n{violation}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub reason: ViolationReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationReason {
    /// Required but empty. Strings have no separate absent state.
    NotSet,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            ViolationReason::NotSet => write!(f, "{} not set", self.field),
        }
    }
}
