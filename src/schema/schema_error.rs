use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    UnknownType(String),
    Io { path: String, message: String },
    InvalidJson(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnknownType(ty) => write!(f, "Unknown column type '{}'", ty),
            SchemaError::Io { path, message } => write!(f, "Could not read schema file {}: {}", path, message),
            SchemaError::InvalidJson(message) => write!(f, "Invalid schema JSON: {}", message),
        }
    }
}

impl std::error::Error for SchemaError {}
