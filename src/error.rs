use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CfgTreeError {
    #[error("Duplicate name '{name}' under '{parent}'")]
    DuplicateName { parent: String, name: String },

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Category '{0}' is not registered in this schema")]
    UnregisteredCategory(String),

    #[error("Invalid default for '{key}': {reason}")]
    InvalidDefault { key: String, reason: String },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Expected a JSON object at the top level of {0}")]
    NotAnObject(String),

    #[error("Failed to access {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Type mismatch for '{key}': expected {expected}, found {actual}")]
    TypeMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Invalid values in configuration: {}", join_keys(.0))]
    InvalidValues(Vec<CfgTreeError>),

    #[error("No config file known yet (call .file_path() on the builder or load() a file first)")]
    NoConfigFile,

    #[error("App name is required when no file path is given (call .app_name() on the builder)")]
    AppNameRequired,
}

fn join_keys(errors: &[CfgTreeError]) -> String {
    errors
        .iter()
        .map(|e| match e {
            CfgTreeError::InvalidValue { key, .. } => key.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_formats_correctly() {
        let err = CfgTreeError::DuplicateName {
            parent: "main.".into(),
            name: "port".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("port"));
        assert!(msg.contains("main."));
    }

    #[test]
    fn key_not_found_formats() {
        let err = CfgTreeError::KeyNotFound("main.logging.level".into());
        assert!(err.to_string().contains("main.logging.level"));
    }

    #[test]
    fn invalid_values_lists_every_key() {
        let err = CfgTreeError::InvalidValues(vec![
            CfgTreeError::InvalidValue {
                key: "main.cacheType".into(),
                reason: "x".into(),
            },
            CfgTreeError::InvalidValue {
                key: "main.logging.consolelevel".into(),
                reason: "y".into(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("main.cacheType, main.logging.consolelevel"));
    }

    #[test]
    fn app_name_required_formats() {
        let err = CfgTreeError::AppNameRequired;
        assert!(err.to_string().contains("app_name"));
    }
}
