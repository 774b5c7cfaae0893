use rusqlite::Error as RusqliteError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyMapperError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// The store rejected a statement.
    #[error("Database error: {0}")]
    ExecutionError(#[from] RusqliteError),

    /// Stored JSON doesn't match the shape expected for its schema version.
    #[error("Malformed {column} in keymap {row_id}: {source}")]
    ParseError {
        row_id: i64,
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot transform keymap {row_id}: {message}")]
    TransformationError { row_id: i64, message: String },

    #[error("Invalid schema version request: {0}")]
    VersionOrderError(String),

    #[error("Migration {from} → {to} failed: {source}")]
    MigrationError {
        from: u32,
        to: u32,
        #[source]
        source: Box<KeyMapperError>,
    },

    #[error("Error: {0}")]
    Error(String), // Allows custom application errors
}

impl KeyMapperError {
    pub fn parse(row_id: i64, column: &'static str, source: serde_json::Error) -> Self {
        KeyMapperError::ParseError {
            row_id,
            column,
            source,
        }
    }

    pub fn transformation(row_id: i64, message: impl Into<String>) -> Self {
        KeyMapperError::TransformationError {
            row_id,
            message: message.into(),
        }
    }

    /// The innermost cause, looking through `MigrationError` wrappers.
    pub fn root_cause(&self) -> &KeyMapperError {
        match self {
            KeyMapperError::MigrationError { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
