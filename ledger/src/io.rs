//! JSON file I/O shared by every on-disk format.
//!
//! Reads fail closed: a missing file and a malformed file are distinct,
//! terminal [`InputError`]s. Writes are pretty-printed UTF-8 with a trailing
//! newline; they are for humans and never hashed.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Error reading or writing a ledger file.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },
    /// The file exists but could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON.
    #[error("invalid JSON in file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The JSON is valid but has the wrong top-level shape.
    #[error("unexpected structure in {}: {detail}", path.display())]
    Shape { path: PathBuf, detail: String },
}

/// Read and parse a JSON file.
///
/// # Errors
///
/// Returns [`InputError::NotFound`], [`InputError::Io`] or [`InputError::Malformed`].
pub fn load_json_file(path: &Path) -> Result<Value, InputError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            InputError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            InputError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_slice(&bytes).map_err(|source| InputError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a JSON file whose top level must be an array.
///
/// # Errors
///
/// Returns [`InputError::Shape`] if the top level is not an array, plus
/// everything [`load_json_file`] returns.
pub fn load_json_array(path: &Path) -> Result<Vec<Value>, InputError> {
    match load_json_file(path)? {
        Value::Array(items) => Ok(items),
        _ => Err(InputError::Shape {
            path: path.to_path_buf(),
            detail: "expected a JSON array of entries".to_string(),
        }),
    }
}

/// Write `value` as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Returns [`InputError::Io`] on write failure.
pub fn write_json_pretty(path: &Path, value: &Value) -> Result<(), InputError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| InputError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');
    write_text(path, &text)
}

/// Write a UTF-8 text file.
///
/// # Errors
///
/// Returns [`InputError::Io`] on write failure.
pub fn write_text(path: &Path, text: &str) -> Result<(), InputError> {
    std::fs::write(path, text).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
