//! Atomic JSON file writer
//!
//! Every output file is serialized into a temporary file next to its
//! destination and renamed into place, so readers never see a half-written
//! file.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while writing output files
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: String,
        source: serde_json::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

impl OutputError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Layout of a written JSON file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStyle {
    /// Single line, no whitespace
    Compact,

    /// Four-space indentation
    Indented,
}

/// Serializes `value` to `path`, replacing any existing file atomically
///
/// Missing parent directories are created.
///
/// # Arguments
///
/// * `path` - Destination file
/// * `value` - The value to serialize
/// * `style` - Compact or four-space indented
pub fn write_json_atomic<T>(path: &Path, value: &T, style: JsonStyle) -> OutputResult<()>
where
    T: Serialize + ?Sized,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;

    let temp = NamedTempFile::new_in(parent).map_err(|e| OutputError::io(parent, e))?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        let serialized = match style {
            JsonStyle::Compact => serde_json::to_writer(&mut writer, value),
            JsonStyle::Indented => {
                let formatter = PrettyFormatter::with_indent(b"    ");
                let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
                value.serialize(&mut serializer)
            }
        };
        serialized.map_err(|source| OutputError::Serialize {
            path: path.display().to_string(),
            source,
        })?;
        writer.flush().map_err(|e| OutputError::io(path, e))?;
    }

    temp.persist(path)
        .map_err(|e| OutputError::io(path, e.error))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}
