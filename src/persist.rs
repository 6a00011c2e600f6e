//! Document persistence: JSON text in, JSON text out.
//!
//! The pure half ([`parse_document`], [`render_document`]) converts between
//! text and a document mapping. The I/O half ([`read_text`], [`read_document`],
//! [`write_document`]) adds the file system: a missing file reads as `None`,
//! and writes go to a temporary file in the target directory that is then
//! renamed over the target, so readers never see a half-written document.
//! Parent directories are created as needed.

use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::CfgTreeError;

/// Pure function: parse `content` as a document. The top level must be an object.
pub fn parse_document(content: &str, path: &Path) -> Result<Map<String, Value>, CfgTreeError> {
    let value: Value = serde_json::from_str(content).map_err(|source| CfgTreeError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CfgTreeError::NotAnObject(format!(
            "{} (found {})",
            path.display(),
            crate::value::describe(&other)
        ))),
    }
}

/// Pure function: render a document as pretty JSON with four-space indentation
/// and a trailing newline.
pub fn render_document(doc: &Map<String, Value>) -> Result<String, CfgTreeError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    doc.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// I/O wrapper: read the text of the file at `path`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_text(path: &Path) -> Result<Option<String>, CfgTreeError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file");
            Ok(None)
        }
        Err(source) => Err(CfgTreeError::IoError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// I/O wrapper: read and parse the document at `path`.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_document(path: &Path) -> Result<Option<Map<String, Value>>, CfgTreeError> {
    read_text(path)?
        .map(|content| parse_document(&content, path))
        .transpose()
}

/// I/O wrapper: render `doc` and atomically replace the file at `path`.
pub fn write_document(path: &Path, doc: &Map<String, Value>) -> Result<(), CfgTreeError> {
    let content = render_document(doc)?;
    let io_err = |source| CfgTreeError::IoError {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|source| CfgTreeError::IoError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(content.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(path = %path.display(), bytes = content.len(), "wrote settings file");
    Ok(())
}
