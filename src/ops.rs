//! Settings operations: key lookup, listing, setting, export/import and the
//! `ConfigResult` enum that callers use to display results.
//!
//! Provides the logic behind `config list`, `config get`, `config set`,
//! `config export` and `config import`. Keys are dotted setting paths such as
//! `main.logging.consolelevel`.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::error::CfgTreeError;
use crate::overrides::parse_raw;
use crate::persist;
use crate::setting::{AnySetting, SettingHandle};
use crate::store::Store;
use crate::types::ConfigAction;

/// Result of a settings operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// A setting's current value and its documentation lines.
    KeyValue {
        key: String,
        value: String,
        doc: Vec<String>,
    },
    /// Confirmation that a value was stored.
    ValueSet { key: String, value: String },
    /// Every registered setting with its current value.
    Listing { entries: Vec<(String, String)> },
    /// The whole document as pretty-printed JSON.
    Document(String),
    /// Confirmation that the document was written to a file.
    Exported { path: PathBuf },
    /// Confirmation that a document replaced the store.
    Imported { path: PathBuf },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::KeyValue { key, value, doc } => {
                for line in doc {
                    writeln!(f, "# {line}")?;
                }
                write!(f, "{key} = {value}")
            }
            ConfigResult::ValueSet { key, value } => write!(f, "Set {key} = {value}"),
            ConfigResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                Ok(())
            }
            ConfigResult::Document(doc) => write!(f, "{doc}"),
            ConfigResult::Exported { path } => {
                write!(f, "Settings written to {}", path.display())
            }
            ConfigResult::Imported { path } => {
                write!(f, "Settings imported from {}", path.display())
            }
        }
    }
}

/// Dispatch a [`ConfigAction`] against `store`.
pub fn handle(store: &Store, action: &ConfigAction) -> Result<ConfigResult, CfgTreeError> {
    match action {
        ConfigAction::List => Ok(list_values(store)),
        ConfigAction::Get { key } => get_value(store, key),
        ConfigAction::Set { key, value } => set_value(store, key, value),
        ConfigAction::Export { output } => export(store, output.as_deref()),
        ConfigAction::Import { input } => import(store, input),
    }
}

/// Get a setting's value by dotted key, with its title, description and
/// options as documentation lines.
pub fn get_value(store: &Store, key: &str) -> Result<ConfigResult, CfgTreeError> {
    let setting = find(store, key)?;
    let value = setting.get(store)?;
    Ok(ConfigResult::KeyValue {
        key: setting.path(),
        value: format_value(&value),
        doc: doc_lines(setting),
    })
}

/// List every registered setting in schema order. Settings missing from the
/// document (e.g. after an import) show as `<not set>`.
pub fn list_values(store: &Store) -> ConfigResult {
    let entries = store
        .schema()
        .settings()
        .into_iter()
        .map(|setting| {
            let display = match setting.get(store) {
                Ok(value) => format_value(&value),
                Err(_) => "<not set>".to_string(),
            };
            (setting.path(), display)
        })
        .collect();
    ConfigResult::Listing { entries }
}

/// Parse `raw` according to the setting's declared type, store it, and save
/// to the remembered settings file when there is one.
pub fn set_value(store: &Store, key: &str, raw: &str) -> Result<ConfigResult, CfgTreeError> {
    let setting = find(store, key)?;
    let value = parse_raw(setting.def(), raw).map_err(|reason| CfgTreeError::InvalidValue {
        key: setting.path(),
        reason,
    })?;
    setting.set(store, value.clone())?;
    if store.file_path().is_some() {
        store.flush()?;
    }
    info!(key = %setting.path(), "setting updated");
    Ok(ConfigResult::ValueSet {
        key: setting.path(),
        value: format_value(&value),
    })
}

/// Write the whole document to `output`, or return it for printing.
pub fn export(store: &Store, output: Option<&Path>) -> Result<ConfigResult, CfgTreeError> {
    match output {
        Some(path) => {
            store.save(path)?;
            Ok(ConfigResult::Exported {
                path: path.to_path_buf(),
            })
        }
        None => Ok(ConfigResult::Document(persist::render_document(
            &store.persisted(),
        )?)),
    }
}

/// Replace the store with the document in `input` and save it.
pub fn import(store: &Store, input: &Path) -> Result<ConfigResult, CfgTreeError> {
    let doc = persist::read_document(input)?.ok_or_else(|| CfgTreeError::IoError {
        path: input.to_path_buf(),
        source: io::Error::from(io::ErrorKind::NotFound),
    })?;
    store.import_data(Value::Object(doc))?;
    Ok(ConfigResult::Imported {
        path: input.to_path_buf(),
    })
}

fn find<'a>(store: &'a Store, key: &str) -> Result<&'a AnySetting, CfgTreeError> {
    store
        .schema()
        .setting_at(key)
        .ok_or_else(|| CfgTreeError::KeyNotFound(key.into()))
}

fn doc_lines(setting: &AnySetting) -> Vec<String> {
    let def = setting.def();
    let mut lines = Vec::new();
    if def.title() != def.name() {
        lines.push(def.title().to_string());
    }
    if let Some(description) = def.description() {
        lines.push(description.to_string());
    }
    if def.kind().has_options() {
        let options: Vec<String> = def
            .options()
            .iter()
            .map(|o| format!("{} ({})", o.id(), o.label()))
            .collect();
        lines.push(format!("Options: {}", options.join(", ")));
    }
    lines
}

/// Format a JSON value for display. Strings are shown bare.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "<not set>".to_string(),
        other => other.to_string(),
    }
}
