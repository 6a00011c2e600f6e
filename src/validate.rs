//! Document validation against a schema.
//!
//! Runs after every merge or import. Each registered setting present in the
//! document is checked with [`SettingDef::check`](crate::SettingDef::check);
//! what happens to offending values depends on the [`InvalidValuePolicy`].
//! Keys the schema does not know are left alone.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::CfgTreeError;
use crate::overrides::{get_path, set_path};
use crate::schema::{Schema, SchemaEntry};
use crate::setting::SettingHandle;
use crate::types::InvalidValuePolicy;

/// Whether a missing setting is itself a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Every registered setting must be present (after a merge over defaults).
    Required,
    /// Only settings that are present are checked (imported documents).
    Optional,
}

/// Validate `doc` in place according to `policy`.
///
/// With [`InvalidValuePolicy::Reject`], returns [`CfgTreeError::InvalidValues`]
/// listing every offending key and leaves `doc` untouched. With
/// `ResetToDefault`, offending values are replaced by their defaults. With
/// `Keep`, they are only logged.
pub fn enforce(
    schema: &Schema,
    doc: &mut Map<String, Value>,
    policy: InvalidValuePolicy,
    presence: Presence,
) -> Result<(), CfgTreeError> {
    let mut violations = Vec::new();

    for setting in schema.settings() {
        let path = setting.path();
        let owned = setting.category().segments();
        let mut segments: Vec<&str> = owned.iter().map(String::as_str).collect();
        segments.push(setting.name());

        let reason = match get_path(doc, &segments) {
            Some(value) => match setting.def().check(value) {
                Ok(()) => continue,
                Err(reason) => reason,
            },
            None if presence == Presence::Optional => continue,
            None => "missing".to_string(),
        };

        match policy {
            InvalidValuePolicy::Reject => {}
            InvalidValuePolicy::ResetToDefault => {
                warn!(key = %path, %reason, "resetting invalid setting to its default");
                set_path(doc, &segments, setting.def().default_value().clone());
            }
            InvalidValuePolicy::Keep => {
                warn!(key = %path, %reason, "keeping invalid setting value");
            }
        }
        violations.push(CfgTreeError::InvalidValue { key: path, reason });
    }

    if violations.is_empty() {
        debug!("document matches schema");
        return Ok(());
    }
    match policy {
        InvalidValuePolicy::Reject => Err(CfgTreeError::InvalidValues(violations)),
        _ => Ok(()),
    }
}

/// Dotted paths in `doc` that the schema does not declare. Only the first
/// unknown level of each branch is reported.
pub fn unknown_keys(schema: &Schema, doc: &Map<String, Value>) -> Vec<String> {
    let mut out = Vec::new();
    collect_unknown(schema, doc, "", &mut out);
    out
}

fn collect_unknown(schema: &Schema, map: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in map {
        let path = format!("{prefix}{key}");
        if key.contains('.') {
            out.push(path);
            continue;
        }
        match schema.lookup(&path) {
            None => out.push(path),
            Some(SchemaEntry::Category(_)) => {
                if let Value::Object(inner) = value {
                    collect_unknown(schema, inner, &format!("{path}."), out);
                }
            }
            Some(SchemaEntry::Setting(_)) => {}
        }
    }
}
