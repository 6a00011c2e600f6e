use serde_json::{Map, Value};
use tracing::debug;

use crate::error::CfgTreeError;
use crate::overrides::{parse_raw, set_path};
use crate::schema::{Schema, SchemaEntry};
use crate::setting::SettingHandle;

/// Build a sparse document from environment variables matching `{PREFIX}__*`.
///
/// Double underscore `__` separates nesting levels, so
/// `MYAPP__MAIN__LOGGING__CONSOLELEVEL=DEBUG` sets `main.logging.consolelevel`.
/// Segments match registered names without regard to ASCII case and are
/// written back under their canonical spelling.
///
/// Each value is parsed according to its setting's declared type. Variables
/// that name no registered setting are skipped; a value that does not parse
/// is an error.
///
/// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
pub fn env_to_document(
    schema: &Schema,
    prefix: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<Map<String, Value>, CfgTreeError> {
    let needle = format!("{prefix}__");
    let mut doc = Map::new();

    for (key, raw) in vars {
        let Some(rest) = key.strip_prefix(&needle) else {
            continue;
        };
        let segments: Vec<&str> = rest.split("__").collect();
        let setting = match schema.lookup_ignore_case(&segments) {
            Some(SchemaEntry::Setting(s)) => s,
            _ => {
                debug!(var = %key, "ignoring environment variable with no matching setting");
                continue;
            }
        };

        let value = parse_raw(setting.def(), &raw).map_err(|reason| CfgTreeError::InvalidValue {
            key: format!("{} (from {key})", setting.path()),
            reason,
        })?;
        let owned = setting.category().segments();
        let mut canonical: Vec<&str> = owned.iter().map(String::as_str).collect();
        canonical.push(setting.name());
        set_path(&mut doc, &canonical, value);
    }

    Ok(doc)
}
