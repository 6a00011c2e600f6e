//! Startup resolution pipeline: merge every layer into one document.
//!
//! Operates on pre-loaded data ([`ResolveInput`]) with no I/O, so the whole
//! pipeline is testable with synthetic inputs. Steps:
//!
//! 1. Materialize the schema's defaults
//! 2. Parse the settings file and deep-merge it on top
//! 3. Validate that file layer under the invalid-value policy
//! 4. Collect environment overrides into their own layer (highest priority)
//!
//! The two layers stay apart so the store can save the file layer without
//! the overrides.

use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::debug;

use crate::env;
use crate::error::CfgTreeError;
use crate::merge::deep_merge;
use crate::persist;
use crate::schema::Schema;
use crate::types::InvalidValuePolicy;
use crate::validate::{self, Presence};

/// All pre-loaded data needed to resolve a document. No I/O happens here.
pub struct ResolveInput {
    /// The settings file path and its contents, if the file exists.
    pub file: Option<(PathBuf, String)>,
    /// Raw environment variable pairs (pass `std::env::vars().collect()` or synthetic data).
    pub env_vars: Vec<(String, String)>,
    /// Env var prefix (e.g. `"NZBHYDRA"`). `None` means env disabled.
    pub env_prefix: Option<String>,
    pub policy: InvalidValuePolicy,
}

/// The resolved layers. Env values were already checked one by one while
/// parsing, so merging them over a valid file layer stays valid.
#[derive(Debug)]
pub struct Resolved {
    pub file_layer: Map<String, Value>,
    pub env_layer: Map<String, Value>,
}

impl Resolved {
    /// The file layer with the env layer merged on top.
    pub fn effective(&self) -> Map<String, Value> {
        deep_merge(self.file_layer.clone(), self.env_layer.clone())
    }
}

pub fn resolve(schema: &Schema, input: ResolveInput) -> Result<Resolved, CfgTreeError> {
    let mut file_layer = schema.defaults();

    if let Some((path, content)) = &input.file {
        let loaded = persist::parse_document(content, path)?;
        for key in validate::unknown_keys(schema, &loaded) {
            debug!(key = %key, path = %path.display(), "keeping key not declared by the schema");
        }
        file_layer = deep_merge(file_layer, loaded);
    }
    validate::enforce(schema, &mut file_layer, input.policy, Presence::Required)?;

    let env_layer = match &input.env_prefix {
        Some(prefix) => {
            let overlay = env::env_to_document(schema, prefix, input.env_vars)?;
            if !overlay.is_empty() {
                debug!(prefix = %prefix, "applying environment overrides");
            }
            overlay
        }
        None => Map::new(),
    };

    Ok(Resolved {
        file_layer,
        env_layer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::TestSchema;
    use serde_json::json;

    fn empty_input() -> ResolveInput {
        ResolveInput {
            file: None,
            env_vars: vec![],
            env_prefix: None,
            policy: InvalidValuePolicy::Reject,
        }
    }

    fn file(content: &str) -> Option<(PathBuf, String)> {
        Some(("settings.json".into(), content.into()))
    }

    #[test]
    fn defaults_only() {
        let t = TestSchema::build();
        let doc = resolve(&t.schema, empty_input()).unwrap().effective();
        assert_eq!(doc, t.schema.defaults());
    }

    #[test]
    fn file_overrides_default() {
        let t = TestSchema::build();
        let input = ResolveInput {
            file: file(r#"{"main": {"port": 3000}}"#),
            ..empty_input()
        };
        let doc = resolve(&t.schema, input).unwrap().effective();
        assert_eq!(doc["main"]["port"], json!(3000));
        assert_eq!(doc["main"]["host"], json!("0.0.0.0"));
    }

    #[test]
    fn env_overrides_file() {
        let t = TestSchema::build();
        let input = ResolveInput {
            file: file(r#"{"main": {"port": 3000, "debug": true}}"#),
            env_vars: vec![("HYDRA__MAIN__PORT".into(), "4000".into())],
            env_prefix: Some("HYDRA".into()),
            ..empty_input()
        };
        let resolved = resolve(&t.schema, input).unwrap();
        let doc = resolved.effective();
        assert_eq!(doc["main"]["port"], json!(4000));
        assert_eq!(doc["main"]["debug"], json!(true));
        // The override lives only in the env layer.
        assert_eq!(resolved.file_layer["main"]["port"], json!(3000));
        assert_eq!(resolved.env_layer, *json!({"main": {"port": 4000}}).as_object().unwrap());
    }

    #[test]
    fn out_of_range_file_value_follows_policy() {
        let t = TestSchema::build();
        let bad = r#"{"main": {"port": 70000}}"#;
        let err = resolve(
            &t.schema,
            ResolveInput {
                file: file(bad),
                ..empty_input()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("main.port"));

        let doc = resolve(
            &t.schema,
            ResolveInput {
                file: file(bad),
                policy: InvalidValuePolicy::ResetToDefault,
                ..empty_input()
            },
        )
        .unwrap()
        .effective();
        assert_eq!(doc["main"]["port"], json!(5050));
    }

    #[test]
    fn env_ignored_without_prefix() {
        let t = TestSchema::build();
        let input = ResolveInput {
            env_vars: vec![("HYDRA__MAIN__PORT".into(), "4000".into())],
            ..empty_input()
        };
        let doc = resolve(&t.schema, input).unwrap().effective();
        assert_eq!(doc["main"]["port"], json!(5050));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let t = TestSchema::build();
        let input = ResolveInput {
            file: file("{\"main\": "),
            ..empty_input()
        };
        let err = resolve(&t.schema, input).unwrap_err();
        assert!(matches!(err, CfgTreeError::ParseError { ref path, .. } if path.ends_with("settings.json")));
    }

    #[test]
    fn invalid_file_value_follows_policy() {
        let t = TestSchema::build();
        let bad = r#"{"main": {"logging": {"consolelevel": "LOUD"}}}"#;
        let err = resolve(
            &t.schema,
            ResolveInput {
                file: file(bad),
                ..empty_input()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CfgTreeError::InvalidValues(_)));

        let doc = resolve(
            &t.schema,
            ResolveInput {
                file: file(bad),
                policy: InvalidValuePolicy::ResetToDefault,
                ..empty_input()
            },
        )
        .unwrap()
        .effective();
        assert_eq!(doc["main"]["logging"]["consolelevel"], json!("INFO"));
    }
}
