//! Vocabulary types shared by the schema, the store and the operations layer.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One permitted value of a selection setting.
///
/// The `id` is what gets stored in the document; the `label` is for display.
/// Two options are equal when their ids are equal, whatever their labels say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOption {
    id: String,
    label: String,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for SelectOption {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SelectOption {}

impl Hash for SelectOption {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl AsRef<str> for SelectOption {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for SelectOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// How a setting is presented and which values it admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKind {
    Free,
    Password,
    Select,
    #[serde(rename = "multiselect")]
    MultiSelect,
    #[serde(rename = "orderedMultiselect")]
    OrderedMultiSelect,
}

impl SettingKind {
    /// Whether values of this kind must come from a declared option list.
    pub fn has_options(self) -> bool {
        matches!(
            self,
            SettingKind::Select | SettingKind::MultiSelect | SettingKind::OrderedMultiSelect
        )
    }
}

/// Declared JSON shape of a setting's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    StringList,
}

impl ValueType {
    /// Whether a (non-null) JSON value has this shape. Floats accept integers.
    pub fn accepts(self, value: &serde_json::Value) -> bool {
        match self {
            ValueType::String => value.is_string(),
            ValueType::Integer => value.is_i64() || value.is_u64(),
            ValueType::Float => value.is_number(),
            ValueType::Boolean => value.is_boolean(),
            ValueType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(serde_json::Value::is_string)),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::StringList => "list of strings",
        };
        f.write_str(name)
    }
}

/// What to do with a stored value that does not match its setting's declared
/// type or options when a document is merged or imported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidValuePolicy {
    /// Fail the whole merge and report every offending key.
    #[default]
    Reject,
    /// Replace each offending value with the setting's default.
    ResetToDefault,
    /// Keep the value as loaded.
    Keep,
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    List,
    Get { key: String },
    Set { key: String, value: String },
    Export { output: Option<PathBuf> },
    Import { input: PathBuf },
}
