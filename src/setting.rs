//! Setting handles: typed leaves of the settings tree.
//!
//! Every handle pairs the owning [`Category`] with an immutable
//! [`SettingDef`]. Values live in the [`Store`]; `get` and `set` delegate to
//! the owning category's `get_setting`/`set_setting`.
//!
//! - [`Setting<T>`]: free-form or password value of a Rust type `T`.
//! - [`SelectionSetting`]: one option id out of a declared list.
//! - [`MultiSelectionSetting`]: a sequence of option ids, plain or ordered.
//!
//! Handles compare equal when they share the owning category and the name.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::category::Category;
use crate::error::CfgTreeError;
use crate::store::Store;
use crate::types::{SelectOption, SettingKind, ValueType};
use crate::value::{SettingValue, describe, fits};

/// Type-erased description of a setting, as registered in a schema.
#[derive(Debug, Clone)]
pub struct SettingDef {
    name: String,
    title: String,
    description: Option<String>,
    kind: SettingKind,
    value_type: ValueType,
    nullable: bool,
    default: Value,
    options: Vec<SelectOption>,
    type_name: &'static str,
    fits: fn(&Value) -> bool,
}

impl SettingDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> SettingKind {
        self.kind
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// The default as it is written into the document.
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// Check that `value` has the declared shape and, for selection kinds,
    /// only uses declared option ids. Returns a human-readable reason.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if value.is_null() {
            return if self.nullable {
                Ok(())
            } else {
                Err("null is not allowed".into())
            };
        }
        if !self.value_type.accepts(value) {
            return Err(format!(
                "expected {}, found {}",
                self.value_type,
                describe(value)
            ));
        }
        if !(self.fits)(value) {
            return Err(match value {
                Value::Number(n) => format!("{n} is out of range for {}", self.type_name),
                other => format!("{} does not fit {}", describe(other), self.type_name),
            });
        }
        if !self.kind.has_options() {
            return Ok(());
        }
        let ids: Vec<&str> = match value {
            Value::String(s) => vec![s.as_str()],
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            _ => vec![],
        };
        match ids.into_iter().find(|id| self.option(id).is_none()) {
            Some(bad) => Err(format!(
                "'{bad}' is not one of: {}",
                self.options
                    .iter()
                    .map(SelectOption::id)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            None => Ok(()),
        }
    }

    pub(crate) fn option(&self, id: &str) -> Option<&SelectOption> {
        self.options.iter().find(|o| o.id() == id)
    }
}

/// Anything that can be registered in a [`Schema`](crate::Schema).
pub trait SettingHandle {
    fn category(&self) -> &Category;
    fn def(&self) -> &Arc<SettingDef>;

    fn name(&self) -> &str {
        self.def().name()
    }

    /// Dotted path without a trailing dot: `"main.logging.consolelevel"`.
    fn path(&self) -> String {
        format!("{}{}", self.category().path(), self.def().name())
    }
}

fn new_def<T: SettingValue>(
    name: String,
    kind: SettingKind,
    default: Value,
    options: Vec<SelectOption>,
) -> Arc<SettingDef> {
    Arc::new(SettingDef {
        title: name.clone(),
        name,
        description: None,
        kind,
        value_type: T::VALUE_TYPE,
        nullable: T::NULLABLE,
        default,
        options,
        type_name: T::TYPE_NAME,
        fits: fits::<T>,
    })
}

fn read_raw<H: SettingHandle + ?Sized>(handle: &H, store: &Store) -> Result<Value, CfgTreeError> {
    handle.category().get_setting(store, handle.name())
}

fn write_checked<H: SettingHandle + ?Sized>(
    handle: &H,
    store: &Store,
    value: Value,
) -> Result<(), CfgTreeError> {
    handle
        .def()
        .check(&value)
        .map_err(|reason| CfgTreeError::InvalidValue {
            key: handle.path(),
            reason,
        })?;
    handle.category().set_setting(store, handle.name(), value)
}

fn mismatch<H: SettingHandle + ?Sized>(handle: &H, raw: &Value) -> CfgTreeError {
    CfgTreeError::TypeMismatch {
        key: handle.path(),
        expected: handle.def().value_type().to_string(),
        actual: describe(raw),
    }
}

macro_rules! metadata_builders {
    () => {
        /// Display title; defaults to the name.
        pub fn title(mut self, title: impl Into<String>) -> Self {
            Arc::make_mut(&mut self.def).title = title.into();
            self
        }

        pub fn description(mut self, description: impl Into<String>) -> Self {
            Arc::make_mut(&mut self.def).description = Some(description.into());
            self
        }
    };
}

macro_rules! handle_impls {
    ($ty:ident $(<$gen:ident>)?) => {
        impl$(<$gen>)? SettingHandle for $ty$(<$gen>)? {
            fn category(&self) -> &Category {
                &self.category
            }

            fn def(&self) -> &Arc<SettingDef> {
                &self.def
            }
        }

        impl$(<$gen>)? PartialEq for $ty$(<$gen>)? {
            fn eq(&self, other: &Self) -> bool {
                self.category == other.category && self.def.name == other.def.name
            }
        }

        impl$(<$gen>)? Eq for $ty$(<$gen>)? {}

        impl$(<$gen>)? fmt::Debug for $ty$(<$gen>)? {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("path", &self.path())
                    .field("kind", &self.def.kind)
                    .finish()
            }
        }
    };
}

// -- Setting<T> ----------------------------------------------------------------

/// A free-form (or password) setting holding a `T`.
pub struct Setting<T> {
    category: Category,
    def: Arc<SettingDef>,
    _marker: PhantomData<fn() -> T>,
}

handle_impls!(Setting<T>);

impl<T> Clone for Setting<T> {
    fn clone(&self) -> Self {
        Self {
            category: self.category.clone(),
            def: Arc::clone(&self.def),
            _marker: PhantomData,
        }
    }
}

impl<T: SettingValue> Setting<T> {
    pub fn new(category: &Category, name: impl Into<String>, default: T) -> Self {
        Self {
            category: category.clone(),
            def: new_def::<T>(
                name.into(),
                SettingKind::Free,
                default.to_json(),
                Vec::new(),
            ),
            _marker: PhantomData,
        }
    }

    metadata_builders!();

    /// Mark the value as secret, for UIs that mask it.
    pub fn password(mut self) -> Self {
        Arc::make_mut(&mut self.def).kind = SettingKind::Password;
        self
    }

    pub fn get(&self, store: &Store) -> Result<T, CfgTreeError> {
        let raw = read_raw(self, store)?;
        T::from_json(&raw).ok_or_else(|| mismatch(self, &raw))
    }

    /// The stored value, or `fallback` when it is missing or malformed.
    pub fn get_or(&self, store: &Store, fallback: T) -> T {
        self.get(store).unwrap_or(fallback)
    }

    pub fn set(&self, store: &Store, value: T) -> Result<(), CfgTreeError> {
        value
            .representable()
            .map_err(|reason| CfgTreeError::InvalidValue {
                key: self.path(),
                reason,
            })?;
        write_checked(self, store, value.to_json())
    }

    pub fn is_equal_to(&self, store: &Store, value: &T) -> Result<bool, CfgTreeError>
    where
        T: PartialEq,
    {
        Ok(self.get(store)? == *value)
    }
}

// -- SelectionSetting ------------------------------------------------------------

/// A setting whose value is the id of one of its declared options.
#[derive(Clone)]
pub struct SelectionSetting {
    category: Category,
    def: Arc<SettingDef>,
}

handle_impls!(SelectionSetting);

impl SelectionSetting {
    /// Seeds the document with `default.id()`. Registration fails if the
    /// default is not among `options`.
    pub fn new(
        category: &Category,
        name: impl Into<String>,
        default: &SelectOption,
        options: &[SelectOption],
    ) -> Self {
        Self {
            category: category.clone(),
            def: new_def::<String>(
                name.into(),
                SettingKind::Select,
                Value::String(default.id().to_string()),
                options.to_vec(),
            ),
        }
    }

    metadata_builders!();

    pub fn options(&self) -> &[SelectOption] {
        self.def.options()
    }

    /// The raw stored id.
    pub fn get(&self, store: &Store) -> Result<String, CfgTreeError> {
        let raw = read_raw(self, store)?;
        String::from_json(&raw).ok_or_else(|| mismatch(self, &raw))
    }

    /// The stored id resolved back to its declared option.
    pub fn option(&self, store: &Store) -> Result<SelectOption, CfgTreeError> {
        let id = self.get(store)?;
        self.def
            .option(&id)
            .cloned()
            .ok_or_else(|| CfgTreeError::InvalidValue {
                key: self.path(),
                reason: format!("'{id}' is not a declared option"),
            })
    }

    /// Store an option id. Accepts a `&str` id or a [`SelectOption`].
    pub fn set(&self, store: &Store, value: impl AsRef<str>) -> Result<(), CfgTreeError> {
        write_checked(self, store, Value::String(value.as_ref().to_string()))
    }

    /// Whether the stored id equals `value` (an id or a [`SelectOption`]).
    pub fn is_equal_to(&self, store: &Store, value: impl AsRef<str>) -> Result<bool, CfgTreeError> {
        Ok(self.get(store)? == value.as_ref())
    }
}

// -- MultiSelectionSetting --------------------------------------------------------

/// A setting whose value is a sequence of option ids.
///
/// The plain and [`ordered`](Self::ordered) variants store and read identically.
/// Order is kept as written, which matters for the ordered kind (e.g. a
/// fallback priority list).
#[derive(Clone)]
pub struct MultiSelectionSetting {
    category: Category,
    def: Arc<SettingDef>,
}

handle_impls!(MultiSelectionSetting);

impl MultiSelectionSetting {
    pub fn new(
        category: &Category,
        name: impl Into<String>,
        defaults: &[SelectOption],
        options: &[SelectOption],
    ) -> Self {
        Self::with_kind(category, name.into(), defaults, options, SettingKind::MultiSelect)
    }

    /// Same storage as [`new`](Self::new); the kind tells consumers that
    /// the order of the ids is meaningful.
    pub fn ordered(
        category: &Category,
        name: impl Into<String>,
        defaults: &[SelectOption],
        options: &[SelectOption],
    ) -> Self {
        Self::with_kind(
            category,
            name.into(),
            defaults,
            options,
            SettingKind::OrderedMultiSelect,
        )
    }

    fn with_kind(
        category: &Category,
        name: String,
        defaults: &[SelectOption],
        options: &[SelectOption],
        kind: SettingKind,
    ) -> Self {
        let ids = defaults
            .iter()
            .map(|o| Value::String(o.id().to_string()))
            .collect();
        Self {
            category: category.clone(),
            def: new_def::<Vec<String>>(
                name,
                kind,
                Value::Array(ids),
                options.to_vec(),
            ),
        }
    }

    metadata_builders!();

    pub fn options(&self) -> &[SelectOption] {
        self.def.options()
    }

    pub fn is_ordered(&self) -> bool {
        self.def.kind() == SettingKind::OrderedMultiSelect
    }

    /// The raw stored ids, in stored order.
    pub fn get(&self, store: &Store) -> Result<Vec<String>, CfgTreeError> {
        let raw = read_raw(self, store)?;
        Vec::<String>::from_json(&raw).ok_or_else(|| mismatch(self, &raw))
    }

    /// The stored ids resolved to their declared options. Unknown ids are skipped.
    pub fn selected(&self, store: &Store) -> Result<Vec<SelectOption>, CfgTreeError> {
        Ok(self
            .get(store)?
            .iter()
            .filter_map(|id| self.def.option(id).cloned())
            .collect())
    }

    /// Store a sequence of option ids (or [`SelectOption`]s), keeping their order.
    pub fn set<I>(&self, store: &Store, values: I) -> Result<(), CfgTreeError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let ids = values
            .into_iter()
            .map(|v| Value::String(v.as_ref().to_string()))
            .collect();
        write_checked(self, store, Value::Array(ids))
    }

    pub fn contains(&self, store: &Store, value: impl AsRef<str>) -> Result<bool, CfgTreeError> {
        Ok(self.get(store)?.iter().any(|id| id == value.as_ref()))
    }
}

// -- AnySetting ------------------------------------------------------------------

/// A setting with its Rust type erased: what a [`Schema`](crate::Schema)
/// keeps for each registered handle. Reads and writes raw JSON values,
/// still checked against the declared type and options.
#[derive(Clone)]
pub struct AnySetting {
    category: Category,
    def: Arc<SettingDef>,
}

handle_impls!(AnySetting);

impl AnySetting {
    pub fn of<H: SettingHandle + ?Sized>(handle: &H) -> Self {
        Self {
            category: handle.category().clone(),
            def: Arc::clone(handle.def()),
        }
    }

    pub fn get(&self, store: &Store) -> Result<Value, CfgTreeError> {
        read_raw(self, store)
    }

    pub fn set(&self, store: &Store, value: Value) -> Result<(), CfgTreeError> {
        write_checked(self, store, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{TestSchema, log_levels};
    use serde_json::json;

    #[test]
    fn setting_path_has_no_trailing_dot() {
        let t = TestSchema::build();
        assert_eq!(t.port.path(), "main.port");
        assert_eq!(t.console_level.path(), "main.logging.consolelevel");
    }

    #[test]
    fn settings_with_same_category_and_name_are_equal() {
        let root = Category::root();
        let main = Category::new(&root, "main", "Main");
        let a = Setting::new(&main, "port", 5050u16).description("first");
        let b = Setting::new(&main, "port", 1u16).description("second");
        assert_eq!(a, b);
    }

    #[test]
    fn settings_in_different_categories_are_not_equal() {
        let root = Category::root();
        let sab = Category::new(&root, "sabnzbd", "");
        let nzbget = Category::new(&root, "nzbget", "");
        let a = Setting::new(&sab, "host", "127.0.0.1".to_string());
        let b = Setting::new(&nzbget, "host", "127.0.0.1".to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn builders_set_metadata() {
        let root = Category::root();
        let main = Category::new(&root, "main", "");
        let pw = Setting::new(&main, "password", String::new())
            .title("Password")
            .description("Basic auth password")
            .password();
        assert_eq!(pw.def().title(), "Password");
        assert_eq!(pw.def().description(), Some("Basic auth password"));
        assert_eq!(pw.def().kind(), SettingKind::Password);
    }

    #[test]
    fn selection_default_is_stored_as_id() {
        let root = Category::root();
        let logging = Category::new(&root, "logging", "");
        let levels = log_levels();
        let level = SelectionSetting::new(&logging, "level", &levels[3], &levels);
        assert_eq!(level.def().default_value(), &json!("INFO"));
        assert_eq!(level.path(), "logging.level");
    }

    #[test]
    fn multiselection_default_is_list_of_ids() {
        let root = Category::root();
        let cat = Category::new(&root, "indexer", "");
        let levels = log_levels();
        let multi = MultiSelectionSetting::ordered(&cat, "ids", &levels[..2], &levels);
        assert_eq!(multi.def().default_value(), &json!(["CRITICAL", "ERROR"]));
        assert!(multi.is_ordered());
    }

    #[test]
    fn check_rejects_unknown_option() {
        let t = TestSchema::build();
        let def = t.console_level.def();
        assert!(def.check(&json!("DEBUG")).is_ok());
        let reason = def.check(&json!("VERBOSE")).unwrap_err();
        assert!(reason.contains("VERBOSE"));
        assert!(reason.contains("CRITICAL"));
    }

    #[test]
    fn check_rejects_wrong_type_and_null() {
        let t = TestSchema::build();
        assert!(t.port.def().check(&json!("5050")).is_err());
        assert!(t.port.def().check(&json!(null)).is_err());
        assert!(t.apikey.def().check(&json!(null)).is_ok());
    }

    #[test]
    fn check_rejects_integers_outside_the_rust_type() {
        let t = TestSchema::build();
        let reason = t.port.def().check(&json!(70000)).unwrap_err();
        assert_eq!(reason, "70000 is out of range for u16");
        assert!(t.port.def().check(&json!(-5)).is_err());
        assert!(t.timeout.def().check(&json!(-5)).is_ok());
    }

    #[test]
    fn set_rejects_non_finite_floats() {
        let mut schema = crate::Schema::new();
        let root = schema.root().clone();
        let searching = schema.category(&root, "searching", "").unwrap();
        let ratio = schema
            .setting(Setting::new(&searching, "ratio", Some(0.5f64)))
            .unwrap();
        let store = Store::new(schema);

        let err = ratio.set(&store, Some(f64::NAN)).unwrap_err();
        assert!(matches!(err, CfgTreeError::InvalidValue { ref key, .. } if key == "searching.ratio"));
        assert_eq!(ratio.get(&store).unwrap(), Some(0.5));

        ratio.set(&store, None).unwrap();
        assert_eq!(ratio.get(&store).unwrap(), None);
    }

    #[test]
    fn check_validates_every_list_element() {
        let t = TestSchema::build();
        let def = t.search_ids.def();
        assert!(def.check(&json!(["tvdbid", "imdbid"])).is_ok());
        assert!(def.check(&json!(["tvdbid", "bogus"])).is_err());
    }

    #[test]
    fn get_and_set_delegate_to_the_store() {
        let t = TestSchema::build();
        let store = Store::new(t.schema.clone());
        assert_eq!(t.port.get(&store).unwrap(), 5050);
        t.port.set(&store, 6000).unwrap();
        assert_eq!(t.port.get(&store).unwrap(), 6000);
        assert_eq!(store.snapshot()["main"]["port"], json!(6000));
        assert!(t.port.is_equal_to(&store, &6000).unwrap());
    }

    #[test]
    fn get_reports_type_mismatch() {
        let t = TestSchema::build();
        let store = Store::new(t.schema.clone());
        t.main
            .set_setting(&store, "port", json!("not a number"))
            .unwrap();
        let err = t.port.get(&store).unwrap_err();
        assert!(matches!(err, CfgTreeError::TypeMismatch { ref key, .. } if key == "main.port"));
        assert_eq!(t.port.get_or(&store, 1), 1);
    }

    #[test]
    fn selection_set_rejects_unknown_ids() {
        let t = TestSchema::build();
        let store = Store::new(t.schema.clone());
        let err = t.console_level.set(&store, "LOUD").unwrap_err();
        assert!(matches!(err, CfgTreeError::InvalidValue { .. }));
        assert_eq!(t.console_level.get(&store).unwrap(), "INFO");
    }

    #[test]
    fn selection_accepts_options_and_ids() {
        let t = TestSchema::build();
        let store = Store::new(t.schema.clone());
        let levels = log_levels();
        t.console_level.set(&store, &levels[4]).unwrap();
        assert_eq!(t.console_level.get(&store).unwrap(), "DEBUG");
        assert!(t.console_level.is_equal_to(&store, "DEBUG").unwrap());
        assert!(t.console_level.is_equal_to(&store, &levels[4]).unwrap());
        assert_eq!(t.console_level.option(&store).unwrap().label(), "Debug");
    }

    #[test]
    fn multiselection_keeps_written_order() {
        let t = TestSchema::build();
        let store = Store::new(t.schema.clone());
        t.search_ids.set(&store, ["tvdbid", "imdbid"]).unwrap();
        assert_eq!(t.search_ids.get(&store).unwrap(), vec!["tvdbid", "imdbid"]);
        let labels: Vec<String> = t
            .search_ids
            .selected(&store)
            .unwrap()
            .iter()
            .map(|o| o.label().to_string())
            .collect();
        assert_eq!(labels, vec!["TVDB ID", "IMDB ID"]);
        assert!(t.search_ids.contains(&store, "imdbid").unwrap());
        assert!(!t.search_ids.contains(&store, "rid").unwrap());
    }

    #[test]
    fn multiselection_rejects_unknown_ids() {
        let t = TestSchema::build();
        let store = Store::new(t.schema.clone());
        assert!(t.search_ids.set(&store, ["imdbid", "nope"]).is_err());
        assert_eq!(
            t.search_ids.get(&store).unwrap(),
            vec!["imdbid", "rid", "tvdbid"]
        );
    }

    #[test]
    fn erased_handle_equals_its_source() {
        let t = TestSchema::build();
        let erased = AnySetting::of(&t.port);
        assert_eq!(erased.path(), "main.port");
        assert_eq!(erased.category(), &t.main);
        let store = Store::new(t.schema.clone());
        erased.set(&store, json!(8080)).unwrap();
        assert_eq!(t.port.get(&store).unwrap(), 8080);
        assert!(erased.set(&store, json!("8080")).is_err());
    }

    #[test]
    fn nan_float_is_rejected() {
        let t = TestSchema::build();
        let store = Store::new(t.schema.clone());
        assert!(t.threshold.set(&store, f64::NAN).is_err());
    }
}
