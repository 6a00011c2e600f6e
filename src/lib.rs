//! Hierarchical, strongly referenced application settings backed by a single
//! JSON document.
//!
//! An application declares its settings once, as a tree of categories and
//! typed setting handles, and every part of the program holds on to those
//! handles instead of passing string keys around:
//!
//! ```ignore
//! let mut schema = Schema::new();
//! let root = schema.root().clone();
//! let main = schema.category(&root, "main", "Main")?;
//! let port = schema.setting(Setting::new(&main, "port", 5075u16).title("Port"))?;
//!
//! let store = CfgTree::builder(schema).app_name("nzbhydra").load()?;
//! let listen_on = port.get(&store)?;
//! ```
//!
//! That call finds `nzbhydra.json` in the platform config directory, merges it
//! over the declared defaults, applies `NZBHYDRA__*` environment variables and
//! hands back a [`Store`] that remembers the file for later saves.
//!
//! # Categories and settings
//!
//! A [`Category`] is a named node with a parent; the root category has no
//! name and its backing mapping is the document itself. Paths are the
//! dot-joined names from the root with a trailing dot for categories
//! (`"main.logging."`) and without one for settings
//! (`"main.logging.consolelevel"`).
//!
//! Handles hold no values. `get(&store)` and `set(&store, value)` resolve the
//! owning category's mapping by walking the parent chain from the document
//! root, so a handle always sees the current document, including after a load
//! or import replaced it.
//!
//! There are three kinds of setting handle:
//!
//! - **[`Setting<T>`]**: a free-form value of any [`SettingValue`] type
//!   (`String`, `bool`, `f64`, the integer types, `Vec<String>`, and
//!   `Option<T>` for nullable settings). `.password()` marks it secret for UIs.
//! - **[`SelectionSetting`]**: the id of one of a declared list of
//!   [`SelectOption`]s. The document stores the id (`"INFO"`), never the label.
//! - **[`MultiSelectionSetting`]**: a list of option ids. The
//!   [`ordered`](MultiSelectionSetting::ordered) variant stores the same way
//!   but tells consumers that the order is a priority.
//!
//! Two setting handles are equal when they belong to the same category and
//! have the same name; category equality is identity.
//!
//! # Two-phase build
//!
//! Constructing a handle has no side effects. Handles are registered in a
//! [`Schema`], which rejects duplicate sibling names, malformed names,
//! unregistered parents and defaults that their own setting would reject.
//! [`Schema::defaults`] then materializes the whole default document in one
//! pass, and [`Store::new`] starts from it.
//!
//! # Layer precedence
//!
//! ```text
//! Schema defaults       Setting::new(.., default)
//!        ↑ overridden by
//! Settings file         {platform config dir}/{app}.json
//!        ↑ overridden by
//! Environment vars      PREFIX__CATEGORY__SETTING
//! ```
//!
//! Loading is a deep merge: where both sides hold a mapping the merge
//! recurses, otherwise the loaded value wins. Keys the file leaves out keep
//! their defaults, and keys the schema does not know survive untouched.
//!
//! # Invalid stored values
//!
//! A settings file can hold values the schema would reject, such as an option
//! id that no longer exists. [`InvalidValuePolicy`] decides what happens on
//! load and import:
//!
//! - **`Reject`** (default): the load fails with
//!   [`CfgTreeError::InvalidValues`], naming every offending key, and the
//!   store is left unchanged.
//! - **`ResetToDefault`**: each offending value is replaced by its default.
//! - **`Keep`**: the value is kept as loaded.
//!
//! Both lenient policies log each offending key at `warn`.
//!
//! # Environment variables
//!
//! With env prefix `NZBHYDRA`, variables map via double-underscore nesting:
//!
//! | Env var | Setting |
//! |---------|---------|
//! | `NZBHYDRA__MAIN__PORT` | `main.port` |
//! | `NZBHYDRA__MAIN__LOGGING__CONSOLELEVEL` | `main.logging.consolelevel` |
//!
//! Segments match registered names without regard to case. Values are parsed
//! according to the setting's declared type; list settings take a JSON array
//! or a comma-separated list. Variables that name no setting are ignored.
//! The overrides form their own layer on top of the file: handles see them,
//! but saving writes the file layer only.
//!
//! # Persistence
//!
//! - [`Store::load`] merges a file and remembers its path. A missing file is
//!   not an error.
//! - [`Store::save`] writes pretty-printed JSON through a temporary file that
//!   is renamed over the target, creating parent directories as needed.
//!   Environment overrides are not part of what is saved.
//! - [`Store::import_data`] replaces the whole document and saves it to the
//!   remembered file.
//! - [`Store::flush`] saves to the remembered file.
//!
//! # Operations and the clap adapter
//!
//! The [`ops`] module implements `list`, `get`, `set`, `export` and `import`
//! on dotted keys and returns a displayable [`ConfigResult`]. With the `clap`
//! feature (on by default), [`ConfigArgs`] gives an application a
//! `config list|get|set|export|import` subcommand group whose
//! [`into_action()`](ConfigArgs::into_action) feeds [`ops::handle`].
//!
//! # Logging
//!
//! The crate logs through `tracing` at file and merge boundaries and never
//! installs a subscriber.

pub mod error;
pub mod ops;
pub mod types;

mod builder;
mod category;
#[cfg(feature = "clap")]
mod cli;
mod env;
mod file;
pub(crate) mod merge;
mod overrides;
mod persist;
mod resolve;
mod schema;
mod setting;
mod store;
mod validate;
mod value;

#[cfg(test)]
mod fixtures;

pub use builder::{CfgTree, StoreBuilder};
pub use category::Category;
#[cfg(feature = "clap")]
pub use cli::{ConfigArgs, ConfigSubcommand};
pub use error::CfgTreeError;
pub use ops::ConfigResult;
pub use schema::{Schema, SchemaEntry};
pub use setting::{
    AnySetting, MultiSelectionSetting, SelectionSetting, Setting, SettingDef, SettingHandle,
};
pub use store::Store;
pub use types::{ConfigAction, InvalidValuePolicy, SelectOption, SettingKind, ValueType};
pub use value::SettingValue;
