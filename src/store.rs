//! The document store: the single nested mapping every handle reads and writes.
//!
//! A [`Store`] owns its [`Schema`], the current document and the path of the
//! file it was loaded from. The document sits behind a `parking_lot::RwLock`:
//! handle reads take the shared lock, writes take the exclusive one, and a
//! load or import builds and validates the new document before swapping it in
//! under a single write lock.
//!
//! Environment overrides are kept as a separate layer. Handles read the
//! effective document (file layer with the env layer merged on top), while
//! [`Store::save`] and [`Store::flush`] write the file layer only, so an
//! override never ends up in the settings file.

use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::category::Category;
use crate::error::CfgTreeError;
use crate::merge::deep_merge;
use crate::overrides::set_path;
use crate::persist;
use crate::schema::Schema;
use crate::types::InvalidValuePolicy;
use crate::validate::{self, Presence};

struct Layers {
    /// Defaults, the settings file and every `set` since: what gets saved.
    persisted: Map<String, Value>,
    env: Map<String, Value>,
    /// `persisted` with `env` merged on top: what handles read.
    effective: Map<String, Value>,
}

impl Layers {
    fn compose(persisted: Map<String, Value>, env: Map<String, Value>) -> Self {
        let effective = deep_merge(persisted.clone(), env.clone());
        Self {
            persisted,
            env,
            effective,
        }
    }
}

pub struct Store {
    schema: Schema,
    policy: InvalidValuePolicy,
    layers: RwLock<Layers>,
    file: RwLock<Option<PathBuf>>,
}

impl Store {
    /// A store holding the schema's defaults, with the default
    /// [`InvalidValuePolicy::Reject`].
    pub fn new(schema: Schema) -> Self {
        Self::with_policy(schema, InvalidValuePolicy::default())
    }

    pub fn with_policy(schema: Schema, policy: InvalidValuePolicy) -> Self {
        let doc = schema.defaults();
        Self::from_parts(schema, policy, doc, Map::new(), None)
    }

    /// Assemble a store from an already resolved file layer and env layer.
    pub(crate) fn from_parts(
        schema: Schema,
        policy: InvalidValuePolicy,
        persisted: Map<String, Value>,
        env: Map<String, Value>,
        file: Option<PathBuf>,
    ) -> Self {
        Self {
            schema,
            policy,
            layers: RwLock::new(Layers::compose(persisted, env)),
            file: RwLock::new(file),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn policy(&self) -> InvalidValuePolicy {
        self.policy
    }

    /// A copy of the effective document, environment overrides included.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.layers.read().effective.clone()
    }

    /// A copy of the document [`save`](Self::save) writes: the effective
    /// document without environment overrides.
    pub fn persisted(&self) -> Map<String, Value> {
        self.layers.read().persisted.clone()
    }

    /// The remembered settings file, set by [`load`](Self::load) or the builder.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.read().clone()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Map<String, Value>) -> R) -> R {
        f(&self.layers.read().effective)
    }

    /// Write `name` inside `category` in both the effective document and the
    /// file layer. The category must exist in the effective document.
    pub(crate) fn write_setting(
        &self,
        category: &Category,
        name: &str,
        value: Value,
    ) -> Result<(), CfgTreeError> {
        let mut layers = self.layers.write();
        let Layers {
            persisted,
            effective,
            ..
        } = &mut *layers;
        let map = category
            .resolve_mut(effective)
            .ok_or_else(|| CfgTreeError::KeyNotFound(category.path()))?;
        map.insert(name.to_string(), value.clone());

        let owned = category.segments();
        let mut path: Vec<&str> = owned.iter().map(String::as_str).collect();
        path.push(name);
        set_path(persisted, &path, value);
        Ok(())
    }

    /// Deep-merge `overlay` over the file layer, then validate the result
    /// under the store's policy. Environment overrides stay on top. On error
    /// the document is unchanged.
    pub fn merge(&self, overlay: Map<String, Value>) -> Result<(), CfgTreeError> {
        for key in validate::unknown_keys(&self.schema, &overlay) {
            debug!(key = %key, "keeping key not declared by the schema");
        }
        let mut layers = self.layers.write();
        let mut merged = deep_merge(layers.persisted.clone(), overlay);
        validate::enforce(&self.schema, &mut merged, self.policy, Presence::Required)?;
        let env = std::mem::take(&mut layers.env);
        *layers = Layers::compose(merged, env);
        Ok(())
    }

    /// Merge the settings file at `path` over the store and remember `path`
    /// for [`flush`](Self::flush) and [`import_data`](Self::import_data).
    ///
    /// A missing file is not an error: the store is left as it is, the path
    /// is remembered and `Ok(false)` is returned. A file that fails to parse
    /// or validate is not remembered, so a later flush cannot overwrite it.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<bool, CfgTreeError> {
        let path = path.as_ref();
        let loaded = persist::read_document(path)?;
        let found = match loaded {
            Some(loaded) => {
                self.merge(loaded)?;
                info!(path = %path.display(), "loaded settings");
                true
            }
            None => {
                info!(path = %path.display(), "settings file not found, using defaults");
                false
            }
        };
        *self.file.write() = Some(path.to_path_buf());
        Ok(found)
    }

    /// Write the file layer to `path` as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CfgTreeError> {
        let path = path.as_ref();
        let doc = self.persisted();
        persist::write_document(path, &doc)?;
        info!(path = %path.display(), "saved settings");
        Ok(())
    }

    /// Save to the remembered settings file.
    pub fn flush(&self) -> Result<(), CfgTreeError> {
        let path = self.file_path().ok_or(CfgTreeError::NoConfigFile)?;
        self.save(path)
    }

    /// Replace the file layer with `document` (no merge) and save it to the
    /// remembered settings file.
    ///
    /// Settings present in `document` are validated under the store's policy;
    /// settings it omits are simply absent afterwards unless an environment
    /// override supplies them.
    pub fn import_data(&self, document: Value) -> Result<(), CfgTreeError> {
        let mut imported = match document {
            Value::Object(map) => map,
            other => {
                return Err(CfgTreeError::NotAnObject(format!(
                    "imported document (found {})",
                    crate::value::describe(&other)
                )));
            }
        };
        let path = self.file_path().ok_or(CfgTreeError::NoConfigFile)?;
        validate::enforce(&self.schema, &mut imported, self.policy, Presence::Optional)?;

        {
            let mut layers = self.layers.write();
            let env = std::mem::take(&mut layers.env);
            *layers = Layers::compose(imported, env);
        }
        debug!(path = %path.display(), "imported settings");
        self.save(path)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("file", &*self.file.read())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
