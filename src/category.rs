//! Category handles: named nodes of the settings tree.
//!
//! A [`Category`] never holds values. It knows its name and its parent, and
//! every read or write goes through [`Category::resolve`], which walks the
//! parent chain down from the document root to find this category's mapping
//! in the [`Store`]. Handles are cheap `Arc` clones.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::CfgTreeError;
use crate::store::Store;

/// A node of the settings tree. See the [module docs](self).
#[derive(Clone)]
pub struct Category {
    inner: Arc<CategoryInner>,
}

struct CategoryInner {
    name: String,
    title: String,
    parent: Option<Category>,
}

impl Category {
    /// The root category: no parent, empty name, empty path. Its backing
    /// mapping is the document itself.
    pub fn root() -> Self {
        Self {
            inner: Arc::new(CategoryInner {
                name: String::new(),
                title: String::new(),
                parent: None,
            }),
        }
    }

    /// A child of `parent`. An empty `title` falls back to the name.
    ///
    /// Construction is pure; the category exists in a document only after it
    /// has been registered with a [`Schema`](crate::Schema) and materialized.
    pub fn new(parent: &Category, name: impl Into<String>, title: impl Into<String>) -> Self {
        let name = name.into();
        let mut title = title.into();
        if title.is_empty() {
            title = name.clone();
        }
        Self {
            inner: Arc::new(CategoryInner {
                name,
                title,
                parent: Some(parent.clone()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn title(&self) -> &str {
        &self.inner.title
    }

    pub fn parent(&self) -> Option<&Category> {
        self.inner.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    /// Dotted path with a trailing dot: `"main.logging."`. The root's path is `""`.
    pub fn path(&self) -> String {
        match &self.inner.parent {
            None => String::new(),
            Some(parent) => format!("{}{}.", parent.path(), self.inner.name),
        }
    }

    /// Names from the first level below the root down to this category.
    pub fn segments(&self) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = self;
        while let Some(parent) = &current.inner.parent {
            segments.push(current.inner.name.clone());
            current = parent;
        }
        segments.reverse();
        segments
    }

    /// Find this category's mapping inside `root` by delegating to the parent.
    pub(crate) fn resolve<'a>(&self, root: &'a Map<String, Value>) -> Option<&'a Map<String, Value>> {
        match &self.inner.parent {
            None => Some(root),
            Some(parent) => parent.resolve(root)?.get(&self.inner.name)?.as_object(),
        }
    }

    pub(crate) fn resolve_mut<'a>(
        &self,
        root: &'a mut Map<String, Value>,
    ) -> Option<&'a mut Map<String, Value>> {
        match &self.inner.parent {
            None => Some(root),
            Some(parent) => parent
                .resolve_mut(root)?
                .get_mut(&self.inner.name)?
                .as_object_mut(),
        }
    }

    /// Snapshot of this category's mapping in `store`.
    pub fn get(&self, store: &Store) -> Result<Map<String, Value>, CfgTreeError> {
        store
            .read(|root| self.resolve(root).cloned())
            .ok_or_else(|| CfgTreeError::KeyNotFound(self.path()))
    }

    /// The value stored under `name` in this category's mapping.
    pub fn get_setting(&self, store: &Store, name: &str) -> Result<Value, CfgTreeError> {
        store
            .read(|root| self.resolve(root).and_then(|map| map.get(name)).cloned())
            .ok_or_else(|| CfgTreeError::KeyNotFound(format!("{}{name}", self.path())))
    }

    /// Overwrite the value under `name` in this category's mapping.
    ///
    /// No validation happens here; typed handles check values before calling it.
    pub fn set_setting(&self, store: &Store, name: &str, value: Value) -> Result<(), CfgTreeError> {
        store.write_setting(self, name, value)
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Category {}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("path", &self.path())
            .field("title", &self.inner.title)
            .finish()
    }
}
