//! Schema registry: the declared shape of a settings document.
//!
//! Building a configuration tree happens in two explicit phases:
//!
//! 1. **Registration.** Category and setting handles are constructed as plain
//!    data and registered here. Registration fails fast on definition errors:
//!    duplicate sibling names, malformed names, a parent that was never
//!    registered, or a default that its own setting would reject.
//! 2. **Materialization.** [`Schema::defaults`] walks the registered tree once
//!    and produces the document of defaults that a [`Store`](crate::Store)
//!    starts from.
//!
//! Children keep their registration order, which is also the order of
//! [`Schema::settings`] and [`Schema::describe`].

use serde_json::{Map, Value, json};

use crate::category::Category;
use crate::error::CfgTreeError;
use crate::setting::{AnySetting, SettingHandle};

#[derive(Clone)]
pub struct Schema {
    root: CategoryNode,
}

#[derive(Clone)]
struct CategoryNode {
    category: Category,
    children: Vec<Node>,
}

#[derive(Clone)]
enum Node {
    Category(CategoryNode),
    Setting(AnySetting),
}

impl Node {
    fn name(&self) -> &str {
        match self {
            Node::Category(c) => c.category.name(),
            Node::Setting(s) => s.name(),
        }
    }
}

/// Result of looking up a dotted key.
#[derive(Debug, Clone, Copy)]
pub enum SchemaEntry<'a> {
    Category(&'a Category),
    Setting(&'a AnySetting),
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    pub fn new() -> Self {
        Self {
            root: CategoryNode {
                category: Category::root(),
                children: Vec::new(),
            },
        }
    }

    /// The root category every top-level category hangs off.
    pub fn root(&self) -> &Category {
        &self.root.category
    }

    /// Register a category under its (already registered) parent.
    pub fn add_category(&mut self, category: &Category) -> Result<(), CfgTreeError> {
        let parent = category.parent().ok_or_else(|| CfgTreeError::InvalidName {
            name: String::new(),
            reason: "a root category cannot be registered as a child".into(),
        })?;
        let node = self.insertion_point(parent, category.name())?;
        node.children.push(Node::Category(CategoryNode {
            category: category.clone(),
            children: Vec::new(),
        }));
        Ok(())
    }

    /// Construct a child of `parent`, register it and return the handle.
    pub fn category(
        &mut self,
        parent: &Category,
        name: &str,
        title: &str,
    ) -> Result<Category, CfgTreeError> {
        let category = Category::new(parent, name, title);
        self.add_category(&category)?;
        Ok(category)
    }

    /// Register a setting handle under its (already registered) category.
    pub fn add_setting<H: SettingHandle>(&mut self, setting: &H) -> Result<(), CfgTreeError> {
        let def = setting.def();
        if def.kind().has_options() && def.options().is_empty() {
            return Err(CfgTreeError::InvalidDefault {
                key: setting.path(),
                reason: "selection settings need at least one option".into(),
            });
        }
        def.check(def.default_value())
            .map_err(|reason| CfgTreeError::InvalidDefault {
                key: setting.path(),
                reason,
            })?;
        let node = self.insertion_point(setting.category(), setting.name())?;
        node.children.push(Node::Setting(AnySetting::of(setting)));
        Ok(())
    }

    /// Register a setting handle and hand it back, for `let x = schema.setting(...)?`.
    pub fn setting<H: SettingHandle>(&mut self, setting: H) -> Result<H, CfgTreeError> {
        self.add_setting(&setting)?;
        Ok(setting)
    }

    fn insertion_point(
        &mut self,
        parent: &Category,
        name: &str,
    ) -> Result<&mut CategoryNode, CfgTreeError> {
        validate_name(name)?;
        let node = self
            .node_mut(parent)
            .ok_or_else(|| CfgTreeError::UnregisteredCategory(parent.path()))?;
        if node.children.iter().any(|child| child.name() == name) {
            return Err(CfgTreeError::DuplicateName {
                parent: parent.path(),
                name: name.to_string(),
            });
        }
        Ok(node)
    }

    fn node_mut(&mut self, category: &Category) -> Option<&mut CategoryNode> {
        let mut node = &mut self.root;
        for segment in category.segments() {
            node = node.children.iter_mut().find_map(|child| match child {
                Node::Category(c) if c.category.name() == segment => Some(c),
                _ => None,
            })?;
        }
        (node.category == *category).then_some(node)
    }

    /// Whether `category` is this schema's root or one of its registered categories.
    pub fn contains(&self, category: &Category) -> bool {
        let mut node = &self.root;
        for segment in category.segments() {
            let next = node.children.iter().find_map(|child| match child {
                Node::Category(c) if c.category.name() == segment => Some(c),
                _ => None,
            });
            match next {
                Some(c) => node = c,
                None => return false,
            }
        }
        node.category == *category
    }

    /// Look up a dotted key such as `"main.port"` or `"main.logging."`.
    pub fn lookup(&self, key: &str) -> Option<SchemaEntry<'_>> {
        let segments: Vec<&str> = key.trim_end_matches('.').split('.').collect();
        self.lookup_segments(&segments, |a, b| a == b)
    }

    /// Like [`lookup`](Self::lookup) for pre-split segments compared without
    /// regard to ASCII case. Used for environment variable names.
    pub fn lookup_ignore_case(&self, segments: &[&str]) -> Option<SchemaEntry<'_>> {
        self.lookup_segments(segments, |a, b| a.eq_ignore_ascii_case(b))
    }

    fn lookup_segments(
        &self,
        segments: &[&str],
        eq: impl Fn(&str, &str) -> bool,
    ) -> Option<SchemaEntry<'_>> {
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        let (leaf, path) = segments.split_last()?;
        let mut node = &self.root;
        for segment in path {
            node = node.children.iter().find_map(|child| match child {
                Node::Category(c) if eq(c.category.name(), segment) => Some(c),
                _ => None,
            })?;
        }
        node.children.iter().find_map(|child| match child {
            Node::Category(c) if eq(c.category.name(), leaf) => {
                Some(SchemaEntry::Category(&c.category))
            }
            Node::Setting(s) if eq(s.name(), leaf) => Some(SchemaEntry::Setting(s)),
            _ => None,
        })
    }

    /// Look up a dotted key that must name a setting.
    pub fn setting_at(&self, key: &str) -> Option<&AnySetting> {
        match self.lookup(key)? {
            SchemaEntry::Setting(s) => Some(s),
            SchemaEntry::Category(_) => None,
        }
    }

    /// Every registered setting, depth-first in registration order.
    pub fn settings(&self) -> Vec<&AnySetting> {
        let mut out = Vec::new();
        collect_settings(&self.root, &mut out);
        out
    }

    /// Every registered category except the root, depth-first.
    pub fn categories(&self) -> Vec<&Category> {
        let mut out = Vec::new();
        collect_categories(&self.root, &mut out);
        out
    }

    /// Materialize the document of defaults: an empty mapping for every
    /// category and the default value for every setting.
    pub fn defaults(&self) -> Map<String, Value> {
        materialize(&self.root)
    }

    /// A JSON description of the tree for UIs that render settings.
    pub fn describe(&self) -> Value {
        Value::Array(self.root.children.iter().map(describe_node).collect())
    }
}

fn validate_name(name: &str) -> Result<(), CfgTreeError> {
    let reason = if name.is_empty() {
        "names cannot be empty"
    } else if name.contains('.') {
        "names cannot contain '.'"
    } else {
        return Ok(());
    };
    Err(CfgTreeError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    })
}

fn collect_settings<'a>(node: &'a CategoryNode, out: &mut Vec<&'a AnySetting>) {
    for child in &node.children {
        match child {
            Node::Category(c) => collect_settings(c, out),
            Node::Setting(s) => out.push(s),
        }
    }
}

fn collect_categories<'a>(node: &'a CategoryNode, out: &mut Vec<&'a Category>) {
    for child in &node.children {
        if let Node::Category(c) = child {
            out.push(&c.category);
            collect_categories(c, out);
        }
    }
}

fn materialize(node: &CategoryNode) -> Map<String, Value> {
    let mut map = Map::new();
    for child in &node.children {
        match child {
            Node::Category(c) => {
                map.insert(c.category.name().to_string(), Value::Object(materialize(c)));
            }
            Node::Setting(s) => {
                map.insert(s.name().to_string(), s.def().default_value().clone());
            }
        }
    }
    map
}

fn describe_node(node: &Node) -> Value {
    match node {
        Node::Category(c) => json!({
            "name": c.category.name(),
            "title": c.category.title(),
            "path": c.category.path(),
            "children": c.children.iter().map(describe_node).collect::<Vec<_>>(),
        }),
        Node::Setting(s) => {
            let def = s.def();
            let mut out = json!({
                "name": def.name(),
                "title": def.title(),
                "path": s.path(),
                "kind": def.kind(),
                "valueType": def.value_type(),
                "nullable": def.nullable(),
                "default": def.default_value(),
            });
            if let Some(description) = def.description() {
                out["description"] = json!(description);
            }
            if def.kind().has_options() {
                out["options"] = json!(def.options());
            }
            out
        }
    }
}
