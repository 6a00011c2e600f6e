use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::CfgTreeError;
use crate::file;
use crate::persist;
use crate::resolve::{self, ResolveInput};
use crate::schema::Schema;
use crate::store::Store;
use crate::types::InvalidValuePolicy;

/// Entry point for building a settings store.
pub struct CfgTree;

impl CfgTree {
    pub fn builder(schema: Schema) -> StoreBuilder {
        StoreBuilder::new(schema)
    }
}

/// Builder that locates the settings file, layers the environment on top and
/// hands back a ready [`Store`].
///
/// ```ignore
/// let store = CfgTree::builder(schema).app_name("nzbhydra").load()?;
/// ```
pub struct StoreBuilder {
    schema: Schema,
    app_name: Option<String>,
    file_name: Option<String>,
    file_path: Option<PathBuf>,
    env_prefix: Option<String>,
    env_enabled: bool,
    policy: InvalidValuePolicy,
}

impl StoreBuilder {
    fn new(schema: Schema) -> Self {
        Self {
            schema,
            app_name: None,
            file_name: None,
            file_path: None,
            env_prefix: None,
            env_enabled: true,
            policy: InvalidValuePolicy::default(),
        }
    }

    /// Set the application name. This derives sensible defaults:
    /// - `file_name` → `"{app_name}.json"`
    /// - settings file → `{platform config dir}/{file_name}`
    /// - `env_prefix` → `"{APP_NAME}"` (uppercased, `-` becomes `_`)
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Override the settings file name (default: `"{app_name}.json"`).
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Use this exact settings file instead of the platform location.
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Override the environment variable prefix (default: derived from `app_name`).
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// What to do with stored values that violate the schema
    /// (default: [`InvalidValuePolicy::Reject`]).
    pub fn invalid_values(mut self, policy: InvalidValuePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn effective_app_name(&self) -> Result<&str, CfgTreeError> {
        self.app_name
            .as_deref()
            .ok_or(CfgTreeError::AppNameRequired)
    }

    fn effective_file_name(&self) -> Result<String, CfgTreeError> {
        if let Some(name) = &self.file_name {
            return Ok(name.clone());
        }
        Ok(file::default_file_name(self.effective_app_name()?))
    }

    fn effective_file_path(&self) -> Result<PathBuf, CfgTreeError> {
        if let Some(path) = &self.file_path {
            return Ok(path.clone());
        }
        let app = self.effective_app_name()?;
        Ok(file::settings_path(app, &self.effective_file_name()?))
    }

    /// `None` if env is disabled, or if there is neither a prefix nor an app
    /// name to derive one from.
    fn effective_env_prefix(&self) -> Option<String> {
        if !self.env_enabled {
            return None;
        }
        if let Some(prefix) = &self.env_prefix {
            return Some(prefix.clone());
        }
        let app = self.app_name.as_deref()?;
        Some(app.to_uppercase().replace('-', "_"))
    }

    fn build_input(
        &self,
        path: &Path,
        env_vars: Vec<(String, String)>,
    ) -> Result<ResolveInput, CfgTreeError> {
        let content = persist::read_text(path)?;
        Ok(ResolveInput {
            file: content.map(|c| (path.to_path_buf(), c)),
            env_vars,
            env_prefix: self.effective_env_prefix(),
            policy: self.policy,
        })
    }

    /// Resolve defaults, the settings file and the environment into a store
    /// that remembers the settings file for later saves.
    ///
    /// Environment overrides are visible through every handle but are never
    /// written back to the settings file.
    pub fn load(self) -> Result<Store, CfgTreeError> {
        self.load_with_env(std::env::vars().collect())
    }

    fn load_with_env(self, env_vars: Vec<(String, String)>) -> Result<Store, CfgTreeError> {
        let path = self.effective_file_path()?;
        let input = self.build_input(&path, env_vars)?;
        let found = input.file.is_some();
        let resolved = resolve::resolve(&self.schema, input)?;
        info!(
            path = %path.display(),
            found,
            env_overrides = !resolved.env_layer.is_empty(),
            "settings resolved"
        );
        Ok(Store::from_parts(
            self.schema,
            self.policy,
            resolved.file_layer,
            resolved.env_layer,
            Some(path),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::TestSchema;
    use std::fs;
    use tempfile::TempDir;

    fn builder() -> StoreBuilder {
        CfgTree::builder(TestSchema::build().schema)
    }

    #[test]
    fn app_name_sets_defaults() {
        let builder = builder().app_name("nzbhydra");
        assert_eq!(builder.effective_file_name().unwrap(), "nzbhydra.json");
        assert_eq!(builder.effective_env_prefix(), Some("NZBHYDRA".to_string()));
        assert!(
            builder
                .effective_file_path()
                .unwrap()
                .ends_with("nzbhydra.json")
        );
    }

    #[test]
    fn dashes_become_underscores_in_prefix() {
        let builder = builder().app_name("my-app");
        assert_eq!(builder.effective_env_prefix(), Some("MY_APP".to_string()));
    }

    #[test]
    fn override_file_name() {
        let builder = builder().app_name("nzbhydra").file_name("settings.cfg");
        assert_eq!(builder.effective_file_name().unwrap(), "settings.cfg");
    }

    #[test]
    fn override_env_prefix() {
        let builder = builder().app_name("nzbhydra").env_prefix("HYDRA");
        assert_eq!(builder.effective_env_prefix(), Some("HYDRA".to_string()));
    }

    #[test]
    fn no_env_disables_prefix() {
        let builder = builder().app_name("nzbhydra").no_env();
        assert_eq!(builder.effective_env_prefix(), None);
    }

    #[test]
    fn missing_app_name_without_path_errors() {
        let err = builder().load().unwrap_err();
        assert!(matches!(err, CfgTreeError::AppNameRequired));
    }

    #[test]
    fn policy_defaults_to_reject() {
        assert_eq!(builder().policy, InvalidValuePolicy::Reject);
        let builder = builder().invalid_values(InvalidValuePolicy::Keep);
        assert_eq!(builder.policy, InvalidValuePolicy::Keep);
    }

    #[test]
    fn load_without_file_gives_defaults_and_remembers_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let t = TestSchema::build();
        let store = CfgTree::builder(t.schema.clone())
            .file_path(&path)
            .no_env()
            .load()
            .unwrap();
        assert_eq!(store.snapshot(), t.schema.defaults());
        assert_eq!(store.file_path(), Some(path.clone()));

        t.port.set(&store, 6000).unwrap();
        store.flush().unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("6000"));
    }

    #[test]
    fn load_reads_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"searching": {"timeout": 30}}"#).unwrap();
        let t = TestSchema::build();
        let store = CfgTree::builder(t.schema.clone())
            .file_path(&path)
            .no_env()
            .load()
            .unwrap();
        assert_eq!(t.timeout.get(&store).unwrap(), 30);
        assert_eq!(t.port.get(&store).unwrap(), 5050);
    }

    #[test]
    fn env_overrides_are_read_but_never_saved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"main": {"port": 5050}}"#).unwrap();
        let t = TestSchema::build();
        let store = CfgTree::builder(t.schema.clone())
            .app_name("hydratest")
            .file_path(&path)
            .load_with_env(vec![("HYDRATEST__MAIN__PORT".into(), "6000".into())])
            .unwrap();
        assert_eq!(t.port.get(&store).unwrap(), 6000);

        crate::ops::set_value(&store, "main.host", "1.2.3.4").unwrap();
        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["main"]["port"], serde_json::json!(5050));
        assert_eq!(saved["main"]["host"], serde_json::json!("1.2.3.4"));
        // The override still applies after the save.
        assert_eq!(t.port.get(&store).unwrap(), 6000);
        assert_eq!(store.persisted()["main"]["port"], serde_json::json!(5050));
    }

    #[test]
    fn setting_an_overridden_key_persists_the_new_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let t = TestSchema::build();
        let store = CfgTree::builder(t.schema.clone())
            .file_path(&path)
            .env_prefix("HYDRATEST")
            .load_with_env(vec![("HYDRATEST__MAIN__PORT".into(), "6000".into())])
            .unwrap();

        crate::ops::set_value(&store, "main.port", "7000").unwrap();
        assert_eq!(t.port.get(&store).unwrap(), 7000);
        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["main"]["port"], serde_json::json!(7000));
    }

    #[test]
    fn load_applies_policy() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"main": {"logging": {"consolelevel": "LOUD"}}}"#).unwrap();
        let t = TestSchema::build();

        let err = CfgTree::builder(t.schema.clone())
            .file_path(&path)
            .no_env()
            .load()
            .unwrap_err();
        assert!(matches!(err, CfgTreeError::InvalidValues(_)));

        let store = CfgTree::builder(t.schema.clone())
            .file_path(&path)
            .no_env()
            .invalid_values(InvalidValuePolicy::ResetToDefault)
            .load()
            .unwrap();
        assert_eq!(t.console_level.get(&store).unwrap(), "INFO");
        assert_eq!(store.policy(), InvalidValuePolicy::ResetToDefault);
    }
}
