//! Settings file discovery.
//!
//! An application's settings live in a single JSON file. Unless a path is
//! given explicitly, it is `{platform config dir}/{file_name}`, where the
//! platform directory comes from [`directories::ProjectDirs`]
//! (e.g. `~/.config/{app_name}/` on Linux).

use std::path::PathBuf;

/// Default file name for an application: `"{app_name}.json"`.
pub fn default_file_name(app_name: &str) -> String {
    format!("{app_name}.json")
}

/// The platform config directory for `app_name`, or `None` if no home
/// directory can be determined.
pub fn platform_dir(app_name: &str) -> Option<PathBuf> {
    let proj = directories::ProjectDirs::from("", "", app_name)?;
    Some(proj.config_dir().to_path_buf())
}

/// Where the settings file for `app_name` lives. Falls back to `file_name`
/// relative to the working directory when there is no platform directory.
pub fn settings_path(app_name: &str, file_name: &str) -> PathBuf {
    match platform_dir(app_name) {
        Some(dir) => dir.join(file_name),
        None => {
            tracing::warn!(app = app_name, "no platform config directory, using working directory");
            PathBuf::from(file_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_from_app_name() {
        assert_eq!(default_file_name("nzbhydra"), "nzbhydra.json");
    }

    #[test]
    fn settings_path_ends_with_file_name() {
        let path = settings_path("cfgtree-test-app", "custom.json");
        assert!(path.ends_with("custom.json"));
    }

    #[test]
    fn platform_dir_mentions_app_name() {
        // Some CI sandboxes have no home directory; nothing to check there.
        if let Some(dir) = platform_dir("cfgtree-test-app") {
            assert!(dir.to_string_lossy().contains("cfgtree-test-app"));
        }
    }
}
