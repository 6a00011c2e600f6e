//! Clap adapter for cfgtree.
//!
//! Compiled only when the `clap` Cargo feature is enabled (on by default).
//! [`ConfigArgs`] and [`ConfigSubcommand`] can be embedded in an application's
//! own `#[derive(Parser)]` to get `config list|get|set|export|import`
//! subcommands. [`ConfigArgs::into_action()`] converts the parsed arguments into
//! a [`ConfigAction`](crate::ConfigAction), which [`ops::handle`](crate::ops::handle)
//! runs against a store.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::types::ConfigAction;

/// Clap-derived args for the `config` subcommand group.
///
/// ```ignore
/// #[derive(Subcommand)]
/// enum Commands {
///     Config(ConfigArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigSubcommand>,
}

/// Available config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Show every setting with its current value.
    List,
    /// Show the value and documentation for a setting.
    Get {
        /// Dotted setting path (e.g. "main.logging.consolelevel").
        key: String,
    },
    /// Change a setting and save the settings file.
    Set {
        /// Dotted setting path (e.g. "main.port").
        key: String,
        /// Value to set. Lists take a JSON array or comma-separated ids.
        value: String,
    },
    /// Print the whole settings document, or write it to a file.
    Export {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all settings with the contents of a JSON file.
    Import {
        /// JSON document to import.
        input: PathBuf,
    },
}

impl ConfigArgs {
    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    ///
    /// Bare `config` (no subcommand) and explicit `config list` both map to
    /// `ConfigAction::List`.
    pub fn into_action(self) -> ConfigAction {
        match self.action {
            None | Some(ConfigSubcommand::List) => ConfigAction::List,
            Some(ConfigSubcommand::Get { key }) => ConfigAction::Get { key },
            Some(ConfigSubcommand::Set { key, value }) => ConfigAction::Set { key, value },
            Some(ConfigSubcommand::Export { output }) => ConfigAction::Export { output },
            Some(ConfigSubcommand::Import { input }) => ConfigAction::Import { input },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    /// Wrapper so we can use `try_parse_from` on the subcommand.
    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ConfigArgs,
    }

    fn parse(args: &[&str]) -> ConfigArgs {
        TestCli::try_parse_from(args).unwrap().config
    }

    #[test]
    fn parse_bare_config_is_list() {
        assert_eq!(parse(&["test"]).into_action(), ConfigAction::List);
    }

    #[test]
    fn parse_explicit_list() {
        assert_eq!(parse(&["test", "list"]).into_action(), ConfigAction::List);
    }

    #[test]
    fn parse_get() {
        let action = parse(&["test", "get", "main.logging.consolelevel"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Get {
                key: "main.logging.consolelevel".into()
            }
        );
    }

    #[test]
    fn parse_set() {
        let action = parse(&["test", "set", "main.port", "6000"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Set {
                key: "main.port".into(),
                value: "6000".into(),
            }
        );
    }

    #[test]
    fn parse_set_list_value() {
        let action = parse(&["test", "set", "indexers.newznab1.search_ids", "tvdbid,rid"])
            .into_action();
        assert_eq!(
            action,
            ConfigAction::Set {
                key: "indexers.newznab1.search_ids".into(),
                value: "tvdbid,rid".into(),
            }
        );
    }

    #[test]
    fn parse_export_to_stdout() {
        let action = parse(&["test", "export"]).into_action();
        assert_eq!(action, ConfigAction::Export { output: None });
    }

    #[test]
    fn parse_export_with_output() {
        let action = parse(&["test", "export", "-o", "backup.json"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Export {
                output: Some(PathBuf::from("backup.json"))
            }
        );
        let action = parse(&["test", "export", "--output", "/tmp/b.json"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Export {
                output: Some(PathBuf::from("/tmp/b.json"))
            }
        );
    }

    #[test]
    fn parse_import() {
        let action = parse(&["test", "import", "restore.json"]).into_action();
        assert_eq!(
            action,
            ConfigAction::Import {
                input: PathBuf::from("restore.json")
            }
        );
    }

    #[test]
    fn import_requires_a_file() {
        assert!(TestCli::try_parse_from(["test", "import"]).is_err());
    }

    #[test]
    fn invalid_subcommand_errors() {
        assert!(TestCli::try_parse_from(["test", "nope"]).is_err());
    }
}
