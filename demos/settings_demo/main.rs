//! # cfgtree demo application
//!
//! A sample CLI that wires [cfgtree](https://docs.rs/cfgtree) into the settings
//! of a usenet meta-search front end. It exists to demonstrate and manually
//! verify cfgtree's features, not to search anything.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example settings_demo -- show
//! cargo run --example settings_demo -- config list
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                 | How to exercise it                                                        |
//! |-------------------------|---------------------------------------------------------------------------|
//! | Schema defaults         | `cargo run --example settings_demo -- show`                               |
//! | Settings file           | `--file ./hydra.json`, or the platform config dir (`nzbhydra/nzbhydra.json`) |
//! | Env var override        | `NZBHYDRA__MAIN__PORT=6000 cargo run --example settings_demo -- show`     |
//! | Selection setting       | `cargo run --example settings_demo -- config set main.logging.consolelevel DEBUG` |
//! | Ordered multiselection  | `cargo run --example settings_demo -- config set indexers.newznab1.search_ids tvdbid,imdbid` |
//! | Indexer lookup by id    | `cargo run --example settings_demo -- indexer 1`                          |
//! | Lenient loading         | `--reset-invalid` resets bad stored values instead of failing             |
//! | `config get`            | `cargo run --example settings_demo -- config get main.port`               |
//! | `config export`         | `cargo run --example settings_demo -- config export -o backup.json`       |
//! | `config import`         | `cargo run --example settings_demo -- config import backup.json`          |
//! | Schema description      | `cargo run --example settings_demo -- describe`                           |
//! | Logging                 | `RUST_LOG=cfgtree=debug cargo run --example settings_demo -- show`        |

mod settings;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cfgtree::{CfgTree, CfgTreeError, ConfigArgs, InvalidValuePolicy, Store, StoreBuilder, ops};

use settings::Settings;

// ---------------------------------------------------------------------------
// CLI definitions
// ---------------------------------------------------------------------------

/// cfgtree demo: settings for a usenet meta-search front end.
#[derive(Parser, Debug)]
#[command(name = "settings-demo")]
struct Cli {
    /// Use this settings file instead of the platform config directory.
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Reset invalid stored values to their defaults instead of failing.
    #[arg(long, global = true)]
    reset_invalid: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a summary of the effective settings through typed handles.
    Show,
    /// Show one newznab indexer by its id (1-6).
    Indexer { id: String },
    /// Print the schema as a JSON descriptor tree.
    Describe,
    /// Manage the settings file (list, get, set, export, import).
    Config(ConfigArgs),
}

// ---------------------------------------------------------------------------
// Builder helper
// ---------------------------------------------------------------------------

/// Create a [`StoreBuilder`] for the demo app.
///
/// File: `--file` if given, else `{platform config dir}/nzbhydra.json`.
/// Env prefix: `NZBHYDRA` (auto-derived).
fn make_builder(cli: &Cli, settings: &Settings) -> StoreBuilder {
    let policy = if cli.reset_invalid {
        InvalidValuePolicy::ResetToDefault
    } else {
        InvalidValuePolicy::Reject
    };
    let builder = CfgTree::builder(settings.schema.clone())
        .app_name("nzbhydra")
        .invalid_values(policy);
    match &cli.file {
        Some(path) => builder.file_path(path),
        None => builder,
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn show(settings: &Settings, store: &Store) -> Result<(), CfgTreeError> {
    let main = &settings.main;
    let scheme = if main.ssl.get(store)? { "https" } else { "http" };
    println!(
        "Web UI        {scheme}://{}:{}",
        main.host.get(store)?,
        main.port.get(store)?
    );
    let level = main.logging.consolelevel.option(store)?;
    println!("Console log   {} ({})", level.label(), level.id());
    println!("Log file      {}", main.logging.logfile_filename.get(store)?);
    if main.cache_enabled.get(store)? {
        println!(
            "Cache         {} for {} min",
            main.cache_type.get(store)?,
            main.cache_timeout.get(store)?
        );
    }

    let searching = &settings.searching;
    println!("Timeout       {}s", searching.timeout.get(store)?);
    let queries: Vec<String> = searching
        .generate_queries
        .selected(store)?
        .iter()
        .map(|o| o.label().to_string())
        .collect();
    println!("Query gen     {}", queries.join(", "));

    let downloader = &settings.downloader;
    let (host, port) = if downloader.downloader.is_equal_to(store, "sabnzbd")? {
        (
            downloader.sabnzbd.host.get(store)?,
            downloader.sabnzbd.port.get(store)?,
        )
    } else {
        (
            downloader.nzbget.host.get(store)?,
            downloader.nzbget.port.get(store)?,
        )
    };
    println!(
        "Downloader    {} at {host}:{port}",
        downloader.downloader.get(store)?
    );

    println!("Indexers");
    for indexer in settings.indexers.all() {
        if !indexer.enabled.get(store)? {
            continue;
        }
        let name = indexer
            .name
            .get(store)?
            .unwrap_or_else(|| indexer.category.name().to_string());
        let ids = indexer.search_ids.get(store)?;
        println!("  {name:<12} ids: {}", ids.join(" > "));
    }
    Ok(())
}

fn show_indexer(settings: &Settings, store: &Store, id: &str) -> Result<(), CfgTreeError> {
    let Some(newznab) = settings.indexers.newznab_by_id(id) else {
        eprintln!("No newznab indexer with id {id} (expected 1-6)");
        std::process::exit(1);
    };
    let indexer = &newznab.indexer;
    println!("{}", indexer.category.title());
    println!("  enabled     {}", indexer.enabled.get(store)?);
    println!(
        "  host        {}",
        indexer.host.get(store)?.unwrap_or_else(|| "<not set>".into())
    );
    let apikey = newznab.apikey.get(store)?;
    println!(
        "  apikey      {}",
        if apikey.is_some() { "********" } else { "<not set>" }
    );
    println!("  search ids  {}", indexer.search_ids.get(store)?.join(" > "));
    println!("  score       {}", indexer.score.get(store)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::build().unwrap_or_else(|e| {
        eprintln!("Invalid settings schema:\n{e}");
        std::process::exit(1);
    });

    if let Commands::Describe = cli.command {
        match serde_json::to_string_pretty(&settings.schema.describe()) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Failed to describe schema:\n{e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let store = make_builder(&cli, &settings).load().unwrap_or_else(|e| {
        eprintln!("Failed to load settings:\n{e}");
        std::process::exit(1);
    });

    let result = match cli.command {
        Commands::Show => show(&settings, &store),
        Commands::Indexer { id } => show_indexer(&settings, &store, &id),
        Commands::Describe => Ok(()),
        Commands::Config(args) => {
            ops::handle(&store, &args.into_action()).map(|result| println!("{result}"))
        }
    };
    if let Err(e) = result {
        eprintln!("Settings error:\n{e}");
        std::process::exit(1);
    }
}
