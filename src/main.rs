use anyhow::Result;
use clap::Parser;
use exfind::config::{Config, expand_pattern, load_lookup_table};
use exfind::enrich::enrich_matches;
use exfind::report::render_report;
use exfind::search::{SearchOptions, search_files, split_search_paths};
use exfind::store::RunStore;
use exfind::telemetry::{LogMessage, log_with_context};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Personal file search utility")]
struct Cli {
    /// Regex to match; `{name}` placeholders expand from the lookup library
    #[arg(long)]
    ex: String,

    /// Paths to look in; the last is the search root, the rest apply as glob
    /// filters. Defaults to the current directory.
    #[arg(long = "path", num_args = 1.., action = clap::ArgAction::Append)]
    paths: Vec<String>,

    /// Show work: print the resolved pattern and the raw match events
    #[arg(long)]
    describe: bool,

    /// Search in binary files
    #[arg(long)]
    binary: bool,

    /// Do not set default search options (ignore files stay honored, hidden
    /// files stay excluded, matching stays case-sensitive)
    #[arg(long = "no-defaults")]
    no_defaults: bool,

    /// Write a log to a sqlite database at this path
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    exfind::telemetry::init()?;
    let cli = Cli::parse();
    let config = Config::from_env();

    // Resolve the pattern through the lookup library before anything else;
    // an unknown placeholder aborts without running a search.
    let lookup = load_lookup_table(&config.lib_dirs)?;
    let compiled = expand_pattern(&cli.ex, &lookup)?;

    if cli.describe {
        println!("{}", compiled);
    }

    let (root, globs) = split_search_paths(cli.paths)?;

    let mut options = if cli.no_defaults {
        SearchOptions::no_defaults()
    } else {
        SearchOptions::default()
    };
    options.include_binary = cli.binary;
    options.globs = globs;

    let events = search_files(&compiled, &root, &options)?;

    if cli.describe {
        println!("{}", serde_json::to_string_pretty(&events)?);
    }

    let entries = enrich_matches(&events)?;

    log_with_context(
        log::Level::Info,
        LogMessage {
            message: "Search complete".to_string(),
            module: "main",
            context: Some(vec![
                ("matched_lines", events.len().to_string()),
                ("matched_files", entries.len().to_string()),
            ]),
        },
    );

    print!("{}", render_report(&entries, config.template.as_deref())?);

    // Persistence is the one step that degrades instead of aborting: a
    // database failure is reported and the run's output stands.
    if let Some(db_path) = &cli.db {
        match RunStore::open(db_path) {
            Ok(_) => log_with_context(
                log::Level::Info,
                LogMessage {
                    message: "Run-log schema ensured".to_string(),
                    module: "store",
                    context: Some(vec![("db", db_path.display().to_string())]),
                },
            ),
            Err(e) => log_with_context(
                log::Level::Error,
                LogMessage {
                    message: format!("Run log not written: {:#}", e),
                    module: "store",
                    context: Some(vec![("db", db_path.display().to_string())]),
                },
            ),
        }
    }

    Ok(())
}
