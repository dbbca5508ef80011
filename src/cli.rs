use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for daviz
#[derive(Parser, Debug, Default)]
#[command(version, about = "daviz - data visualization in the terminal")]
pub struct Args {
    /// Dataset to import on startup (csv, tsv, psv, parquet, json, jsonl, ndjson)
    pub path: Option<PathBuf>,

    /// Skip this many lines when reading a file
    #[arg(long = "skip-lines")]
    pub skip_lines: Option<usize>,

    /// Skip this many rows when reading a file
    #[arg(long = "skip-rows")]
    pub skip_rows: Option<usize>,

    /// Specify that the file has no header
    #[arg(long = "no-header")]
    pub no_header: Option<bool>,

    /// Specify the delimiter to use when reading a file
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Log level for the log file (error, warn, info, debug, trace).
    /// RUST_LOG takes precedence when set.
    #[arg(long = "log-level")]
    pub log_level: Option<String>,

    /// Clear all cache data and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Write a default config.toml to the config directory and exit
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Overwrite an existing config file when used with --generate-config
    #[arg(long = "force", action, requires = "generate_config")]
    pub force: bool,
}
