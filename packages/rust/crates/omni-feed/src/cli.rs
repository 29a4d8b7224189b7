use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "omni-feed")]
#[command(about = "Incremental window loading over an ordered collection.")]
pub(crate) struct Cli {
    /// Window config file (YAML). Missing file means defaults.
    #[arg(long, global = true, default_value = "feed.yaml")]
    pub(crate) config: PathBuf,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scroll through an in-memory collection until the sentinel unmounts.
    Simulate {
        /// Items in the collection at start.
        #[arg(long, default_value_t = 95)]
        total: usize,

        /// Initial fetch limit (overrides config).
        #[arg(long)]
        initial_size: Option<usize>,

        /// Growth per sentinel entry (overrides config).
        #[arg(long)]
        step_size: Option<usize>,

        /// Append items upstream once this many are materialized.
        #[arg(long)]
        append_after: Option<usize>,

        /// Number of items to append upstream.
        #[arg(long, default_value_t = 0)]
        append: usize,

        /// Print every feed event as a JSON line on stdout.
        #[arg(long)]
        events: bool,

        /// Stop after this many fetch cycles.
        #[arg(long, default_value_t = 1000)]
        max_cycles: usize,
    },
    /// Print the effective window config as YAML.
    Config,
}
