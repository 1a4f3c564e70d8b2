use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tidyscan",
    about = "Read-only disk analysis: find what is safe to clean, never delete it",
    version
)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze cleanup candidates and print a report
    Analyze {
        /// Only analyze these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Only run these plugins (repeatable)
        #[arg(long = "plugin")]
        plugins: Vec<String>,

        /// Restrict every plugin to these locations (repeatable)
        #[arg(long = "path")]
        paths: Vec<String>,

        /// Disable a plugin for this run (repeatable)
        #[arg(long = "disable")]
        disabled: Vec<String>,

        /// Length of the top-N lists
        #[arg(long, default_value_t = 20)]
        top: usize,

        /// Worker threads (defaults to every core)
        #[arg(long)]
        workers: Option<usize>,

        /// Maximum depth below each root
        #[arg(long)]
        max_depth: Option<usize>,

        /// Size threshold for the old-files list (e.g. "10MB", "1GB")
        #[arg(long, default_value = "10MB")]
        old_min_size: String,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered plugins
    Plugins {
        /// Emit the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a path may be analyzed
    Validate {
        path: String,
    },

    /// Classify a single file
    Inspect {
        path: String,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },
}
