//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::commands;
use super::output::{Output, OutputFormat};
use crate::logging;

/// Log verbosity, from quietest to noisiest
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Parser)]
#[command(name = "depmap")]
#[command(author, version, about = "Dependency analysis for task lists")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Log level (overrides the DEPMAP_LOG environment variable)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect dependencies among tasks
    Detect {
        /// Task list (JSON or YAML)
        tasks: PathBuf,

        /// Detection context: shared resources, default assignee
        #[arg(long)]
        context: Option<PathBuf>,

        /// Alternate detector ruleset (TOML)
        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// Show structural metrics for a relation set
    Graph {
        /// Relation list (JSON or YAML)
        relations: PathBuf,

        /// Task list supplying the full node universe, so tasks without
        /// relations are reported as isolated
        #[arg(long)]
        tasks: Option<PathBuf>,
    },

    /// Find circular dependencies
    Cycles {
        /// Relation list (JSON or YAML)
        relations: PathBuf,
    },

    /// Compute a topological execution order
    Order {
        /// Relation list (JSON or YAML)
        relations: PathBuf,
    },

    /// Compute the critical path through the dependency graph
    CriticalPath {
        /// Relation list (JSON or YAML)
        relations: PathBuf,

        /// Task list supplying duration estimates and the node universe
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// Duration map (task id -> hours) overriding task estimates
        #[arg(long)]
        durations: Option<PathBuf>,
    },

    /// Run the full pipeline: detect, graph, cycles, order, critical path
    Analyze {
        /// Task list (JSON or YAML)
        tasks: PathBuf,

        /// Detection context: shared resources, default assignee
        #[arg(long)]
        context: Option<PathBuf>,

        /// Alternate detector ruleset (TOML)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level);
    let output = Output::new(cli.format);

    match cli.command {
        Commands::Detect { tasks, context, rules } => {
            commands::detect(&output, &tasks, context.as_deref(), rules.as_deref())
        }
        Commands::Graph { relations, tasks } => {
            commands::graph(&output, &relations, tasks.as_deref())
        }
        Commands::Cycles { relations } => commands::cycles(&output, &relations),
        Commands::Order { relations } => commands::order(&output, &relations),
        Commands::CriticalPath { relations, tasks, durations } => {
            commands::critical(&output, &relations, tasks.as_deref(), durations.as_deref())
        }
        Commands::Analyze { tasks, context, rules } => {
            commands::analyze(&output, &tasks, context.as_deref(), rules.as_deref())
        }
    }
}
