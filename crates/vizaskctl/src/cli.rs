//! CLI - Command-line argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vizask_shared::Mode;

/// Ask an analytics backend about a filtered dashboard view
#[derive(Parser, Debug)]
#[command(name = "vizaskctl")]
#[command(about = "vizask - AI analysis for filtered dashboard views", long_about = None)]
#[command(version = env!("VIZASK_VERSION"))]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides $VIZASK_CONFIG and the default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dashboard fixture (JSON) to read filters and data from
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,

    /// Backend endpoint (overrides config and $VIZASK_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Data view name (overrides config and $VIZASK_VIEW)
    #[arg(long, global = true)]
    pub view: Option<String>,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze the report as currently filtered
    Report,

    /// Ask the assistant a question about the filtered data
    Ask {
        /// The question (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Interactive chat; /report analyzes, /quit exits
    Chat,

    /// Show collected filters, enrichment and the request body without sending
    Preview {
        #[arg(long, value_enum, default_value_t = ModeArg::Report)]
        mode: ModeArg,

        /// Question for assistant mode
        #[arg(long, default_value = "")]
        question: String,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Report,
    Assistant,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Report => Mode::AnalyzeReport,
            ModeArg::Assistant => Mode::AiAssistant,
        }
    }
}
