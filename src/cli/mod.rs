//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "factotum")]
#[command(about = "Factotum - conversational work orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a message without running any workflow
    Classify {
        /// Message text
        message: String,
    },

    /// Classify a message, run the resulting workflow, and report status
    Process {
        /// Message text
        message: String,

        /// Seconds to wait for the workflow to reach a terminal state
        #[arg(long, default_value = "60")]
        wait_secs: u64,
    },

    /// Show the workflow templates behind the decision table
    Templates,
}

/// Print an error in the selected output mode and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{err:#}") }));
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}
