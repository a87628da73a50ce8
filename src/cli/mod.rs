// CLI - Command-line interface definitions

use clap::{Parser, Subcommand};

pub mod args;

pub use args::{CheckArgs, DemoArgs, ParseArgs, PlanArgs};

/// Clipmill: interactive clip selection and job orchestration
#[derive(Parser, Debug)]
#[command(name = "clipmill", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse free-form range text into seconds
    Parse(ParseArgs),
    /// Plan clip positions for a duration, length, and count
    Plan(PlanArgs),
    /// Load and validate the configuration
    Check(CheckArgs),
    /// Run a scripted end-to-end flow against the mock adapters
    Demo(DemoArgs),
}
