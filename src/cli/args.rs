//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the parse command
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Free-form range text, e.g. "2:32-3:23" or "00H08M10S-00H09M20S"
    pub text: String,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Total source duration in seconds
    #[arg(short, long)]
    pub duration: u32,

    /// Per-clip length in seconds
    #[arg(short, long)]
    pub length: u32,

    /// Number of clips
    #[arg(short, long, default_value = "1")]
    pub count: u32,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Configuration file path (default: clipmill.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the demo command
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Configuration file path (default: clipmill.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of clips the scripted selection requests
    #[arg(long, default_value = "2")]
    pub clips: u32,
}
