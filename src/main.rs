//! Clipmill CLI
//!
//! Interactive clip selection and clip job orchestration for remote media.
//! The `parse` and `plan` commands expose the pure domain pieces for
//! inspection; `check` validates configuration; `demo` drives a scripted
//! selection-and-job flow against the in-memory mock adapters.
//!
//! # Usage
//!
//! ```bash
//! clipmill parse "2:32-3:23"
//! clipmill plan --duration 600 --length 30 --count 3
//! clipmill check --config clipmill.toml
//! clipmill demo --clips 2
//! ```

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use clipmill::adapters::{
    MockChatAdapter, MockExtractorAdapter, MockResolverAdapter, MockUploaderAdapter,
};
use clipmill::app::JobOrchestrator;
use clipmill::cli::{CheckArgs, Cli, Commands, DemoArgs, ParseArgs, PlanArgs};
use clipmill::config::Config;
use clipmill::dispatch::{ButtonEvent, Dispatcher, EventKind, InboundEvent};
use clipmill::domain::model::{parse_range, QualityOption, SourceInfo};
use clipmill::domain::rules::plan_segments;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Parse(args) => execute_parse_command(args)?,
        Commands::Plan(args) => execute_plan_command(args)?,
        Commands::Check(args) => execute_check_command(args)?,
        Commands::Demo(args) => execute_demo_command(args).await?,
    }
    Ok(())
}

/// Parse range text and print the result as JSON
fn execute_parse_command(args: ParseArgs) -> Result<()> {
    let segment = parse_range(&args.text)
        .ok_or_else(|| anyhow::anyhow!("could not parse a range from {:?}", args.text))?;
    let out = serde_json::json!({
        "start": segment.start,
        "end": segment.end,
        "length": segment.len_seconds(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Plan segments and print them as JSON
fn execute_plan_command(args: PlanArgs) -> Result<()> {
    let segments = plan_segments(args.duration, args.length, args.count);
    println!("{}", serde_json::to_string_pretty(&segments)?);
    Ok(())
}

/// Load, validate, and echo the effective configuration
fn execute_check_command(args: CheckArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    println!("{}", toml::to_string_pretty(&config)?);
    info!("Configuration is valid");
    Ok(())
}

/// Drive a scripted selection and job against the mock adapters
async fn execute_demo_command(args: DemoArgs) -> Result<()> {
    let config = Arc::new(Config::load(args.config.as_deref())?);
    let reference = "https://example.com/v/demo";

    let resolver = Arc::new(MockResolverAdapter::new().with_source(
        reference,
        SourceInfo {
            title: "Demo video".to_string(),
            duration_seconds: 600,
            qualities: vec![
                QualityOption::new("137", 1080, "mp4"),
                QualityOption::new("136", 720, "mp4"),
            ],
        },
    ));
    let extractor = Arc::new(MockExtractorAdapter::new(1024));
    let uploader = Arc::new(MockUploaderAdapter::new());
    let chat = Arc::new(MockChatAdapter::new());

    let orchestrator = Arc::new(JobOrchestrator::new(
        resolver.clone(),
        extractor.clone(),
        uploader.clone(),
        chat.clone(),
        config.clone(),
    ));
    let dispatcher = Dispatcher::new(config, resolver, chat.clone(), orchestrator);

    let user = 1;
    let script = vec![
        EventKind::Text(reference.to_string()),
        EventKind::Button(ButtonEvent::Duration(10)),
        EventKind::Button(ButtonEvent::Quality("137".to_string())),
        EventKind::Button(ButtonEvent::Count(args.clips)),
        EventKind::Button(ButtonEvent::Submit),
    ];
    for kind in script {
        dispatcher.handle_event(InboundEvent { user, kind }).await;
    }
    dispatcher.drain_jobs().await;

    for record in chat.records() {
        println!("{:?}", record);
    }
    Ok(())
}
