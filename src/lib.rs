//! Clipmill library
//!
//! Turns a remote media reference plus a user-chosen time window into one or
//! more short clips, delivered inline or via a hosted link, through a
//! chat-style interactive menu. The chat transport, metadata resolver,
//! segment extractor, and hosting uploader are ports; this crate owns the
//! selection state machine and the clip job orchestrator.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod ports;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use domain::model::{ClipArtifact, ClipJob, DeliveryMode, Segment, Selection};
pub use error::{ClipmillError, ClipmillResult};
