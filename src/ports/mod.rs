// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::model::{Segment, SourceInfo};
use crate::error::ClipmillResult;

/// Identity of the user a session or message belongs to
pub type UserId = i64;

/// Identifier of one message owned by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(pub u64);

/// A single menu button: label plus the event data it emits when pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Rendered menu content: text plus button rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    pub text: String,
    pub buttons: Vec<Vec<Button>>,
}

/// Port for resolving source metadata
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Resolve duration, title, and available qualities for a reference
    async fn resolve(&self, reference: &str) -> ClipmillResult<SourceInfo>;
}

/// Port for materializing one segment as a local file
#[async_trait]
pub trait SegmentExtractor: Send + Sync {
    /// Extract `segment` of `reference` at `quality_id` into `dest_dir`
    async fn extract(
        &self,
        reference: &str,
        quality_id: &str,
        segment: Segment,
        dest_dir: &Path,
    ) -> ClipmillResult<PathBuf>;
}

/// Port for hosting a file externally
#[async_trait]
pub trait HostingUploader: Send + Sync {
    /// Upload a local file and return a shareable link
    async fn upload(&self, path: &Path) -> ClipmillResult<String>;
}

/// Port for the chat transport
#[async_trait]
pub trait ChatPort: Send + Sync {
    /// Send a plain text message
    async fn send_message(&self, user: UserId, text: &str) -> ClipmillResult<MessageRef>;

    /// Send a menu message with buttons
    async fn send_menu(&self, user: UserId, view: &MenuView) -> ClipmillResult<MessageRef>;

    /// Edit an existing message in place
    async fn edit_menu(
        &self,
        user: UserId,
        message: MessageRef,
        view: &MenuView,
    ) -> ClipmillResult<()>;

    /// Delete a message
    async fn delete_message(&self, user: UserId, message: MessageRef) -> ClipmillResult<()>;

    /// Hand a local video file to the reply channel
    async fn send_video(&self, user: UserId, path: &Path, caption: &str) -> ClipmillResult<()>;
}
