// Mock adapters - In-memory port implementations
//
// Used by the `demo` command and by integration tests. Real transports,
// resolvers, extractors, and uploaders live outside this crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::model::{Segment, SourceInfo};
use crate::error::{ClipmillError, ClipmillResult};
use crate::ports::{ChatPort, HostingUploader, MenuView, MessageRef, SegmentExtractor, SourceResolver, UserId};

/// Resolver backed by a fixed reference-to-metadata table
#[derive(Default)]
pub struct MockResolverAdapter {
    sources: Mutex<HashMap<String, SourceInfo>>,
}

impl MockResolverAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, reference: &str, info: SourceInfo) -> Self {
        self.sources
            .lock()
            .unwrap()
            .insert(reference.to_string(), info);
        self
    }
}

#[async_trait]
impl SourceResolver for MockResolverAdapter {
    async fn resolve(&self, reference: &str) -> ClipmillResult<SourceInfo> {
        self.sources
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| {
                ClipmillError::SourceResolutionFailure(format!("unknown reference: {}", reference))
            })
    }
}

/// How a mock extraction of one segment start offset behaves
#[derive(Debug, Clone, Copy)]
pub enum ExtractBehavior {
    /// Every attempt fails
    AlwaysFail,
    /// The first `n` attempts fail, later ones succeed
    FailFirst(u32),
}

/// Extractor writing placeholder clip files of a configurable size
pub struct MockExtractorAdapter {
    clip_size_bytes: u64,
    behaviors: Mutex<HashMap<u32, (ExtractBehavior, u32)>>,
    attempts: AtomicU64,
}

impl MockExtractorAdapter {
    pub fn new(clip_size_bytes: u64) -> Self {
        Self {
            clip_size_bytes,
            behaviors: Mutex::new(HashMap::new()),
            attempts: AtomicU64::new(0),
        }
    }

    /// Configure failure behavior for segments starting at `start`
    pub fn with_behavior(self, start: u32, behavior: ExtractBehavior) -> Self {
        self.behaviors.lock().unwrap().insert(start, (behavior, 0));
        self
    }

    /// Total extraction attempts observed, across retries
    pub fn attempt_count(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SegmentExtractor for MockExtractorAdapter {
    async fn extract(
        &self,
        _reference: &str,
        _quality_id: &str,
        segment: Segment,
        dest_dir: &Path,
    ) -> ClipmillResult<PathBuf> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        {
            let mut behaviors = self.behaviors.lock().unwrap();
            if let Some((behavior, seen)) = behaviors.get_mut(&segment.start) {
                *seen += 1;
                let fail = match behavior {
                    ExtractBehavior::AlwaysFail => true,
                    ExtractBehavior::FailFirst(n) => *seen <= *n,
                };
                if fail {
                    return Err(ClipmillError::ExtractionFailure {
                        index: segment.start as usize,
                        message: "simulated extraction failure".to_string(),
                    });
                }
            }
        }
        let path = dest_dir.join(format!("clip_{}_{}.mp4", segment.start, segment.end));
        let payload = vec![0u8; self.clip_size_bytes as usize];
        tokio::fs::write(&path, payload).await?;
        Ok(path)
    }
}

/// Uploader returning deterministic links, optionally failing
#[derive(Default)]
pub struct MockUploaderAdapter {
    fail: std::sync::atomic::AtomicBool,
    uploads: Mutex<Vec<PathBuf>>,
}

impl MockUploaderAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn uploads(&self) -> Vec<PathBuf> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostingUploader for MockUploaderAdapter {
    async fn upload(&self, path: &Path) -> ClipmillResult<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ClipmillError::UploadFailure(
                "simulated upload failure".to_string(),
            ));
        }
        self.uploads.lock().unwrap().push(path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        Ok(format!("https://files.example/{}", name))
    }
}

/// One observable chat transport action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRecord {
    Sent {
        message: MessageRef,
        user: UserId,
        text: String,
    },
    MenuSent {
        message: MessageRef,
        user: UserId,
        text: String,
    },
    Edited {
        message: MessageRef,
        text: String,
        button_count: usize,
    },
    Deleted {
        message: MessageRef,
    },
    VideoSent {
        user: UserId,
        path: PathBuf,
        caption: String,
    },
}

/// Recording chat transport
#[derive(Default)]
pub struct MockChatAdapter {
    next_id: AtomicU64,
    records: Mutex<Vec<ChatRecord>>,
    fail_edits: std::sync::atomic::AtomicBool,
}

impl MockChatAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make all subsequent edit calls fail (message gone, etc.)
    pub fn break_edits(&self) {
        self.fail_edits.store(true, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<ChatRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Texts of plain messages sent, in order
    pub fn sent_texts(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                ChatRecord::Sent { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Captions of inline videos sent, in order
    pub fn video_captions(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                ChatRecord::VideoSent { caption, .. } => Some(caption),
                _ => None,
            })
            .collect()
    }

    /// Whether `message` was deleted at some point
    pub fn was_deleted(&self, message: MessageRef) -> bool {
        self.records()
            .iter()
            .any(|r| matches!(r, ChatRecord::Deleted { message: m } if *m == message))
    }

    fn allocate(&self) -> MessageRef {
        MessageRef(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl ChatPort for MockChatAdapter {
    async fn send_message(&self, user: UserId, text: &str) -> ClipmillResult<MessageRef> {
        let message = self.allocate();
        self.records.lock().unwrap().push(ChatRecord::Sent {
            message,
            user,
            text: text.to_string(),
        });
        Ok(message)
    }

    async fn send_menu(&self, user: UserId, view: &MenuView) -> ClipmillResult<MessageRef> {
        let message = self.allocate();
        self.records.lock().unwrap().push(ChatRecord::MenuSent {
            message,
            user,
            text: view.text.clone(),
        });
        Ok(message)
    }

    async fn edit_menu(
        &self,
        _user: UserId,
        message: MessageRef,
        view: &MenuView,
    ) -> ClipmillResult<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(ClipmillError::Transport("message is gone".to_string()));
        }
        self.records.lock().unwrap().push(ChatRecord::Edited {
            message,
            text: view.text.clone(),
            button_count: view.buttons.iter().map(|row| row.len()).sum(),
        });
        Ok(())
    }

    async fn delete_message(&self, _user: UserId, message: MessageRef) -> ClipmillResult<()> {
        self.records
            .lock()
            .unwrap()
            .push(ChatRecord::Deleted { message });
        Ok(())
    }

    async fn send_video(&self, user: UserId, path: &Path, caption: &str) -> ClipmillResult<()> {
        self.records.lock().unwrap().push(ChatRecord::VideoSent {
            user,
            path: path.to_path_buf(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}
