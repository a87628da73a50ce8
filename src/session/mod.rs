// Selection sessions - Per-user menu state machine

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::model::{QualityOption, Segment, SegmentsSpec, Selection, SourceInfo};
use crate::domain::rules::normalize_qualities;
use crate::error::{ClipmillError, ClipmillResult};
use crate::ports::{MessageRef, UserId};

pub mod render;

pub use render::render;

/// State of one user's in-progress selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingSource,
    AwaitingSelections,
    AwaitingCustomRange,
    Ready,
    Submitted,
}

/// Per-user in-progress selection state prior to submission.
///
/// Exclusively owned by that user's event-handling path; the duration and
/// custom-range fields are mutually exclusive, and the clip count is forced
/// to one whenever a range is set.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    pub user: UserId,
    pub source: String,
    pub source_title: String,
    pub source_duration: u32,
    pub qualities: Vec<QualityOption>,
    pub selected_duration: Option<u32>,
    pub selected_range: Option<Segment>,
    pub selected_count: Option<u32>,
    pub selected_quality: Option<String>,
    pub state: SessionState,
    /// The single mutable menu/status message, edited in place
    pub menu_message: Option<MessageRef>,
}

impl SelectionSession {
    /// Create a session for a freshly received source reference
    pub fn new(user: UserId, source: impl Into<String>) -> Self {
        Self {
            user,
            source: source.into(),
            source_title: String::new(),
            source_duration: 0,
            qualities: Vec::new(),
            selected_duration: None,
            selected_range: None,
            selected_count: None,
            selected_quality: None,
            state: SessionState::AwaitingSource,
            menu_message: None,
        }
    }

    /// Attach resolved metadata and move to selection
    pub fn attach_source(&mut self, info: SourceInfo) -> ClipmillResult<()> {
        if self.state != SessionState::AwaitingSource {
            return Err(ClipmillError::SelectionConflict(
                "source already resolved".to_string(),
            ));
        }
        self.source_title = info.title;
        self.source_duration = info.duration_seconds;
        self.qualities = normalize_qualities(info.qualities);
        self.state = SessionState::AwaitingSelections;
        Ok(())
    }

    /// Set the per-clip duration from a duration button.
    ///
    /// Replaces any previously accepted custom range; the two are mutually
    /// exclusive.
    pub fn set_duration(&mut self, seconds: u32, max_clip_seconds: u32) -> ClipmillResult<()> {
        match self.state {
            SessionState::AwaitingSelections | SessionState::Ready => {}
            SessionState::AwaitingCustomRange => {
                return Err(ClipmillError::SelectionConflict(
                    "duration buttons are disabled while entering a custom range".to_string(),
                ))
            }
            _ => return Err(ClipmillError::SessionExpired),
        }
        if seconds == 0 || seconds > max_clip_seconds {
            return Err(ClipmillError::SelectionConflict(format!(
                "duration must be between 1 and {} seconds",
                max_clip_seconds
            )));
        }
        self.selected_duration = Some(seconds);
        self.selected_range = None;
        self.refresh_readiness();
        Ok(())
    }

    /// Enter custom-range entry; the count is forced to one
    pub fn begin_custom_range(&mut self) -> ClipmillResult<()> {
        match self.state {
            SessionState::AwaitingSelections | SessionState::Ready => {}
            _ => return Err(ClipmillError::SessionExpired),
        }
        self.selected_count = Some(1);
        self.state = SessionState::AwaitingCustomRange;
        Ok(())
    }

    /// Accept a parsed custom range and return to selection
    pub fn set_range(&mut self, segment: Segment, max_clip_seconds: u32) -> ClipmillResult<()> {
        if self.state != SessionState::AwaitingCustomRange {
            return Err(ClipmillError::SelectionConflict(
                "no custom range was requested".to_string(),
            ));
        }
        if segment.len_seconds() > max_clip_seconds {
            return Err(ClipmillError::SelectionConflict(format!(
                "range length {}s exceeds the {}s maximum",
                segment.len_seconds(),
                max_clip_seconds
            )));
        }
        self.selected_range = Some(segment);
        self.selected_duration = None;
        self.selected_count = Some(1);
        self.state = SessionState::AwaitingSelections;
        self.refresh_readiness();
        Ok(())
    }

    /// Set the clip count from a count button
    pub fn set_count(&mut self, count: u32, max_clips: u32) -> ClipmillResult<()> {
        match self.state {
            SessionState::AwaitingSelections | SessionState::Ready => {}
            SessionState::AwaitingCustomRange => {
                return Err(ClipmillError::SelectionConflict(
                    "count is fixed to one clip for a custom range".to_string(),
                ))
            }
            _ => return Err(ClipmillError::SessionExpired),
        }
        if self.selected_range.is_some() && count != 1 {
            return Err(ClipmillError::SelectionConflict(
                "count is fixed to one clip for a custom range".to_string(),
            ));
        }
        if count == 0 || count > max_clips {
            return Err(ClipmillError::SelectionConflict(format!(
                "count must be between 1 and {}",
                max_clips
            )));
        }
        self.selected_count = Some(count);
        self.refresh_readiness();
        Ok(())
    }

    /// Set the quality from a quality button
    pub fn set_quality(&mut self, quality_id: &str) -> ClipmillResult<()> {
        match self.state {
            SessionState::AwaitingSelections
            | SessionState::AwaitingCustomRange
            | SessionState::Ready => {}
            _ => return Err(ClipmillError::SessionExpired),
        }
        if !self.qualities.iter().any(|q| q.id == quality_id) {
            return Err(ClipmillError::SelectionConflict(format!(
                "unknown quality: {}",
                quality_id
            )));
        }
        self.selected_quality = Some(quality_id.to_string());
        self.refresh_readiness();
        Ok(())
    }

    /// Submit the selection; accepted only from `Ready`.
    ///
    /// Returns the immutable snapshot handed to the orchestrator. A submit
    /// while `Submitted` is reported as a conflict the caller may ignore.
    pub fn submit(&mut self) -> ClipmillResult<Selection> {
        match self.state {
            SessionState::Ready => {}
            SessionState::Submitted => {
                return Err(ClipmillError::SelectionConflict(
                    "a job for this selection is already running".to_string(),
                ))
            }
            _ => {
                return Err(ClipmillError::SelectionConflict(
                    "pick a duration or range, a count, and a quality first".to_string(),
                ))
            }
        }
        let segments = match (self.selected_range, self.selected_duration) {
            (Some(range), _) => SegmentsSpec::Explicit(range),
            (None, Some(clip_len)) => SegmentsSpec::Planned {
                clip_len,
                count: self.selected_count.unwrap_or(1),
            },
            (None, None) => {
                return Err(ClipmillError::SelectionConflict(
                    "no duration or range selected".to_string(),
                ))
            }
        };
        self.state = SessionState::Submitted;
        Ok(self.snapshot(segments))
    }

    /// Snapshot for a full-source download job
    pub fn full_download(&mut self) -> ClipmillResult<Selection> {
        match self.state {
            SessionState::AwaitingSelections
            | SessionState::AwaitingCustomRange
            | SessionState::Ready => {}
            SessionState::Submitted => {
                return Err(ClipmillError::SelectionConflict(
                    "a job for this selection is already running".to_string(),
                ))
            }
            _ => return Err(ClipmillError::SessionExpired),
        }
        self.state = SessionState::Submitted;
        Ok(self.snapshot(SegmentsSpec::Full))
    }

    fn snapshot(&self, segments: SegmentsSpec) -> Selection {
        Selection {
            source: self.source.clone(),
            title: self.source_title.clone(),
            quality_id: self
                .selected_quality
                .clone()
                .unwrap_or_else(|| "best".to_string()),
            segments,
        }
    }

    /// Upgrade to `Ready` once duration-or-range, count, and quality are set
    fn refresh_readiness(&mut self) {
        let window_set = self.selected_duration.is_some() || self.selected_range.is_some();
        if window_set && self.selected_count.is_some() && self.selected_quality.is_some() {
            self.state = SessionState::Ready;
        }
    }
}

/// Concurrent-safe map from user identity to their owned session.
///
/// An absent entry is the `Idle` state; at most one non-idle session exists
/// per user. Critical sections never hold the lock across an await.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<UserId, SelectionSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session for a source reference.
    ///
    /// A pending (not yet submitted) session is replaced and its menu
    /// message is returned so the caller can delete it; a `Submitted`
    /// session is protected until its job completes.
    pub fn begin(&self, user: UserId, source: &str) -> ClipmillResult<Option<MessageRef>> {
        let mut sessions = self.inner.lock().expect("session registry poisoned");
        if let Some(existing) = sessions.get(&user) {
            if existing.state == SessionState::Submitted {
                return Err(ClipmillError::SelectionConflict(
                    "wait for the running job to finish".to_string(),
                ));
            }
        }
        let replaced = sessions.insert(user, SelectionSession::new(user, source));
        Ok(replaced.and_then(|s| s.menu_message))
    }

    /// Run a closure against the user's session, or `SessionExpired`
    pub fn with_session<R>(
        &self,
        user: UserId,
        f: impl FnOnce(&mut SelectionSession) -> ClipmillResult<R>,
    ) -> ClipmillResult<R> {
        let mut sessions = self.inner.lock().expect("session registry poisoned");
        let session = sessions.get_mut(&user).ok_or(ClipmillError::SessionExpired)?;
        f(session)
    }

    /// Job completion: `Submitted` returns to idle (the entry is removed)
    pub fn complete(&self, user: UserId) {
        let mut sessions = self.inner.lock().expect("session registry poisoned");
        if let Some(session) = sessions.get(&user) {
            if session.state == SessionState::Submitted {
                sessions.remove(&user);
            }
        }
    }

    /// Cancel pending selection state. Returns the menu message to delete.
    ///
    /// A cancel never affects a running job; a `Submitted` session stays.
    pub fn cancel(&self, user: UserId) -> ClipmillResult<Option<MessageRef>> {
        let mut sessions = self.inner.lock().expect("session registry poisoned");
        match sessions.get(&user) {
            None => Err(ClipmillError::SessionExpired),
            Some(session) if session.state == SessionState::Submitted => {
                Err(ClipmillError::SelectionConflict(
                    "the running job cannot be cancelled".to_string(),
                ))
            }
            Some(_) => {
                let session = sessions.remove(&user).expect("checked above");
                Ok(session.menu_message)
            }
        }
    }

    /// Whether the user currently has any non-idle session
    pub fn is_active(&self, user: UserId) -> bool {
        self.inner
            .lock()
            .expect("session registry poisoned")
            .contains_key(&user)
    }
}
