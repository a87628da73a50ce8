// Event dispatch - Sequential inbound-event handling and job spawning

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::JobOrchestrator;
use crate::config::Config;
use crate::domain::model::{parse_range, Selection};
use crate::domain::rules::suggested_max_clips;
use crate::error::{ClipmillError, ClipmillResult};
use crate::ports::{ChatPort, MenuView, MessageRef, SourceResolver, UserId};
use crate::session::{render, SessionRegistry, SessionState};

/// A structured button press, decoded from the button's data string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonEvent {
    Duration(u32),
    CustomRange,
    Count(u32),
    Quality(String),
    Submit,
    Cancel,
    FullDownload,
}

impl ButtonEvent {
    /// Decode a button data string (`dur:10`, `fmt:137`, `submit`, ...)
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(value) = data.strip_prefix("dur:") {
            if value == "custom" {
                return Some(Self::CustomRange);
            }
            return value.parse().ok().map(Self::Duration);
        }
        if let Some(value) = data.strip_prefix("count:") {
            return value.parse().ok().map(Self::Count);
        }
        if let Some(id) = data.strip_prefix("fmt:") {
            return Some(Self::Quality(id.to_string()));
        }
        match data {
            "submit" => Some(Self::Submit),
            "cancel" => Some(Self::Cancel),
            "full" => Some(Self::FullDownload),
            _ => None,
        }
    }
}

/// One inbound event from the transport
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub user: UserId,
    pub kind: EventKind,
}

#[derive(Debug, Clone)]
pub enum EventKind {
    /// Plain text: a source reference or custom-range text
    Text(String),
    Button(ButtonEvent),
}

/// Processes inbound events sequentially and in order.
///
/// Session transitions happen on the dispatch path and are race-free per
/// user; submitted jobs run on a bounded worker pool gated by a semaphore,
/// so excess submissions queue instead of spawning unbounded workers.
pub struct Dispatcher {
    config: Arc<Config>,
    sessions: Arc<SessionRegistry>,
    resolver: Arc<dyn SourceResolver>,
    chat: Arc<dyn ChatPort>,
    orchestrator: Arc<JobOrchestrator>,
    permits: Arc<Semaphore>,
    running_jobs: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn new(
        config: Arc<Config>,
        resolver: Arc<dyn SourceResolver>,
        chat: Arc<dyn ChatPort>,
        orchestrator: Arc<JobOrchestrator>,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.worker_pool_size));
        Self {
            config,
            sessions: Arc::new(SessionRegistry::new()),
            resolver,
            chat,
            orchestrator,
            permits,
            running_jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Consume events from the transport until the channel closes
    pub async fn run(&self, mut events: mpsc::Receiver<InboundEvent>) {
        info!("Dispatcher started");
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        self.drain_jobs().await;
        info!("Dispatcher stopped");
    }

    /// Handle one inbound event; errors are reported inline to the user
    /// with the session preserved for correction.
    pub async fn handle_event(&self, event: InboundEvent) {
        let user = event.user;
        let result = match event.kind {
            EventKind::Text(text) => self.handle_text(user, &text).await,
            EventKind::Button(button) => self.handle_button(user, button).await,
        };
        if let Err(e) = result {
            debug!("Event for user {} rejected: {}", user, e);
            let _ = self.chat.send_message(user, &e.to_string()).await;
        }
    }

    /// Await all currently running jobs; used on shutdown and in tests
    pub async fn drain_jobs(&self) {
        let handles: Vec<JoinHandle<()>> =
            std::mem::take(&mut *self.running_jobs.lock().expect("job list poisoned"));
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Job task failed: {}", e);
            }
        }
    }

    async fn handle_text(&self, user: UserId, text: &str) -> ClipmillResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let awaiting_range = self
            .sessions
            .with_session(user, |s| Ok(s.state == SessionState::AwaitingCustomRange))
            .unwrap_or(false);
        if awaiting_range {
            return self.handle_range_text(user, text).await;
        }

        // Anything that is not a reference is ignored, matching the
        // transport's keep-the-chat-clean behavior
        if !text.contains("://") {
            debug!("Ignoring non-reference text from user {}", user);
            return Ok(());
        }
        self.handle_source_text(user, text).await
    }

    async fn handle_source_text(&self, user: UserId, reference: &str) -> ClipmillResult<()> {
        let replaced_menu = self.sessions.begin(user, reference)?;
        // A replaced pending session leaves its old menu behind; remove it
        // so its buttons cannot act on the new session
        if let Some(message) = replaced_menu {
            let _ = self.chat.delete_message(user, message).await;
        }

        // Single resolution attempt, timeout-bounded
        let resolved = tokio::time::timeout(
            self.config.per_call_timeout(),
            self.resolver.resolve(reference),
        )
        .await
        .unwrap_or(Err(ClipmillError::Timeout(self.config.per_call_timeout())));

        let info = match resolved {
            Ok(info) => info,
            Err(e) => {
                warn!("Resolution failed for user {}: {}", user, e);
                let _ = self.sessions.cancel(user);
                let _ = self
                    .chat
                    .send_message(user, "Failed to read the video. Try again later.")
                    .await;
                return Ok(());
            }
        };

        let view = self.sessions.with_session(user, |s| {
            s.attach_source(info)?;
            Ok(render(s, self.config.max_clips))
        })?;
        let message = self.chat.send_menu(user, &view).await?;
        self.sessions.with_session(user, |s| {
            s.menu_message = Some(message);
            Ok(())
        })?;
        Ok(())
    }

    async fn handle_range_text(&self, user: UserId, text: &str) -> ClipmillResult<()> {
        let segment = parse_range(text).ok_or_else(|| ClipmillError::ParseError {
            text: text.to_string(),
        })?;
        self.sessions
            .with_session(user, |s| s.set_range(segment, self.config.max_clip_seconds))?;
        self.rerender(user).await
    }

    async fn handle_button(&self, user: UserId, button: ButtonEvent) -> ClipmillResult<()> {
        match button {
            ButtonEvent::Duration(seconds) => {
                self.sessions
                    .with_session(user, |s| s.set_duration(seconds, self.config.max_clip_seconds))?;
                self.rerender(user).await
            }
            ButtonEvent::CustomRange => {
                self.sessions.with_session(user, |s| s.begin_custom_range())?;
                self.rerender(user).await
            }
            ButtonEvent::Count(count) => {
                self.sessions.with_session(user, |s| {
                    let cap = suggested_max_clips(s.source_duration, self.config.max_clips);
                    s.set_count(count, cap)
                })?;
                self.rerender(user).await
            }
            ButtonEvent::Quality(id) => {
                self.sessions.with_session(user, |s| s.set_quality(&id))?;
                self.rerender(user).await
            }
            ButtonEvent::Submit => {
                let submitted = self.sessions.with_session(user, |s| {
                    // A second submit while the job runs is a no-op
                    if s.state == SessionState::Submitted {
                        return Ok(None);
                    }
                    Ok(Some((s.submit()?, s.menu_message)))
                })?;
                let Some((selection, menu)) = submitted else {
                    return Ok(());
                };
                self.rerender(user).await?;
                self.spawn_job(user, selection, menu);
                Ok(())
            }
            ButtonEvent::FullDownload => {
                let (selection, menu) = self
                    .sessions
                    .with_session(user, |s| Ok((s.full_download()?, s.menu_message)))?;
                self.rerender(user).await?;
                self.spawn_job(user, selection, menu);
                Ok(())
            }
            ButtonEvent::Cancel => {
                let menu = self.sessions.cancel(user)?;
                if let Some(message) = menu {
                    let _ = self.chat.delete_message(user, message).await;
                }
                Ok(())
            }
        }
    }

    /// Edit the session's single menu message in place
    async fn rerender(&self, user: UserId) -> ClipmillResult<()> {
        let (view, message): (MenuView, Option<MessageRef>) = self
            .sessions
            .with_session(user, |s| Ok((render(s, self.config.max_clips), s.menu_message)))?;
        if let Some(message) = message {
            // A lost menu message must never wedge the session
            if let Err(e) = self.chat.edit_menu(user, message, &view).await {
                debug!("Menu edit failed, ignoring: {}", e);
            }
        }
        Ok(())
    }

    /// Run the job off the dispatch path, gated by the worker pool
    fn spawn_job(&self, user: UserId, selection: Selection, menu: Option<MessageRef>) {
        let permits = Arc::clone(&self.permits);
        let orchestrator = Arc::clone(&self.orchestrator);
        let sessions = Arc::clone(&self.sessions);
        let chat = Arc::clone(&self.chat);
        let handle = tokio::spawn(async move {
            let permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!("Worker pool closed, dropping job for user {}", user);
                    sessions.complete(user);
                    return;
                }
            };
            let _outcome = orchestrator.run(user, selection).await;
            drop(permit);
            // Submitted returns to idle once the job reports completion
            sessions.complete(user);
            if let Some(message) = menu {
                let _ = chat.delete_message(user, message).await;
            }
        });
        let mut jobs = self.running_jobs.lock().expect("job list poisoned");
        // Completed handles are pruned here so the list stays bounded by
        // the number of jobs actually in flight
        jobs.retain(|h| !h.is_finished());
        jobs.push(handle);
    }

    /// Number of job handles currently retained
    pub fn pending_jobs(&self) -> usize {
        self.running_jobs.lock().expect("job list poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_event_parse() {
        assert_eq!(ButtonEvent::parse("dur:10"), Some(ButtonEvent::Duration(10)));
        assert_eq!(ButtonEvent::parse("dur:custom"), Some(ButtonEvent::CustomRange));
        assert_eq!(ButtonEvent::parse("count:3"), Some(ButtonEvent::Count(3)));
        assert_eq!(
            ButtonEvent::parse("fmt:137"),
            Some(ButtonEvent::Quality("137".to_string()))
        );
        assert_eq!(ButtonEvent::parse("submit"), Some(ButtonEvent::Submit));
        assert_eq!(ButtonEvent::parse("cancel"), Some(ButtonEvent::Cancel));
        assert_eq!(ButtonEvent::parse("full"), Some(ButtonEvent::FullDownload));
        assert_eq!(ButtonEvent::parse("dur:zzz"), None);
        assert_eq!(ButtonEvent::parse("unknown"), None);
    }
}
