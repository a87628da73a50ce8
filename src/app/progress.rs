//! Per-job status message ownership
//!
//! One status message per running job, edited in place. Edit failures are
//! swallowed; the terminal deletion of the status message is the last
//! observable action of every job run.

use std::sync::Arc;

use tracing::debug;

use crate::ports::{ChatPort, MenuView, MessageRef, UserId};

/// Owns the single mutable status message of a running job
pub struct ProgressReporter {
    chat: Arc<dyn ChatPort>,
    user: UserId,
    message: Option<MessageRef>,
}

impl ProgressReporter {
    /// Send the initial status message. A transport failure here leaves the
    /// reporter silent for the rest of the job.
    pub async fn start(chat: Arc<dyn ChatPort>, user: UserId) -> Self {
        let message = chat.send_message(user, "0% · Starting…").await.ok();
        Self {
            chat,
            user,
            message,
        }
    }

    /// Edit the status message to `completed/total` with a label.
    ///
    /// Calls are sequential within one job, so at most one edit is ever in
    /// flight; failures never abort the job.
    pub async fn update(&self, completed: usize, total: usize, label: &str) {
        let Some(message) = self.message else {
            return;
        };
        let percent = if total == 0 {
            100
        } else {
            (completed * 100 / total).min(100)
        };
        let view = MenuView {
            text: format!("{}% · {}", percent, label),
            buttons: Vec::new(),
        };
        if let Err(e) = self.chat.edit_menu(self.user, message, &view).await {
            debug!("Status edit failed, ignoring: {}", e);
        }
    }

    /// Delete the status message; called on every exit path
    pub async fn finish(self) {
        if let Some(message) = self.message {
            if let Err(e) = self.chat.delete_message(self.user, message).await {
                debug!("Status delete failed, ignoring: {}", e);
            }
        }
    }
}
