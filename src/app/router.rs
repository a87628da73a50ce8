//! Size-based output routing
//!
//! Applies the threshold policy from `domain::rules`: strictly below the
//! limit the clip's bytes go inline over the reply channel, at or above it
//! the clip goes to the hosting uploader. The local copy is deleted once the
//! delivery attempt resolves, success or failure.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::domain::model::{ClipArtifact, DeliveryMode};
use crate::domain::rules::delivery_for_size;
use crate::error::ClipmillError;
use crate::ports::{ChatPort, HostingUploader, UserId};

pub struct OutputRouter {
    chat: Arc<dyn ChatPort>,
    uploader: Arc<dyn HostingUploader>,
    threshold_bytes: u64,
    upload_timeout: Duration,
}

impl OutputRouter {
    pub fn new(
        chat: Arc<dyn ChatPort>,
        uploader: Arc<dyn HostingUploader>,
        threshold_bytes: u64,
        upload_timeout: Duration,
    ) -> Self {
        Self {
            chat,
            uploader,
            threshold_bytes,
            upload_timeout,
        }
    }

    /// Deliver one produced clip and record its outcome.
    ///
    /// Never fails the caller: a delivery problem becomes a distinct failure
    /// marker on the artifact.
    pub async fn route(&self, user: UserId, path: PathBuf, caption: &str) -> ClipArtifact {
        let size_bytes = tokio::fs::metadata(&path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        let delivery = delivery_for_size(size_bytes, self.threshold_bytes);
        let mut artifact = ClipArtifact {
            local_path: path.clone(),
            size_bytes,
            delivery,
            hosted_link: None,
            failure_reason: None,
        };

        match delivery {
            DeliveryMode::Inline => {
                if let Err(e) = self.chat.send_video(user, &path, caption).await {
                    warn!("Inline delivery failed: {}", e);
                    artifact.failure_reason = Some(format!("send failed: {}", e));
                }
            }
            DeliveryMode::Hosted => {
                let attempt =
                    tokio::time::timeout(self.upload_timeout, self.uploader.upload(&path)).await;
                match attempt {
                    Ok(Ok(link)) => artifact.hosted_link = Some(link),
                    Ok(Err(e)) => {
                        warn!("Upload failed: {}", e);
                        artifact.failure_reason = Some(format!("upload failed: {}", e));
                    }
                    Err(_) => {
                        let e = ClipmillError::Timeout(self.upload_timeout);
                        warn!("Upload timed out after {:?}", self.upload_timeout);
                        artifact.failure_reason = Some(format!("upload failed: {}", e));
                    }
                }
            }
        }

        // The attempt has resolved either way; drop the local copy now. The
        // job workspace removes anything this misses.
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Failed to remove local copy {}: {}", path.display(), e);
        }

        artifact
    }
}
