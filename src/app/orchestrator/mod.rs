// Job orchestrator - Executes one submitted selection

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::app::janitor::JobWorkspace;
use crate::app::progress::ProgressReporter;
use crate::app::router::OutputRouter;
use crate::config::Config;
use crate::domain::model::{
    ClipJob, JobOutcome, JobStatus, Segment, SegmentsSpec, Selection, SourceInfo,
};
use crate::domain::rules::plan_segments;
use crate::error::{ClipmillError, ClipmillResult};
use crate::ports::{ChatPort, HostingUploader, SegmentExtractor, SourceResolver, UserId};
use crate::utils::{safe_filename, truncate_for_display};

/// Uniform retry policy for transient external failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub per_attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Run `op` until it succeeds, attempts are exhausted, or an attempt
    /// times out. A timeout counts as that attempt's failure.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> ClipmillResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClipmillResult<T>>,
    {
        let mut last_error = ClipmillError::Timeout(self.per_attempt_timeout);
        for attempt in 1..=self.max_attempts.max(1) {
            match tokio::time::timeout(self.per_attempt_timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    warn!("Attempt {}/{} failed: {}", attempt, self.max_attempts, e);
                    last_error = e;
                }
                Err(_) => {
                    warn!(
                        "Attempt {}/{} timed out after {:?}",
                        attempt, self.max_attempts, self.per_attempt_timeout
                    );
                    last_error = ClipmillError::Timeout(self.per_attempt_timeout);
                }
            }
        }
        Err(last_error)
    }
}

/// Executes a submitted selection: resolves the source, extracts segments
/// with retries, reports progress, routes artifacts, and cleans up
/// unconditionally. One instance serves all users; each run is independent.
pub struct JobOrchestrator {
    resolver: Arc<dyn SourceResolver>,
    extractor: Arc<dyn SegmentExtractor>,
    uploader: Arc<dyn HostingUploader>,
    chat: Arc<dyn ChatPort>,
    config: Arc<Config>,
    next_job_id: AtomicU64,
    jobs_completed: AtomicU64,
}

impl JobOrchestrator {
    pub fn new(
        resolver: Arc<dyn SourceResolver>,
        extractor: Arc<dyn SegmentExtractor>,
        uploader: Arc<dyn HostingUploader>,
        chat: Arc<dyn ChatPort>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            resolver,
            extractor,
            uploader,
            chat,
            config,
            next_job_id: AtomicU64::new(0),
            jobs_completed: AtomicU64::new(0),
        }
    }

    /// Total jobs that have run to completion, any outcome
    pub fn completed_jobs(&self) -> u64 {
        self.jobs_completed.load(Ordering::SeqCst)
    }

    /// Run one job to completion.
    ///
    /// Faults at the job boundary are caught and summarized to the user in
    /// truncated form; workspace cleanup and the terminal deletion of the
    /// status message happen on every exit path.
    pub async fn run(&self, user: UserId, selection: Selection) -> JobOutcome {
        let job_id = self.next_job_id.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Job {} started for user {}", job_id, user);

        let reporter = ProgressReporter::start(Arc::clone(&self.chat), user).await;
        let outcome = match self.run_inner(user, job_id, &selection, &reporter).await {
            Ok(outcome) => outcome,
            Err(fault) => {
                error!("Job {} faulted: {}", job_id, fault);
                let text = format!(
                    "Error during processing: {}",
                    truncate_for_display(&fault.to_string(), 200)
                );
                let _ = self.chat.send_message(user, &text).await;
                JobOutcome {
                    aborted: Some(fault.to_string()),
                    ..JobOutcome::default()
                }
            }
        };

        if outcome.aborted.is_none() {
            let _ = self
                .chat
                .send_message(user, &summarize(&outcome))
                .await;
        }

        self.jobs_completed.fetch_add(1, Ordering::SeqCst);
        info!(
            "Job {} finished: {} succeeded, {} failed",
            job_id,
            outcome.succeeded_segments,
            outcome.failed_segments.len()
        );
        // Terminal status-message deletion is the last observable action
        reporter.finish().await;
        outcome
    }

    async fn run_inner(
        &self,
        user: UserId,
        job_id: u64,
        selection: &Selection,
        reporter: &ProgressReporter,
    ) -> ClipmillResult<JobOutcome> {
        // Workspace first: dropped at the end of this scope on every path
        let workspace = JobWorkspace::create(&self.config.temp_dir)?;
        let mut job = ClipJob::new(job_id, selection.clone());

        // Step 1: resolve metadata, single attempt, timeout-bounded
        job.status = JobStatus::Downloading;
        let info = match self.resolve_source(&selection.source).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Job {} aborted at resolution: {}", job_id, e);
                let _ = self
                    .chat
                    .send_message(user, "Failed to read the video. Try again later.")
                    .await;
                return Ok(JobOutcome {
                    aborted: Some(e.to_string()),
                    ..JobOutcome::default()
                });
            }
        };

        // Step 2: segment positions
        let segments = segments_for(selection, &info);
        if segments.is_empty() {
            let _ = self.chat.send_message(user, "Nothing to clip.").await;
            return Ok(JobOutcome {
                aborted: Some("no segments".to_string()),
                ..JobOutcome::default()
            });
        }
        job.requested_segments = segments.clone();

        // Step 3/4: extract each segment with retries, progress after each
        job.status = JobStatus::Extracting;
        let retry = RetryPolicy {
            max_attempts: self.config.extract_retry_attempts,
            per_attempt_timeout: self.config.per_call_timeout(),
        };
        let total = segments.len();
        let mut outcome = JobOutcome::default();
        let mut produced = Vec::new();
        reporter.update(0, total, "Starting extraction").await;
        for (index, segment) in segments.iter().enumerate() {
            let result = retry
                .run(|| {
                    self.extractor.extract(
                        &selection.source,
                        &selection.quality_id,
                        *segment,
                        workspace.path(),
                    )
                })
                .await;
            match result {
                Ok(path) => {
                    outcome.succeeded_segments += 1;
                    produced.push((index, path));
                }
                Err(e) => {
                    // One segment exhausting retries never aborts siblings
                    warn!("Job {} segment {} failed: {}", job_id, index + 1, e);
                    outcome.failed_segments.push((index, e.to_string()));
                }
            }
            let completed = index + 1;
            job.progress_percent = (completed * 100 / total) as u8;
            reporter
                .update(completed, total, &format!("Processed {}/{}", completed, total))
                .await;
        }

        // Step 5: route every produced artifact
        job.status = JobStatus::Routing;
        let router = OutputRouter::new(
            Arc::clone(&self.chat),
            Arc::clone(&self.uploader),
            self.config.size_threshold_bytes,
            self.config.per_call_timeout(),
        );
        let stem = safe_filename(&selection.title);
        for (index, path) in produced {
            let caption = format!("{} {}/{} · {}", stem, index + 1, total, segments[index]);
            let artifact = router.route(user, path, &caption).await;
            outcome.artifacts.push(artifact);
        }

        job.status = if outcome.succeeded_segments > 0 {
            JobStatus::Done
        } else {
            JobStatus::Failed
        };
        job.outputs = outcome.artifacts.clone();
        Ok(outcome)
    }

    async fn resolve_source(&self, reference: &str) -> ClipmillResult<SourceInfo> {
        match tokio::time::timeout(self.config.per_call_timeout(), self.resolver.resolve(reference))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ClipmillError::Timeout(self.config.per_call_timeout())),
        }
    }
}

/// Turn a selection into concrete segments against resolved duration
fn segments_for(selection: &Selection, info: &SourceInfo) -> Vec<Segment> {
    match &selection.segments {
        SegmentsSpec::Planned { clip_len, count } => {
            plan_segments(info.duration_seconds, *clip_len, *count)
        }
        SegmentsSpec::Explicit(segment) => vec![*segment],
        SegmentsSpec::Full => Segment::new(0, info.duration_seconds.max(1))
            .map(|s| vec![s])
            .unwrap_or_default(),
    }
}

/// Final per-job summary: counts plus per-item delivery results
fn summarize(outcome: &JobOutcome) -> String {
    let mut text = format!(
        "Done: {}/{} clips produced.",
        outcome.succeeded_segments,
        outcome.total_segments()
    );
    for artifact in &outcome.artifacts {
        if let Some(link) = &artifact.hosted_link {
            text.push_str(&format!("\nHosted: {}", link));
        } else if let Some(reason) = &artifact.failure_reason {
            text.push_str(&format!("\nDelivery failed: {}", reason));
        }
    }
    for (index, reason) in &outcome.failed_segments {
        text.push_str(&format!("\nClip {} failed: {}", index + 1, reason));
    }
    text
}
