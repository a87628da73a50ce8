// Application layer - Job orchestration use cases

pub mod janitor;
pub mod orchestrator;
pub mod progress;
pub mod router;

pub use janitor::JobWorkspace;
pub use orchestrator::{JobOrchestrator, RetryPolicy};
pub use progress::ProgressReporter;
pub use router::OutputRouter;
