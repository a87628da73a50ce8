//! Scoped per-job temp workspace
//!
//! Every temporary file a job creates (downloaded source, per-segment
//! outputs) lives under one workspace directory that is removed when the
//! workspace is dropped, on every exit path.

use std::path::Path;

use tempfile::TempDir;

use crate::error::ClipmillResult;

/// A job's temp directory with unconditional release on drop
pub struct JobWorkspace {
    dir: TempDir,
}

impl JobWorkspace {
    /// Create a fresh workspace under `base`, creating `base` if needed
    pub fn create(base: &Path) -> ClipmillResult<Self> {
        std::fs::create_dir_all(base)?;
        let dir = tempfile::Builder::new().prefix("job_").tempdir_in(base)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_removed_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let leftover;
        {
            let workspace = JobWorkspace::create(base.path()).unwrap();
            leftover = workspace.path().to_path_buf();
            std::fs::write(workspace.path().join("clip_0_10.mp4"), b"data").unwrap();
            assert!(leftover.exists());
        }
        assert!(!leftover.exists());
    }

    #[test]
    fn test_workspaces_are_distinct() {
        let base = tempfile::tempdir().unwrap();
        let a = JobWorkspace::create(base.path()).unwrap();
        let b = JobWorkspace::create(base.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }
}
