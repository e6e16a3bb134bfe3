//! Best-effort clean-up after a versioned script was created

use super::clean_directory;
use crate::core::{CancellationFlag, StateModel, StateModelState};
use crate::execution::unit::WorkUnit;
use crate::services::FileSystemAccess;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

const REFACTORLOG_EXTENSION: &str = "refactorlog";

/// Deletes the project's refactorlog files when configured;
/// lands on `DeletedRefactorLogs`
pub struct DeleteRefactorLogUnit {
    file_system: Arc<dyn FileSystemAccess>,
}

impl DeleteRefactorLogUnit {
    pub fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self { file_system }
    }
}

#[async_trait]
impl WorkUnit for DeleteRefactorLogUnit {
    fn name(&self) -> &'static str {
        "DeleteRefactorLog"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        if model.configuration.delete_refactorlog_after_versioned_script_generation {
            let directory = &model.paths()?.directories.project_directory;

            match self.file_system.list_files(directory, Some(REFACTORLOG_EXTENSION)).await {
                Ok(files) => {
                    for file in files {
                        match self.file_system.delete_file(&file).await {
                            Ok(()) => info!("Deleted {}", file.display()),
                            Err(e) => warn!("Could not delete {}: {}", file.display(), e),
                        }
                    }
                }
                Err(e) => warn!("Could not list refactorlog files in {}: {}", directory.display(), e),
            }
        } else {
            debug!("Keeping refactorlog files");
        }

        model.current_state = StateModelState::DeletedRefactorLogs;
        Ok(())
    }
}

/// Empties the "latest" artifacts directory when configured;
/// lands on `DeletedLatestArtifacts`
pub struct DeleteLatestArtifactsUnit {
    file_system: Arc<dyn FileSystemAccess>,
}

impl DeleteLatestArtifactsUnit {
    pub fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self { file_system }
    }
}

#[async_trait]
impl WorkUnit for DeleteLatestArtifactsUnit {
    fn name(&self) -> &'static str {
        "DeleteLatestArtifacts"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        if model.configuration.delete_latest_after_versioned_script_generation {
            let directory = &model.paths()?.directories.latest_artifacts_directory;

            if self.file_system.exists(directory).await {
                let failures = clean_directory(self.file_system.as_ref(), directory).await;
                if failures > 0 {
                    warn!("{} file(s) in {} could not be deleted", failures, directory.display());
                }
            } else {
                debug!("No latest artifacts at {}", directory.display());
            }
        }

        model.current_state = StateModelState::DeletedLatestArtifacts;
        Ok(())
    }
}
