//! Concrete work units
//!
//! Every unit advances the run to the state named after what it did, even
//! when it reports a failure.

mod artifacts;
mod cleanup;
mod deploy;
mod paths;
mod project;

use crate::services::FileSystemAccess;
use std::path::Path;
use tracing::{debug, warn};

pub use artifacts::{BuildProjectUnit, CleanNewArtifactsDirectoryUnit, CopyBuildResultUnit};
pub use cleanup::{DeleteLatestArtifactsUnit, DeleteRefactorLogUnit};
pub use deploy::{CreateDeploymentFilesUnit, ModifyDeploymentScriptUnit};
pub use paths::{LoadPathsForScaffoldingUnit, LoadPathsForScriptCreationUnit, LATEST_DIRECTORY};
pub use project::{FormatTargetVersionUnit, LoadSqlProjectPropertiesUnit, ValidateTargetVersionUnit};

/// Delete every file directly inside `directory`
///
/// Returns how many files could not be deleted; a directory that cannot be
/// listed counts as one failure.
pub(crate) async fn clean_directory(file_system: &dyn FileSystemAccess, directory: &Path) -> usize {
    let files = match file_system.list_files(directory, None).await {
        Ok(files) => files,
        Err(e) => {
            warn!("Could not list {}: {}", directory.display(), e);
            return 1;
        }
    };

    let mut failures = 0;
    for file in files {
        match file_system.delete_file(&file).await {
            Ok(()) => debug!("Deleted {}", file.display()),
            Err(e) => {
                warn!("Could not delete {}: {}", file.display(), e);
                failures += 1;
            }
        }
    }
    failures
}
