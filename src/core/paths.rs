//! Paths computed for a single pipeline run

use std::path::PathBuf;

/// All paths a run reads from or writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCollection {
    pub directories: DirectoryPaths,
    pub deploy_sources: DeploySourcePaths,
    pub deploy_targets: DeployTargetPaths,
}

/// Directories involved in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPaths {
    /// Directory containing the project file
    pub project_directory: PathBuf,

    /// Floating "latest" artifacts directory
    pub latest_artifacts_directory: PathBuf,

    /// Artifacts directory of the version being produced
    pub new_artifacts_directory: PathBuf,
}

/// Inputs of the deploy script generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySourcePaths {
    pub new_dacpac_path: PathBuf,

    /// Publish profile, required for script creation only
    pub publish_profile_path: Option<PathBuf>,

    /// DACPAC of the previous version; `None` when scaffolding
    pub previous_dacpac_path: Option<PathBuf>,
}

/// Outputs of the deploy script generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployTargetPaths {
    pub deploy_script_path: Option<PathBuf>,

    /// Only set when documentation is generated alongside the script
    pub deploy_report_path: Option<PathBuf>,
}
