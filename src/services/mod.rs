//! Collaborators the pipelines depend on
//!
//! Each seam is a trait so runs can be driven against fakes; the production
//! implementations shell out to the .NET tooling or read DACPAC files.

pub mod build;
pub mod dacpac;
pub mod filesystem;
pub mod project;
pub mod sqlpackage;
mod subprocess;

use crate::core::{DefaultConstraint, SqlProject};
use async_trait::async_trait;
use std::path::Path;

pub use build::DotnetBuildService;
pub use dacpac::DacpacModelReader;
pub use filesystem::{FileSystemAccess, LocalFileSystem};
pub use project::StaticSqlProjectService;
pub use sqlpackage::SqlPackageDacAccess;

/// Loads project metadata into [`SqlProject::properties`]
#[async_trait]
pub trait SqlProjectService: Send + Sync {
    /// Fill the project properties; `false` when they could not be loaded
    /// (reasons are logged by the implementation)
    async fn try_load_properties(&self, project: &mut SqlProject) -> bool;
}

/// Builds a database project into its DACPAC
#[async_trait]
pub trait BuildService: Send + Sync {
    /// `true` when the build succeeded
    async fn build_project(&self, project: &SqlProject) -> bool;
}

/// Inputs for generating the deployment files
#[derive(Debug, Clone, Copy)]
pub struct DeployRequest<'a> {
    /// DACPAC the deployment upgrades from
    pub previous_dacpac: &'a Path,
    /// DACPAC the deployment upgrades to
    pub new_dacpac: &'a Path,
    pub publish_profile: &'a Path,
    pub create_report: bool,
}

/// Deployment files produced by [`DacAccess`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployArtifacts {
    pub script: String,
    pub report: Option<String>,
}

/// Diffs two schema models into a deploy script and report
#[async_trait]
pub trait DacAccess: Send + Sync {
    async fn create_deploy_files(
        &self,
        request: &DeployRequest<'_>,
    ) -> Result<DeployArtifacts, Vec<String>>;
}

/// Reads the default constraints of a compiled schema model
#[async_trait]
pub trait SchemaModelReader: Send + Sync {
    /// All default constraints in model order, or the reasons they could not
    /// be read
    async fn default_constraints(&self, dacpac_path: &Path)
        -> Result<Vec<DefaultConstraint>, Vec<String>>;
}
