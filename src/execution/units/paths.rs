//! Units computing the `PathCollection` of a run

use crate::core::{
    CancellationFlag, DeploySourcePaths, DeployTargetPaths, DirectoryPaths, PathCollection, StateModel,
    StateModelState,
};
use crate::execution::unit::WorkUnit;
use crate::script::model::LATEST_LABEL;
use crate::services::FileSystemAccess;
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};

/// Name of the "latest" artifacts directory
pub const LATEST_DIRECTORY: &str = LATEST_LABEL;

struct Layout {
    project_directory: PathBuf,
    artifacts_directory: PathBuf,
    target_name: String,
    formatted_target_version: String,
}

impl Layout {
    fn of(model: &StateModel) -> anyhow::Result<Self> {
        let project_directory = model.project.directory().to_path_buf();
        let target_name = model
            .project
            .properties
            .sql_target_name
            .clone()
            .context("The SQL target name must be loaded before paths are computed")?;
        let formatted_target_version = model
            .formatted_target_version
            .clone()
            .context("The target version must be formatted before paths are computed")?;

        Ok(Self {
            artifacts_directory: project_directory.join(model.configuration.artifacts_path.trim()),
            project_directory,
            target_name,
            formatted_target_version,
        })
    }

    fn latest_directory(&self) -> PathBuf {
        self.artifacts_directory.join(LATEST_DIRECTORY)
    }

    fn version_directory(&self, formatted_version: &str) -> PathBuf {
        self.artifacts_directory.join(formatted_version)
    }

    fn dacpac_in(&self, directory: &Path) -> PathBuf {
        directory.join(format!("{}.dacpac", self.target_name))
    }
}

/// Sets `paths` for a scaffolding run; lands on `PathsLoaded`
pub struct LoadPathsForScaffoldingUnit;

#[async_trait]
impl WorkUnit for LoadPathsForScaffoldingUnit {
    fn name(&self) -> &'static str {
        "LoadPathsForScaffolding"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        let layout = Layout::of(model)?;
        let new_directory = layout.version_directory(&layout.formatted_target_version);

        let paths = PathCollection {
            deploy_sources: DeploySourcePaths {
                new_dacpac_path: layout.dacpac_in(&new_directory),
                publish_profile_path: model
                    .configuration
                    .publish_profile_path
                    .as_ref()
                    .map(|p| layout.project_directory.join(p)),
                previous_dacpac_path: None,
            },
            deploy_targets: DeployTargetPaths::default(),
            directories: DirectoryPaths {
                latest_artifacts_directory: layout.latest_directory(),
                new_artifacts_directory: new_directory,
                project_directory: layout.project_directory,
            },
        };

        debug!("Scaffolding paths: {:?}", paths);
        model.paths = Some(paths);
        model.current_state = StateModelState::PathsLoaded;
        Ok(())
    }
}

/// Sets `paths` for a script creation run; lands on `PathsLoaded`
///
/// Fails when no publish profile is configured, or when it or the previous
/// DACPAC does not exist.
pub struct LoadPathsForScriptCreationUnit {
    file_system: Arc<dyn FileSystemAccess>,
}

impl LoadPathsForScriptCreationUnit {
    pub fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self { file_system }
    }
}

#[async_trait]
impl WorkUnit for LoadPathsForScriptCreationUnit {
    fn name(&self) -> &'static str {
        "LoadPathsForScriptCreation"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        let layout = Layout::of(model)?;
        let previous_version = model
            .previous_version()
            .context("Script creation paths need a previous version")?;
        let previous_label = model.configuration.format_version(previous_version);
        let create_latest = model.creates_latest();
        model.current_state = StateModelState::PathsLoaded;

        let Some(profile) = model.configuration.publish_profile_path.as_ref() else {
            error!("A publish profile is required to create deploy scripts");
            model.fail();
            return Ok(());
        };
        let profile = layout.project_directory.join(profile);
        if !self.file_system.exists(&profile).await {
            error!("The publish profile {} does not exist", profile.display());
            model.fail();
            return Ok(());
        }

        let previous_dacpac = layout.dacpac_in(&layout.version_directory(&previous_label));
        if !self.file_system.exists(&previous_dacpac).await {
            error!("The DACPAC of the previous version does not exist: {}", previous_dacpac.display());
            model.fail();
            return Ok(());
        }

        let (new_directory, next_label) = if create_latest {
            (layout.latest_directory(), LATEST_LABEL.to_string())
        } else {
            (
                layout.version_directory(&layout.formatted_target_version),
                layout.formatted_target_version.clone(),
            )
        };

        let file_stem = format!("{}_{}_{}", layout.target_name, previous_label, next_label);
        let deploy_report_path = model
            .configuration
            .create_documentation_with_script_creation
            .then(|| new_directory.join(format!("{}_DeployReport.xml", file_stem)));

        let paths = PathCollection {
            deploy_sources: DeploySourcePaths {
                new_dacpac_path: layout.dacpac_in(&new_directory),
                publish_profile_path: Some(profile),
                previous_dacpac_path: Some(previous_dacpac),
            },
            deploy_targets: DeployTargetPaths {
                deploy_script_path: Some(new_directory.join(format!("{}.sql", file_stem))),
                deploy_report_path,
            },
            directories: DirectoryPaths {
                latest_artifacts_directory: layout.latest_directory(),
                new_artifacts_directory: new_directory,
                project_directory: layout.project_directory,
            },
        };

        debug!("Script creation paths: {:?}", paths);
        model.paths = Some(paths);
        Ok(())
    }
}
