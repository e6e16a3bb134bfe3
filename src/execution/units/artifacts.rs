//! Units building the project and collecting its DACPAC

use super::clean_directory;
use crate::core::{CancellationFlag, PipelineFlavor, StateModel, StateModelState};
use crate::execution::unit::WorkUnit;
use crate::services::{BuildService, FileSystemAccess};
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Builds the project; lands on `ProjectBuilt`
///
/// Script creation skips the build unless `build_before_script_creation` is set.
pub struct BuildProjectUnit {
    build_service: Arc<dyn BuildService>,
}

impl BuildProjectUnit {
    pub fn new(build_service: Arc<dyn BuildService>) -> Self {
        Self { build_service }
    }
}

#[async_trait]
impl WorkUnit for BuildProjectUnit {
    fn name(&self) -> &'static str {
        "BuildProject"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        let build = match model.flavor {
            PipelineFlavor::Scaffolding => true,
            PipelineFlavor::ScriptCreation { .. } => model.configuration.build_before_script_creation,
        };

        let built = if build {
            self.build_service.build_project(&model.project).await
        } else {
            info!("Skipping the build of {}", model.project.name);
            true
        };

        model.current_state = StateModelState::ProjectBuilt;
        if !built {
            error!("Failed to build {}", model.project.name);
            model.fail();
        }
        Ok(())
    }
}

/// Empties the new artifacts directory, best effort;
/// lands on `TriedToCleanArtifactsDirectory`
pub struct CleanNewArtifactsDirectoryUnit {
    file_system: Arc<dyn FileSystemAccess>,
}

impl CleanNewArtifactsDirectoryUnit {
    pub fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self { file_system }
    }
}

#[async_trait]
impl WorkUnit for CleanNewArtifactsDirectoryUnit {
    fn name(&self) -> &'static str {
        "CleanNewArtifactsDirectory"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        let directory = model.paths()?.directories.new_artifacts_directory.clone();

        match self.file_system.ensure_directory(&directory).await {
            Ok(()) => {
                let failures = clean_directory(self.file_system.as_ref(), &directory).await;
                if failures > 0 {
                    warn!("{} file(s) in {} could not be deleted", failures, directory.display());
                }
            }
            Err(e) => warn!("Could not create {}: {}", directory.display(), e),
        }

        model.current_state = StateModelState::TriedToCleanArtifactsDirectory;
        Ok(())
    }
}

/// Copies the built DACPAC into the new artifacts directory;
/// lands on `TriedToCopyBuildResult`
pub struct CopyBuildResultUnit {
    file_system: Arc<dyn FileSystemAccess>,
}

impl CopyBuildResultUnit {
    pub fn new(file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self { file_system }
    }
}

#[async_trait]
impl WorkUnit for CopyBuildResultUnit {
    fn name(&self) -> &'static str {
        "CopyBuildResult"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        let properties = &model.project.properties;
        let binary_directory = properties
            .binary_directory
            .as_ref()
            .context("The binary directory must be loaded before the build result is copied")?;
        let target_name = properties
            .sql_target_name
            .as_ref()
            .context("The SQL target name must be loaded before the build result is copied")?;
        let source = binary_directory.join(format!("{}.dacpac", target_name));
        let destination = model.paths()?.deploy_sources.new_dacpac_path.clone();

        let copied = if !self.file_system.exists(&source).await {
            error!("The build result {} does not exist", source.display());
            false
        } else {
            match self.file_system.copy_file(&source, &destination).await {
                Ok(()) => {
                    debug!("Copied {} to {}", source.display(), destination.display());
                    true
                }
                Err(e) => {
                    error!("Failed to copy {} to {}: {}", source.display(), destination.display(), e);
                    false
                }
            }
        };

        model.current_state = StateModelState::TriedToCopyBuildResult;
        if !copied {
            model.fail();
        }
        Ok(())
    }
}
