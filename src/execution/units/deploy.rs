//! Units producing and post-processing the deployment files

use crate::core::{CancellationFlag, StateModel, StateModelState};
use crate::error::ScriptError;
use crate::execution::unit::WorkUnit;
use crate::script::{ModifierPipeline, ScriptModificationModel};
use crate::services::{DacAccess, DeployRequest, FileSystemAccess};
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Generates the deploy script and report and writes them;
/// lands on `TriedToCreateDeploymentFiles`
pub struct CreateDeploymentFilesUnit {
    dac_access: Arc<dyn DacAccess>,
    file_system: Arc<dyn FileSystemAccess>,
}

impl CreateDeploymentFilesUnit {
    pub fn new(dac_access: Arc<dyn DacAccess>, file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            dac_access,
            file_system,
        }
    }

    async fn write(&self, path: &Path, content: &str) -> bool {
        if let Some(parent) = path.parent() {
            if let Err(e) = self.file_system.ensure_directory(parent).await {
                error!("Could not create {}: {}", parent.display(), e);
                return false;
            }
        }
        match self.file_system.write_text(path, content).await {
            Ok(()) => {
                info!("Wrote {}", path.display());
                true
            }
            Err(e) => {
                error!("Failed to write {}: {}", path.display(), e);
                false
            }
        }
    }
}

#[async_trait]
impl WorkUnit for CreateDeploymentFilesUnit {
    fn name(&self) -> &'static str {
        "CreateDeploymentFiles"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        let paths = model.paths()?;
        let script_path = paths
            .deploy_targets
            .deploy_script_path
            .as_deref()
            .context("No deploy script path was computed")?;
        let request = DeployRequest {
            previous_dacpac: paths
                .deploy_sources
                .previous_dacpac_path
                .as_deref()
                .context("No previous DACPAC path was computed")?,
            new_dacpac: &paths.deploy_sources.new_dacpac_path,
            publish_profile: paths
                .deploy_sources
                .publish_profile_path
                .as_deref()
                .context("No publish profile path was computed")?,
            create_report: paths.deploy_targets.deploy_report_path.is_some(),
        };

        let written = match self.dac_access.create_deploy_files(&request).await {
            Err(errors) => {
                for message in &errors {
                    error!("{}", message);
                }
                error!("Failed to create the deployment files");
                false
            }
            Ok(artifacts) => {
                let mut written = self.write(script_path, &artifacts.script).await;
                if let (Some(report), Some(report_path)) =
                    (&artifacts.report, &paths.deploy_targets.deploy_report_path)
                {
                    written &= self.write(report_path, report).await;
                }
                written
            }
        };

        model.current_state = StateModelState::TriedToCreateDeploymentFiles;
        if !written {
            model.fail();
        }
        Ok(())
    }
}

/// Applies the configured script modifiers to the deploy script on disk;
/// lands on `ModifiedDeploymentScript`
///
/// Failing to read or write the script fails the run. A modifier that cannot
/// run with the loaded project data is a crash.
pub struct ModifyDeploymentScriptUnit {
    modifiers: Arc<ModifierPipeline>,
    file_system: Arc<dyn FileSystemAccess>,
}

impl ModifyDeploymentScriptUnit {
    pub fn new(modifiers: Arc<ModifierPipeline>, file_system: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            modifiers,
            file_system,
        }
    }
}

#[async_trait]
impl WorkUnit for ModifyDeploymentScriptUnit {
    fn name(&self) -> &'static str {
        "ModifyDeploymentScript"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        let result = {
            let paths = model.paths()?;
            let script_path = paths
                .deploy_targets
                .deploy_script_path
                .as_deref()
                .context("No deploy script path was computed")?;
            let previous_version = model
                .previous_version()
                .context("Deploy scripts are only modified when creating scripts")?;
            let create_latest = model.creates_latest();
            let (project, configuration) = (&model.project, &model.configuration);

            self.modifiers
                .modify_file(self.file_system.as_ref(), script_path, |script| {
                    ScriptModificationModel::new(
                        script,
                        project,
                        configuration,
                        paths,
                        previous_version,
                        create_latest,
                    )
                })
                .await
        };

        let failed = match result {
            Ok(_) => false,
            Err(e @ (ScriptError::Read { .. } | ScriptError::Write { .. })) => {
                error!("{:#}", anyhow::Error::from(e));
                true
            }
            Err(e) => return Err(e).context("Failed to modify the deploy script"),
        };

        model.current_state = StateModelState::ModifiedDeploymentScript;
        if failed {
            model.fail();
        }
        Ok(())
    }
}
