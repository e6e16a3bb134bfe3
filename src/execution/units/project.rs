//! Units reading project metadata and the target version

use crate::core::{CancellationFlag, PipelineFlavor, StateModel, StateModelState};
use crate::execution::unit::WorkUnit;
use crate::services::SqlProjectService;
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Fills `project.properties`; lands on `SqlProjectPropertiesLoaded`
pub struct LoadSqlProjectPropertiesUnit {
    project_service: Arc<dyn SqlProjectService>,
}

impl LoadSqlProjectPropertiesUnit {
    pub fn new(project_service: Arc<dyn SqlProjectService>) -> Self {
        Self { project_service }
    }
}

#[async_trait]
impl WorkUnit for LoadSqlProjectPropertiesUnit {
    fn name(&self) -> &'static str {
        "LoadSqlProjectProperties"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        let loaded = self.project_service.try_load_properties(&mut model.project).await;
        model.current_state = StateModelState::SqlProjectPropertiesLoaded;

        if !loaded {
            error!("Failed to load the properties of {}", model.project.name);
            model.fail();
        }
        Ok(())
    }
}

/// Sets `formatted_target_version`; lands on `FormattedTargetVersionLoaded`
pub struct FormatTargetVersionUnit;

#[async_trait]
impl WorkUnit for FormatTargetVersionUnit {
    fn name(&self) -> &'static str {
        "FormatTargetVersion"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        model.current_state = StateModelState::FormattedTargetVersionLoaded;

        let Some(version) = model.project.properties.dac_version.as_ref() else {
            error!("The DAC version of {} is not set", model.project.name);
            model.fail();
            return Ok(());
        };

        let formatted = model.configuration.format_version(version);
        debug!("Formatted target version {} as {}", version, formatted);
        model.formatted_target_version = Some(formatted);
        Ok(())
    }
}

/// Rejects target versions not newer than the previous version, unless the
/// "latest" artifacts are scripted; lands on `FormattedTargetVersionValidated`
pub struct ValidateTargetVersionUnit;

#[async_trait]
impl WorkUnit for ValidateTargetVersionUnit {
    fn name(&self) -> &'static str {
        "ValidateTargetVersion"
    }

    async fn work(&self, model: &mut StateModel, _cancel: &CancellationFlag) -> anyhow::Result<()> {
        let PipelineFlavor::ScriptCreation {
            previous_version,
            create_latest,
        } = &model.flavor
        else {
            anyhow::bail!("Target versions are only validated when creating scripts");
        };
        let target = model
            .project
            .properties
            .dac_version
            .as_ref()
            .context("The DAC version must be loaded before it is validated")?;

        let valid = *create_latest || target > previous_version;
        if !valid {
            error!(
                "The target version {} must be greater than the previous version {}",
                target, previous_version
            );
        } else if !*create_latest {
            info!("Creating the script from {} to {}", previous_version, target);
        }

        model.current_state = StateModelState::FormattedTargetVersionValidated;
        if !valid {
            model.fail();
        }
        Ok(())
    }
}
