//! State to work unit tables, one per pipeline flavor

use crate::core::{PipelineFlavor, StateModel, StateModelState};
use crate::execution::unit::WorkUnit;
use crate::execution::units::*;
use crate::execution::Collaborators;

/// Looks up the unit to run next
pub trait WorkUnitFactory: Send + Sync {
    /// The unit bound to `model.current_state`, or `None` when the run is complete
    ///
    /// # Panics
    ///
    /// Panics for states the flavor never reaches.
    fn next_unit(&self, model: &StateModel) -> Option<&dyn WorkUnit>;
}

/// Units both flavors start with
struct SharedUnits {
    load_properties: LoadSqlProjectPropertiesUnit,
    format_version: FormatTargetVersionUnit,
    build: BuildProjectUnit,
    clean: CleanNewArtifactsDirectoryUnit,
    copy: CopyBuildResultUnit,
}

impl SharedUnits {
    fn new(collaborators: &Collaborators) -> Self {
        Self {
            load_properties: LoadSqlProjectPropertiesUnit::new(collaborators.project_service.clone()),
            format_version: FormatTargetVersionUnit,
            build: BuildProjectUnit::new(collaborators.build_service.clone()),
            clean: CleanNewArtifactsDirectoryUnit::new(collaborators.file_system.clone()),
            copy: CopyBuildResultUnit::new(collaborators.file_system.clone()),
        }
    }
}

/// Table of the scaffolding pipeline
pub struct ScaffoldingWorkUnitFactory {
    shared: SharedUnits,
    load_paths: LoadPathsForScaffoldingUnit,
}

impl ScaffoldingWorkUnitFactory {
    pub fn new(collaborators: &Collaborators) -> Self {
        Self {
            shared: SharedUnits::new(collaborators),
            load_paths: LoadPathsForScaffoldingUnit,
        }
    }
}

impl WorkUnitFactory for ScaffoldingWorkUnitFactory {
    fn next_unit(&self, model: &StateModel) -> Option<&dyn WorkUnit> {
        use StateModelState::*;
        assert!(
            matches!(model.flavor, PipelineFlavor::Scaffolding),
            "The scaffolding pipeline cannot run a {} model",
            model.flavor.name()
        );

        match model.current_state {
            Initialized => Some(&self.shared.load_properties),
            SqlProjectPropertiesLoaded => Some(&self.shared.format_version),
            FormattedTargetVersionLoaded => Some(&self.load_paths),
            PathsLoaded => Some(&self.shared.build),
            ProjectBuilt => Some(&self.shared.clean),
            TriedToCleanArtifactsDirectory => Some(&self.shared.copy),
            TriedToCopyBuildResult => None,
            state @ (FormattedTargetVersionValidated
            | TriedToCreateDeploymentFiles
            | ModifiedDeploymentScript
            | DeletedRefactorLogs
            | DeletedLatestArtifacts) => {
                unreachable!("{:?} is not a state of the scaffolding pipeline", state)
            }
        }
    }
}

/// Table of the script creation pipeline
///
/// Runs targeting the "latest" artifacts end after the script is modified;
/// versioned runs go on to clean up.
pub struct ScriptCreationWorkUnitFactory {
    shared: SharedUnits,
    validate_version: ValidateTargetVersionUnit,
    load_paths: LoadPathsForScriptCreationUnit,
    create_files: CreateDeploymentFilesUnit,
    modify_script: ModifyDeploymentScriptUnit,
    delete_refactorlog: DeleteRefactorLogUnit,
    delete_latest: DeleteLatestArtifactsUnit,
}

impl ScriptCreationWorkUnitFactory {
    pub fn new(collaborators: &Collaborators) -> Self {
        let file_system = &collaborators.file_system;
        Self {
            shared: SharedUnits::new(collaborators),
            validate_version: ValidateTargetVersionUnit,
            load_paths: LoadPathsForScriptCreationUnit::new(file_system.clone()),
            create_files: CreateDeploymentFilesUnit::new(collaborators.dac_access.clone(), file_system.clone()),
            modify_script: ModifyDeploymentScriptUnit::new(collaborators.modifiers.clone(), file_system.clone()),
            delete_refactorlog: DeleteRefactorLogUnit::new(file_system.clone()),
            delete_latest: DeleteLatestArtifactsUnit::new(file_system.clone()),
        }
    }
}

impl WorkUnitFactory for ScriptCreationWorkUnitFactory {
    fn next_unit(&self, model: &StateModel) -> Option<&dyn WorkUnit> {
        use StateModelState::*;
        assert!(
            matches!(model.flavor, PipelineFlavor::ScriptCreation { .. }),
            "The script creation pipeline cannot run a {} model",
            model.flavor.name()
        );

        match model.current_state {
            Initialized => Some(&self.shared.load_properties),
            SqlProjectPropertiesLoaded => Some(&self.shared.format_version),
            FormattedTargetVersionLoaded => Some(&self.validate_version),
            FormattedTargetVersionValidated => Some(&self.load_paths),
            PathsLoaded => Some(&self.shared.build),
            ProjectBuilt => Some(&self.shared.clean),
            TriedToCleanArtifactsDirectory => Some(&self.shared.copy),
            TriedToCopyBuildResult => Some(&self.create_files),
            TriedToCreateDeploymentFiles => Some(&self.modify_script),
            ModifiedDeploymentScript if model.creates_latest() => None,
            ModifiedDeploymentScript => Some(&self.delete_refactorlog),
            DeletedRefactorLogs => Some(&self.delete_latest),
            DeletedLatestArtifacts => None,
        }
    }
}
