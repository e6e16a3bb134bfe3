//! Test: Work unit tables of both pipelines

use crate::helpers::*;
use dacpac_lifecycle::core::{
    ConfigurationModel, DacVersion, PipelineFlavor, SqlProject, StateModel, StateModelState,
};
use dacpac_lifecycle::execution::{ScaffoldingWorkUnitFactory, ScriptCreationWorkUnitFactory, WorkUnitFactory};
use std::sync::Arc;
use StateModelState::*;

fn test_collaborators() -> dacpac_lifecycle::execution::Collaborators {
    collaborators(
        FakeSqlProjectService::failing(),
        Arc::new(FakeBuildService::new(true)),
        Arc::new(FakeDacAccess::returning("")),
        FakeSchemaModelReader::new(),
    )
}

fn model(flavor: PipelineFlavor, state: StateModelState) -> StateModel {
    let mut model = StateModel::new(
        flavor,
        SqlProject::new("/db/Inventory.sqlproj"),
        ConfigurationModel::default(),
        Arc::new(|_| {}),
    );
    model.current_state = state;
    model
}

fn script_creation(create_latest: bool) -> PipelineFlavor {
    PipelineFlavor::ScriptCreation {
        previous_version: DacVersion::new(1, 0),
        create_latest,
    }
}

fn unit_name(factory: &dyn WorkUnitFactory, model: &StateModel) -> Option<&'static str> {
    factory.next_unit(model).map(|unit| unit.name())
}

#[test]
fn test_scaffolding_table() {
    let factory = ScaffoldingWorkUnitFactory::new(&test_collaborators());
    let expected = [
        (Initialized, Some("LoadSqlProjectProperties")),
        (SqlProjectPropertiesLoaded, Some("FormatTargetVersion")),
        (FormattedTargetVersionLoaded, Some("LoadPathsForScaffolding")),
        (PathsLoaded, Some("BuildProject")),
        (ProjectBuilt, Some("CleanNewArtifactsDirectory")),
        (TriedToCleanArtifactsDirectory, Some("CopyBuildResult")),
        (TriedToCopyBuildResult, None),
    ];

    for (state, unit) in expected {
        let model = model(PipelineFlavor::Scaffolding, state);
        assert_eq!(unit_name(&factory, &model), unit, "{:?}", state);
    }
}

#[test]
fn test_script_creation_table() {
    let factory = ScriptCreationWorkUnitFactory::new(&test_collaborators());
    let expected = [
        (Initialized, Some("LoadSqlProjectProperties")),
        (SqlProjectPropertiesLoaded, Some("FormatTargetVersion")),
        (FormattedTargetVersionLoaded, Some("ValidateTargetVersion")),
        (FormattedTargetVersionValidated, Some("LoadPathsForScriptCreation")),
        (PathsLoaded, Some("BuildProject")),
        (ProjectBuilt, Some("CleanNewArtifactsDirectory")),
        (TriedToCleanArtifactsDirectory, Some("CopyBuildResult")),
        (TriedToCopyBuildResult, Some("CreateDeploymentFiles")),
        (TriedToCreateDeploymentFiles, Some("ModifyDeploymentScript")),
        (ModifiedDeploymentScript, Some("DeleteRefactorLog")),
        (DeletedRefactorLogs, Some("DeleteLatestArtifacts")),
        (DeletedLatestArtifacts, None),
    ];

    for (state, unit) in expected {
        let model = model(script_creation(false), state);
        assert_eq!(unit_name(&factory, &model), unit, "{:?}", state);
    }
}

#[test]
fn test_latest_run_ends_after_modification() {
    let factory = ScriptCreationWorkUnitFactory::new(&test_collaborators());

    let modified = model(script_creation(true), ModifiedDeploymentScript);
    assert_eq!(unit_name(&factory, &modified), None);

    let validating = model(script_creation(true), FormattedTargetVersionLoaded);
    assert_eq!(unit_name(&factory, &validating), Some("ValidateTargetVersion"));
}

#[test]
#[should_panic(expected = "is not a state of the scaffolding pipeline")]
fn test_scaffolding_rejects_script_creation_states() {
    let factory = ScaffoldingWorkUnitFactory::new(&test_collaborators());
    let model = model(PipelineFlavor::Scaffolding, ModifiedDeploymentScript);
    factory.next_unit(&model);
}

#[test]
#[should_panic(expected = "cannot run a script creation model")]
fn test_scaffolding_rejects_script_creation_models() {
    let factory = ScaffoldingWorkUnitFactory::new(&test_collaborators());
    factory.next_unit(&model(script_creation(false), Initialized));
}

#[test]
#[should_panic(expected = "cannot run a scaffolding model")]
fn test_script_creation_rejects_scaffolding_models() {
    let factory = ScriptCreationWorkUnitFactory::new(&test_collaborators());
    factory.next_unit(&model(PipelineFlavor::Scaffolding, Initialized));
}
