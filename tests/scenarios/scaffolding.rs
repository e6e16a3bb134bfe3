//! Test: Scaffolding end to end and the single in-flight run per service

use crate::helpers::*;
use dacpac_lifecycle::core::{CancellationFlag, ConfigurationModel, DacVersion, RunOutcome, SqlProject, StateModelState};
use dacpac_lifecycle::execution::ScaffoldingService;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

fn service_for(root: &std::path::Path, build: Arc<FakeBuildService>) -> ScaffoldingService {
    ScaffoldingService::new(&collaborators(
        FakeSqlProjectService::loading(properties(
            "Inventory",
            &root.join("bin/Release"),
            DacVersion::new(3, 2).with_build(1),
        )),
        build,
        Arc::new(FakeDacAccess::returning("")),
        FakeSchemaModelReader::new(),
    ))
}

#[tokio::test]
async fn test_scaffolding_stores_new_version() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("bin/Release")).unwrap();
    fs::write(root.join("bin/Release/Inventory.dacpac"), "built").unwrap();
    fs::create_dir_all(root.join("_Deployment/3.2.1")).unwrap();
    fs::write(root.join("_Deployment/3.2.1/Outdated.sql"), "old").unwrap();
    let build = Arc::new(FakeBuildService::new(true));

    let summary = service_for(root, build.clone())
        .scaffold(
            SqlProject::new(root.join("Inventory.sqlproj")),
            ConfigurationModel::default(),
            &CancellationFlag::new(),
        )
        .await;

    assert!(summary.is_success(), "{:?}", summary);
    assert_eq!(summary.final_state, StateModelState::TriedToCopyBuildResult);
    assert_eq!(summary.project, "Inventory");
    assert_eq!(build.builds(), 1);
    assert_eq!(
        fs::read_to_string(root.join("_Deployment/3.2.1/Inventory.dacpac")).unwrap(),
        "built"
    );
    assert!(!root.join("_Deployment/3.2.1/Outdated.sql").exists());
}

#[tokio::test]
async fn test_failed_build_stops_scaffolding() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let summary = service_for(root, Arc::new(FakeBuildService::new(false)))
        .scaffold(
            SqlProject::new(root.join("Inventory.sqlproj")),
            ConfigurationModel::default(),
            &CancellationFlag::new(),
        )
        .await;

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.final_state, StateModelState::ProjectBuilt);
    assert!(!root.join("_Deployment").exists());
}

#[tokio::test]
async fn test_missing_build_result_fails() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let summary = service_for(root, Arc::new(FakeBuildService::new(true)))
        .scaffold(
            SqlProject::new(root.join("Inventory.sqlproj")),
            ConfigurationModel::default(),
            &CancellationFlag::new(),
        )
        .await;

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.final_state, StateModelState::TriedToCopyBuildResult);
}

#[tokio::test]
async fn test_unloadable_project_fails_first() {
    let service = ScaffoldingService::new(&collaborators(
        FakeSqlProjectService::failing(),
        Arc::new(FakeBuildService::new(true)),
        Arc::new(FakeDacAccess::returning("")),
        FakeSchemaModelReader::new(),
    ));

    let summary = service
        .scaffold(
            SqlProject::new("/db/Inventory.sqlproj"),
            ConfigurationModel::default(),
            &CancellationFlag::new(),
        )
        .await;

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.final_state, StateModelState::SqlProjectPropertiesLoaded);
    assert!(!service.is_scaffolding());
}

#[tokio::test]
#[should_panic(expected = "Scaffolding is already in progress")]
async fn test_second_concurrent_run_panics() {
    let service = ScaffoldingService::new(&collaborators(
        FakeSqlProjectService::failing().with_delay(Duration::from_millis(200)),
        Arc::new(FakeBuildService::new(true)),
        Arc::new(FakeDacAccess::returning("")),
        FakeSchemaModelReader::new(),
    ));
    let cancel = CancellationFlag::new();

    let first = service.scaffold(
        SqlProject::new("/db/Inventory.sqlproj"),
        ConfigurationModel::default(),
        &cancel,
    );
    let second = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(service.is_scaffolding());
        service
            .scaffold(
                SqlProject::new("/db/Inventory.sqlproj"),
                ConfigurationModel::default(),
                &cancel,
            )
            .await
    };

    tokio::join!(first, second);
}
