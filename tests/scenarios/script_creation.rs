//! Test: Script creation end to end - deploy files, modification, clean-up

use crate::helpers::*;
use dacpac_lifecycle::core::{
    CancellationFlag, ConfigurationModel, DacVersion, DefaultConstraint, RunOutcome, SqlProject, StateModelState,
};
use dacpac_lifecycle::execution::ScriptCreationService;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const GENERATED_SCRIPT: &str = ":setvar DatabaseName \"Inventory\"\r\n\r\nGO\r\n\
USE [$(DatabaseName)];\r\n\r\n\r\nGO\r\n\
PRINT N'Dropping unnamed constraint on [dbo].[Author]...';\r\n\r\n\r\nGO\r\n\
ALTER TABLE [dbo].[Author] DROP CONSTRAINT ;\r\n\r\n\r\nGO\r\n\
PRINT N'Update complete.';\r\n\r\n\r\nGO\r\n";

/// A project directory with a publish profile, the previous version's
/// artifacts, a build output and leftovers to clean up
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("Inventory.publish.xml"), "<Project />").unwrap();
        fs::write(root.join("Inventory.refactorlog"), "<Operations />").unwrap();
        fs::create_dir_all(root.join("_Deployment/1.0.0")).unwrap();
        fs::write(root.join("_Deployment/1.0.0/Inventory.dacpac"), "previous").unwrap();
        fs::create_dir_all(root.join("_Deployment/latest")).unwrap();
        fs::write(root.join("_Deployment/latest/Inventory.dacpac"), "stale").unwrap();
        fs::create_dir_all(root.join("bin/Release")).unwrap();
        fs::write(root.join("bin/Release/Inventory.dacpac"), "built").unwrap();

        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    fn project(&self) -> SqlProject {
        SqlProject::new(self.path("Inventory.sqlproj"))
    }

    fn project_service(&self, version: DacVersion) -> FakeSqlProjectService {
        FakeSqlProjectService::loading(properties("Inventory", &self.path("bin/Release"), version))
    }

    fn reader(&self, new_version_directory: &str) -> FakeSchemaModelReader {
        FakeSchemaModelReader::new()
            .with_model(
                self.path("_Deployment/1.0.0/Inventory.dacpac"),
                vec![DefaultConstraint::unnamed("dbo", "Author", "Name")],
            )
            .with_model(
                self.path(&format!("_Deployment/{}/Inventory.dacpac", new_version_directory)),
                vec![],
            )
    }
}

fn configuration() -> ConfigurationModel {
    ConfigurationModel {
        publish_profile_path: Some("Inventory.publish.xml".to_string()),
        replace_unnamed_default_constraint_drops: true,
        custom_header: Some("-- Upgrade {PREVIOUS_VERSION} to {NEXT_VERSION}".to_string()),
        track_dacpac_version: true,
        remove_sqlcmd_statements: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_versioned_script_creation() {
    let workspace = Workspace::new();
    let build = Arc::new(FakeBuildService::new(true));
    let dac = Arc::new(FakeDacAccess::returning(GENERATED_SCRIPT));
    let notifications = Arc::new(Mutex::new(Vec::new()));
    let sink = notifications.clone();
    let service = ScriptCreationService::new(&collaborators(
        workspace.project_service(DacVersion::new(1, 1).with_build(0)),
        build.clone(),
        dac.clone(),
        workspace.reader("1.1.0"),
    ))
    .with_observer(Arc::new(move |running| sink.lock().unwrap().push(running)));

    let summary = service
        .create(
            workspace.project(),
            configuration(),
            DacVersion::new(1, 0).with_build(0),
            false,
            &CancellationFlag::new(),
        )
        .await;

    assert!(summary.is_success(), "{:?}", summary);
    assert_eq!(summary.final_state, StateModelState::DeletedLatestArtifacts);
    assert_eq!(summary.flavor, "script creation");
    assert_eq!(*notifications.lock().unwrap(), vec![true, false]);
    assert!(!service.is_creating());
    assert_eq!(build.builds(), 1);

    let requests = dac.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].previous_dacpac, workspace.path("_Deployment/1.0.0/Inventory.dacpac"));
    assert_eq!(requests[0].new_dacpac, workspace.path("_Deployment/1.1.0/Inventory.dacpac"));
    assert_eq!(requests[0].publish_profile, workspace.path("Inventory.publish.xml"));
    assert!(requests[0].create_report);

    assert_eq!(
        fs::read_to_string(workspace.path("_Deployment/1.1.0/Inventory.dacpac")).unwrap(),
        "built"
    );
    assert!(workspace
        .path("_Deployment/1.1.0/Inventory_1.0.0_1.1.0_DeployReport.xml")
        .exists());

    let script = fs::read_to_string(workspace.path("_Deployment/1.1.0/Inventory_1.0.0_1.1.0.sql")).unwrap();
    assert!(script.starts_with("-- Upgrade 1.0.0 to 1.1.0\r\n"), "{}", script);
    assert!(!script.contains(":setvar"));
    assert!(!script.contains("DROP CONSTRAINT ;"));
    assert!(script.contains("SET @column_name = N'Name';"));
    assert!(script.contains("VALUES (N'Inventory', 1, 1, 0, 2147483647, SYSUTCDATETIME());"));

    // versioned runs clean up after themselves
    assert!(!workspace.path("Inventory.refactorlog").exists());
    assert!(!workspace.path("_Deployment/latest/Inventory.dacpac").exists());
    assert!(workspace.path("_Deployment/latest").exists());
}

#[tokio::test]
async fn test_latest_script_keeps_leftovers() {
    let workspace = Workspace::new();
    let service = ScriptCreationService::new(&collaborators(
        workspace.project_service(DacVersion::new(1, 1).with_build(0)),
        Arc::new(FakeBuildService::new(true)),
        Arc::new(FakeDacAccess::returning(GENERATED_SCRIPT)),
        workspace.reader("latest"),
    ));

    let summary = service
        .create(
            workspace.project(),
            configuration(),
            DacVersion::new(1, 0).with_build(0),
            true,
            &CancellationFlag::new(),
        )
        .await;

    assert!(summary.is_success(), "{:?}", summary);
    assert_eq!(summary.final_state, StateModelState::ModifiedDeploymentScript);

    let script = fs::read_to_string(workspace.path("_Deployment/latest/Inventory_1.0.0_latest.sql")).unwrap();
    assert!(script.starts_with("-- Upgrade 1.0.0 to latest\r\n"));
    assert_eq!(
        fs::read_to_string(workspace.path("_Deployment/latest/Inventory.dacpac")).unwrap(),
        "built"
    );
    assert!(workspace.path("Inventory.refactorlog").exists());
}

#[tokio::test]
async fn test_target_version_must_increase() {
    let workspace = Workspace::new();
    let build = Arc::new(FakeBuildService::new(true));
    let service = ScriptCreationService::new(&collaborators(
        workspace.project_service(DacVersion::new(1, 0).with_build(0)),
        build.clone(),
        Arc::new(FakeDacAccess::returning(GENERATED_SCRIPT)),
        workspace.reader("1.0.0"),
    ));

    let summary = service
        .create(
            workspace.project(),
            configuration(),
            DacVersion::new(1, 0).with_build(0),
            false,
            &CancellationFlag::new(),
        )
        .await;

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.final_state, StateModelState::FormattedTargetVersionValidated);
    assert_eq!(build.builds(), 0);
}

#[tokio::test]
async fn test_missing_publish_profile_fails() {
    let workspace = Workspace::new();
    fs::remove_file(workspace.path("Inventory.publish.xml")).unwrap();
    let service = ScriptCreationService::new(&collaborators(
        workspace.project_service(DacVersion::new(1, 1)),
        Arc::new(FakeBuildService::new(true)),
        Arc::new(FakeDacAccess::returning(GENERATED_SCRIPT)),
        workspace.reader("1.1.0"),
    ));

    let summary = service
        .create(
            workspace.project(),
            configuration(),
            DacVersion::new(1, 0),
            false,
            &CancellationFlag::new(),
        )
        .await;

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.final_state, StateModelState::PathsLoaded);
}

#[tokio::test]
async fn test_deploy_file_errors_are_logged() {
    let (_guard, logs) = capture_logs();
    let workspace = Workspace::new();
    let service = ScriptCreationService::new(&collaborators(
        workspace.project_service(DacVersion::new(1, 1).with_build(0)),
        Arc::new(FakeBuildService::new(true)),
        Arc::new(FakeDacAccess::failing(&["Unresolved reference to [dbo].[Gone]"])),
        workspace.reader("1.1.0"),
    ));

    let summary = service
        .create(
            workspace.project(),
            configuration(),
            DacVersion::new(1, 0).with_build(0),
            false,
            &CancellationFlag::new(),
        )
        .await;

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.final_state, StateModelState::TriedToCreateDeploymentFiles);
    assert!(logs
        .errors()
        .iter()
        .any(|line| line.contains("Unresolved reference to [dbo].[Gone]")));
    assert!(!workspace.path("_Deployment/1.1.0/Inventory_1.0.0_1.1.0.sql").exists());
    assert!(workspace.path("Inventory.refactorlog").exists());
}

#[tokio::test]
async fn test_cancelled_run_is_aborted() {
    let workspace = Workspace::new();
    let service = ScriptCreationService::new(&collaborators(
        workspace.project_service(DacVersion::new(1, 1)),
        Arc::new(FakeBuildService::new(true)),
        Arc::new(FakeDacAccess::returning(GENERATED_SCRIPT)),
        workspace.reader("1.1.0"),
    ));
    let cancel = CancellationFlag::new();
    cancel.cancel();

    let summary = service
        .create(workspace.project(), configuration(), DacVersion::new(1, 0), false, &cancel)
        .await;

    assert_eq!(summary.outcome, RunOutcome::Aborted);
    assert_eq!(summary.final_state, StateModelState::Initialized);
    assert!(!service.is_creating());
}
