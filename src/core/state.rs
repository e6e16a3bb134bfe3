//! Per-run state model

use crate::core::{
    config::ConfigurationModel,
    paths::PathCollection,
    project::SqlProject,
    version::DacVersion,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Phase a run has reached
///
/// Each work unit moves the run forward to the state named after what it did;
/// a state is never revisited within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateModelState {
    Initialized,
    SqlProjectPropertiesLoaded,
    FormattedTargetVersionLoaded,
    FormattedTargetVersionValidated,
    PathsLoaded,
    ProjectBuilt,
    TriedToCleanArtifactsDirectory,
    TriedToCopyBuildResult,
    TriedToCreateDeploymentFiles,
    ModifiedDeploymentScript,
    DeletedRefactorLogs,
    DeletedLatestArtifacts,
}

/// Which pipeline a run belongs to, with its flavor-specific payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineFlavor {
    /// Produce the artifacts of a brand-new version
    Scaffolding,
    /// Produce an incremental deploy script from `previous_version`
    ScriptCreation {
        previous_version: DacVersion,
        /// Target the floating "latest" artifacts instead of a version directory
        create_latest: bool,
    },
}

impl PipelineFlavor {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineFlavor::Scaffolding => "scaffolding",
            PipelineFlavor::ScriptCreation { .. } => "script creation",
        }
    }
}

/// Progress notification: `true` when a run starts, `false` when it finishes
pub type ProgressCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Cooperative cancellation shared between the caller and a running pipeline
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Mutable context of one pipeline run
///
/// Owned by exactly one in-flight run and handed to each work unit by
/// exclusive reference.
pub struct StateModel {
    /// Correlates the log lines of a run
    pub run_id: Uuid,

    pub flavor: PipelineFlavor,

    pub project: SqlProject,

    pub configuration: ConfigurationModel,

    /// Set by `FormatTargetVersionUnit`
    pub formatted_target_version: Option<String>,

    /// Set by the path loading units
    pub paths: Option<PathCollection>,

    pub current_state: StateModelState,

    /// `None` while running (or after a crash), `Some(false)` after a reported
    /// failure, `Some(true)` once no work unit remains
    pub result: Option<bool>,

    /// Set by the executor when it stopped on a cancellation request
    pub cancelled: bool,

    progress: ProgressCallback,
}

impl StateModel {
    /// Create a fresh model in the `Initialized` state
    pub fn new(
        flavor: PipelineFlavor,
        project: SqlProject,
        configuration: ConfigurationModel,
        progress: ProgressCallback,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            flavor,
            project,
            configuration,
            formatted_target_version: None,
            paths: None,
            current_state: StateModelState::Initialized,
            result: None,
            cancelled: false,
            progress,
        }
    }

    /// Clone of the progress callback, for the executor's start/finish notifications
    pub fn progress_callback(&self) -> ProgressCallback {
        self.progress.clone()
    }

    /// Previous version of a script creation run
    pub fn previous_version(&self) -> Option<&DacVersion> {
        match &self.flavor {
            PipelineFlavor::Scaffolding => None,
            PipelineFlavor::ScriptCreation { previous_version, .. } => Some(previous_version),
        }
    }

    /// Whether the run targets the floating "latest" artifacts
    pub fn creates_latest(&self) -> bool {
        matches!(
            self.flavor,
            PipelineFlavor::ScriptCreation {
                create_latest: true,
                ..
            }
        )
    }

    /// Paths loaded earlier in the run
    pub fn paths(&self) -> anyhow::Result<&PathCollection> {
        self.paths
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Paths have not been loaded for this run"))
    }

    /// Record a reported failure
    pub fn fail(&mut self) {
        self.result = Some(false);
    }

    pub fn has_failed(&self) -> bool {
        self.result == Some(false)
    }

    pub fn outcome(&self) -> RunOutcome {
        match self.result {
            Some(true) => RunOutcome::Succeeded,
            Some(false) => RunOutcome::Failed,
            None if self.cancelled => RunOutcome::Aborted,
            None => RunOutcome::Crashed,
        }
    }
}

impl fmt::Debug for StateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateModel")
            .field("run_id", &self.run_id)
            .field("flavor", &self.flavor)
            .field("project", &self.project.name)
            .field("current_state", &self.current_state)
            .field("result", &self.result)
            .field("cancelled", &self.cancelled)
            .finish()
    }
}

/// Final outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Succeeded,
    /// A work unit reported a failure
    Failed,
    /// A work unit crashed before reporting anything
    Crashed,
    /// Cancelled before the table ran out of units
    Aborted,
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub flavor: String,
    pub project: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub final_state: StateModelState,
    pub outcome: RunOutcome,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Succeeded
    }
}
