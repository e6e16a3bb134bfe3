//! Entry points owning one pipeline each

use crate::core::{
    CancellationFlag, ConfigurationModel, DacVersion, PipelineFlavor, ProgressCallback, RunSummary,
    SqlProject, StateModel,
};
use crate::execution::executor::PipelineExecutor;
use crate::execution::factory::{ScaffoldingWorkUnitFactory, ScriptCreationWorkUnitFactory, WorkUnitFactory};
use crate::execution::Collaborators;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single in-flight flag driven by the progress callback
#[derive(Clone, Default)]
struct InFlight {
    flag: Arc<AtomicBool>,
    observer: Option<ProgressCallback>,
}

impl InFlight {
    fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Claim the flag for a new run
    ///
    /// # Panics
    ///
    /// Panics when a run is already in flight.
    fn claim(&self, operation: &str) {
        assert!(
            !self.flag.swap(true, Ordering::SeqCst),
            "{} is already in progress",
            operation
        );
    }

    fn callback(&self) -> ProgressCallback {
        let flag = self.flag.clone();
        let observer = self.observer.clone();
        Arc::new(move |running| {
            flag.store(running, Ordering::SeqCst);
            if let Some(observer) = &observer {
                observer(running);
            }
        })
    }
}

async fn run_to_summary(factory: &dyn WorkUnitFactory, mut model: StateModel, cancel: &CancellationFlag) -> RunSummary {
    let started_at = Utc::now();
    PipelineExecutor::new().run(factory, &mut model, cancel).await;

    RunSummary {
        run_id: model.run_id,
        flavor: model.flavor.name().to_string(),
        project: model.project.name.clone(),
        started_at,
        completed_at: Utc::now(),
        final_state: model.current_state,
        outcome: model.outcome(),
    }
}

/// Produces the artifacts of a new version
pub struct ScaffoldingService {
    factory: ScaffoldingWorkUnitFactory,
    in_flight: InFlight,
}

impl ScaffoldingService {
    pub fn new(collaborators: &Collaborators) -> Self {
        Self {
            factory: ScaffoldingWorkUnitFactory::new(collaborators),
            in_flight: InFlight::default(),
        }
    }

    /// Also notify `observer` when a run starts (`true`) and ends (`false`)
    pub fn with_observer(mut self, observer: ProgressCallback) -> Self {
        self.in_flight.observer = Some(observer);
        self
    }

    pub fn is_scaffolding(&self) -> bool {
        self.in_flight.is_set()
    }

    /// Run the scaffolding pipeline for `project`
    ///
    /// # Panics
    ///
    /// Panics when a scaffolding run is already in progress.
    pub async fn scaffold(
        &self,
        project: SqlProject,
        configuration: ConfigurationModel,
        cancel: &CancellationFlag,
    ) -> RunSummary {
        self.in_flight.claim("Scaffolding");
        let model = StateModel::new(PipelineFlavor::Scaffolding, project, configuration, self.in_flight.callback());
        run_to_summary(&self.factory, model, cancel).await
    }
}

/// Produces incremental deploy scripts
pub struct ScriptCreationService {
    factory: ScriptCreationWorkUnitFactory,
    in_flight: InFlight,
}

impl ScriptCreationService {
    pub fn new(collaborators: &Collaborators) -> Self {
        Self {
            factory: ScriptCreationWorkUnitFactory::new(collaborators),
            in_flight: InFlight::default(),
        }
    }

    /// Also notify `observer` when a run starts (`true`) and ends (`false`)
    pub fn with_observer(mut self, observer: ProgressCallback) -> Self {
        self.in_flight.observer = Some(observer);
        self
    }

    pub fn is_creating(&self) -> bool {
        self.in_flight.is_set()
    }

    /// Run the script creation pipeline from `previous_version`
    ///
    /// With `create_latest` the script targets the "latest" artifacts and the
    /// target version is not validated.
    ///
    /// # Panics
    ///
    /// Panics when a script creation run is already in progress.
    pub async fn create(
        &self,
        project: SqlProject,
        configuration: ConfigurationModel,
        previous_version: DacVersion,
        create_latest: bool,
        cancel: &CancellationFlag,
    ) -> RunSummary {
        self.in_flight.claim("Script creation");
        let flavor = PipelineFlavor::ScriptCreation {
            previous_version,
            create_latest,
        };
        let model = StateModel::new(flavor, project, configuration, self.in_flight.callback());
        run_to_summary(&self.factory, model, cancel).await
    }
}
