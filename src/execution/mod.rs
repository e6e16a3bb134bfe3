//! Pipeline execution
//!
//! A run is a [`StateModel`](crate::core::StateModel) driven by the
//! [`PipelineExecutor`] through the table of a [`WorkUnitFactory`].

pub mod executor;
pub mod factory;
pub mod service;
pub mod unit;
pub mod units;

use crate::script::ModifierPipeline;
use crate::services::{
    BuildService, DacAccess, DacpacModelReader, DotnetBuildService, FileSystemAccess, LocalFileSystem,
    SqlPackageDacAccess, SqlProjectService,
};
use std::sync::Arc;

pub use executor::PipelineExecutor;
pub use factory::{ScaffoldingWorkUnitFactory, ScriptCreationWorkUnitFactory, WorkUnitFactory};
pub use service::{ScaffoldingService, ScriptCreationService};
pub use unit::WorkUnit;

/// Collaborators the work units are built from
#[derive(Clone)]
pub struct Collaborators {
    pub project_service: Arc<dyn SqlProjectService>,
    pub build_service: Arc<dyn BuildService>,
    pub dac_access: Arc<dyn DacAccess>,
    pub file_system: Arc<dyn FileSystemAccess>,
    pub modifiers: Arc<ModifierPipeline>,
}

impl Collaborators {
    /// The .NET tooling and the local disk, with project properties from `project_service`
    pub fn production(project_service: Arc<dyn SqlProjectService>) -> Self {
        Self {
            project_service,
            build_service: Arc::new(DotnetBuildService::default()),
            dac_access: Arc::new(SqlPackageDacAccess::default()),
            file_system: Arc::new(LocalFileSystem),
            modifiers: Arc::new(ModifierPipeline::new(Arc::new(DacpacModelReader))),
        }
    }
}
