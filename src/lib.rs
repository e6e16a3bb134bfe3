//! dacpac-lifecycle - versioned DACPAC artifacts and deploy script post-processing

pub mod cli;
pub mod core;
pub mod error;
pub mod execution;
pub mod script;
pub mod services;

// Re-export commonly used types
pub use core::{CancellationFlag, ConfigurationModel, DacVersion, RunOutcome, RunSummary, SqlProject};
pub use error::{ConfigError, ScriptError, ServiceError};
pub use execution::{Collaborators, PipelineExecutor, ScaffoldingService, ScriptCreationService};
pub use script::{ModifierPipeline, ScriptModificationModel, ScriptModifierKind};
