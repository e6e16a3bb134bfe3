//! Core domain models
//!
//! This module defines the data a pipeline run works with: configuration,
//! project metadata, versions, computed paths, and the per-run state model.

pub mod config;
pub mod constraint;
pub mod paths;
pub mod project;
pub mod state;
pub mod version;

pub use config::ConfigurationModel;
pub use constraint::DefaultConstraint;
pub use paths::*;
pub use project::*;
pub use state::*;
pub use version::DacVersion;
