//! CLI command definitions

use crate::core::{DacVersion, SqlProject, SqlProjectProperties};
use clap::Args;
use std::path::PathBuf;

/// Options naming the project and the properties normally read from it
#[derive(Debug, Args, Clone)]
pub struct ProjectArgs {
    /// Path to the .sqlproj file
    #[arg(short, long)]
    pub project: PathBuf,

    /// Path to the JSON or YAML configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Name of the compiled output (SqlTargetName)
    #[arg(long)]
    pub target_name: String,

    /// Version stamped into the DACPAC
    #[arg(long)]
    pub dac_version: DacVersion,

    /// Directory the build writes the DACPAC into [default: <project dir>/bin/Release]
    #[arg(long)]
    pub binary_dir: Option<PathBuf>,
}

impl ProjectArgs {
    /// The project plus the properties a project service should hand out
    pub fn project(&self) -> (SqlProject, SqlProjectProperties) {
        let project = SqlProject::new(&self.project);
        let binary_directory = self
            .binary_dir
            .clone()
            .unwrap_or_else(|| project.directory().join("bin").join("Release"));

        let properties = SqlProjectProperties {
            sql_target_name: Some(self.target_name.clone()),
            binary_directory: Some(binary_directory),
            dac_version: Some(self.dac_version),
        };
        (project, properties)
    }
}

/// Build a project and store its DACPAC as a new version
#[derive(Debug, Args, Clone)]
pub struct ScaffoldCommand {
    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Create the deploy script from a previous version
#[derive(Debug, Args, Clone)]
pub struct ScriptCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Version the script upgrades from
    #[arg(long)]
    pub previous_version: DacVersion,

    /// Script against the "latest" artifacts instead of a new version
    #[arg(long)]
    pub latest: bool,
}

/// Post-process an existing deploy script in place
#[derive(Debug, Args, Clone)]
pub struct ModifyCommand {
    /// Deploy script to modify
    #[arg(short, long)]
    pub script: PathBuf,

    /// Path to the JSON or YAML configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// DACPAC the script upgrades from
    #[arg(long)]
    pub previous_dacpac: PathBuf,

    /// DACPAC the script upgrades to
    #[arg(long)]
    pub new_dacpac: PathBuf,

    /// Version the script upgrades from
    #[arg(long)]
    pub previous_version: DacVersion,

    /// Name of the compiled output (SqlTargetName)
    #[arg(long)]
    pub target_name: String,

    /// Version the script upgrades to
    #[arg(long)]
    pub dac_version: DacVersion,

    /// The script targets the "latest" artifacts
    #[arg(long)]
    pub latest: bool,
}

/// Validate a configuration file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to the JSON or YAML configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
