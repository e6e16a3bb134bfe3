//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ModifyCommand, ScaffoldCommand, ScriptCommand, ValidateCommand};
use std::ffi::OsString;

/// Versioned DACPAC artifacts and deploy script post-processing
#[derive(Debug, Parser, Clone)]
#[command(name = "dacpac-lifecycle")]
#[command(version)]
#[command(about = "Versioned DACPAC artifacts and deploy script post-processing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Build a project and store its DACPAC as a new version
    Scaffold(ScaffoldCommand),

    /// Create the deploy script from a previous version to the current one
    Script(ScriptCommand),

    /// Post-process an existing deploy script in place
    Modify(ModifyCommand),

    /// Validate a configuration file
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
