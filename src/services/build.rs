//! Project builds through the .NET CLI

use super::subprocess::run_tool;
use super::BuildService;
use crate::core::SqlProject;
use async_trait::async_trait;
use std::ffi::OsStr;
use tracing::{error, info};

/// Builds projects with `dotnet build`
#[derive(Debug, Clone)]
pub struct DotnetBuildService {
    /// Path to the dotnet executable
    dotnet_path: String,

    /// Timeout for one build in seconds
    timeout_secs: u64,
}

impl DotnetBuildService {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

    pub fn new(dotnet_path: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            dotnet_path: dotnet_path.into(),
            timeout_secs,
        }
    }
}

impl Default for DotnetBuildService {
    fn default() -> Self {
        Self::new("dotnet", Self::DEFAULT_TIMEOUT_SECS)
    }
}

#[async_trait]
impl BuildService for DotnetBuildService {
    async fn build_project(&self, project: &SqlProject) -> bool {
        info!("Building {}", project.full_path.display());

        let args = [
            OsStr::new("build"),
            project.full_path.as_os_str(),
            OsStr::new("--nologo"),
        ];
        match run_tool(&self.dotnet_path, args, self.timeout_secs).await {
            Ok(_) => true,
            Err(e) => {
                error!("Build of {} failed: {}", project.name, e);
                false
            }
        }
    }
}
