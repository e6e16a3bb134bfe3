//! Deploy script and report generation through SqlPackage

use super::subprocess::run_tool;
use super::{DacAccess, DeployArtifacts, DeployRequest};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Runs `SqlPackage /Action:Script` and `/Action:DeployReport`
#[derive(Debug, Clone)]
pub struct SqlPackageDacAccess {
    /// Path to the SqlPackage executable
    sqlpackage_path: String,

    /// Timeout for one SqlPackage invocation in seconds
    timeout_secs: u64,

    /// Where SqlPackage writes its output before it is read back
    scratch_directory: PathBuf,
}

impl SqlPackageDacAccess {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

    pub fn new(sqlpackage_path: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            sqlpackage_path: sqlpackage_path.into(),
            timeout_secs,
            scratch_directory: std::env::temp_dir(),
        }
    }

    pub fn with_scratch_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.scratch_directory = directory.into();
        self
    }

    fn arguments(action: &str, request: &DeployRequest<'_>, output: &Path) -> Vec<OsString> {
        let argument = |name: &str, value: &Path| {
            let mut arg = OsString::from(format!("/{}:", name));
            arg.push(value.as_os_str());
            arg
        };

        vec![
            OsString::from(format!("/Action:{}", action)),
            argument("SourceFile", request.new_dacpac),
            argument("TargetFile", request.previous_dacpac),
            argument("Profile", request.publish_profile),
            argument("OutputPath", output),
        ]
    }

    /// Run one action and return the content of its output file
    async fn run_action(
        &self,
        action: &str,
        extension: &str,
        request: &DeployRequest<'_>,
    ) -> Result<String, String> {
        let output = self
            .scratch_directory
            .join(format!("dacpac-lifecycle-{}.{}", Uuid::new_v4(), extension));
        let args = Self::arguments(action, request, &output);

        info!("Running SqlPackage {}", action);
        run_tool(&self.sqlpackage_path, args, self.timeout_secs)
            .await
            .map_err(|e| e.to_string())?;

        let content = tokio::fs::read_to_string(&output)
            .await
            .map_err(|e| format!("Failed to read SqlPackage output {}: {}", output.display(), e))?;

        if let Err(e) = tokio::fs::remove_file(&output).await {
            debug!("Could not remove {}: {}", output.display(), e);
        }
        Ok(content)
    }
}

impl Default for SqlPackageDacAccess {
    fn default() -> Self {
        Self::new("SqlPackage", Self::DEFAULT_TIMEOUT_SECS)
    }
}

#[async_trait]
impl DacAccess for SqlPackageDacAccess {
    async fn create_deploy_files(
        &self,
        request: &DeployRequest<'_>,
    ) -> Result<DeployArtifacts, Vec<String>> {
        let mut errors = Vec::new();

        let script = match self.run_action("Script", "sql", request).await {
            Ok(script) => Some(script),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let report = if request.create_report {
            match self.run_action("DeployReport", "xml", request).await {
                Ok(report) => Some(report),
                Err(e) => {
                    errors.push(e);
                    None
                }
            }
        } else {
            None
        };

        match script {
            Some(script) if errors.is_empty() => Ok(DeployArtifacts { script, report }),
            _ => Err(errors),
        }
    }
}
