//! Running external .NET tools

use crate::error::ServiceError;
use std::ffi::OsStr;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Output of a successful tool invocation
#[derive(Debug, Clone)]
pub(crate) struct ToolOutput {
    pub stdout: String,
}

/// Run `program` with `args`, failing on spawn errors, timeouts and non-zero exit
pub(crate) async fn run_tool<I, S>(program: &str, args: I, timeout_secs: u64) -> Result<ToolOutput, ServiceError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);
    debug!("Running {:?}", command.as_std());

    let output = timeout(Duration::from_secs(timeout_secs), command.output())
        .await
        .map_err(|_| ServiceError::Timeout {
            program: program.to_string(),
            secs: timeout_secs,
        })?
        .map_err(|source| ServiceError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        // the .NET tools report most failures on stdout
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        warn!("{} exited with code {}", program, code);
        return Err(ServiceError::Exit {
            program: program.to_string(),
            code,
            stderr,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    debug!("{} returned {} bytes of output", program, stdout.len());
    Ok(ToolOutput { stdout })
}
