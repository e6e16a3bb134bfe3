//! Records deployed DACPAC versions in a tracking table

use super::ScriptModifier;
use crate::core::DacVersion;
use crate::error::ScriptError;
use crate::script::model::ScriptModificationModel;
use crate::script::search::batch_range;
use async_trait::async_trait;
use tracing::debug;

/// Stored for build and revision components the version does not set
pub const UNSET_VERSION_COMPONENT: i64 = 2_147_483_647;

/// Tracking table created on demand in the target database
pub const TRACKING_TABLE: &str = "[dbo].[__DacpacVersion]";

/// The deployment start is recorded right after this batch when present
const USE_DATABASE_STATEMENT: &str = "USE [$(DatabaseName)];";

/// Inserts a tracking row at deploy start and completes it at deploy end
pub struct TrackDacpacVersionModifier;

#[async_trait]
impl ScriptModifier for TrackDacpacVersionModifier {
    async fn modify(&self, model: &mut ScriptModificationModel<'_>) -> Result<(), ScriptError> {
        let properties = &model.project.properties;
        let target_name = properties
            .sql_target_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or(ScriptError::MissingProjectProperty {
                property: "SqlTargetName",
            })?;
        let version = properties
            .dac_version
            .as_ref()
            .ok_or(ScriptError::MissingProjectProperty {
                property: "DacVersion",
            })?;

        let row = TrackingRow::new(target_name, version);
        let script = model.current_script();

        let use_database = script
            .find(USE_DATABASE_STATEMENT)
            .map(|offset| batch_range(script, offset..offset + USE_DATABASE_STATEMENT.len(), 0));
        let with_start = match use_database {
            Some(range) => {
                debug!("Recording deployment start after the database selection batch");
                format!(
                    "{}\r\n{}{}",
                    &script[..range.end],
                    row.start_block(),
                    &script[range.end..]
                )
            }
            None => {
                debug!("No database selection batch found, recording deployment start first");
                format!("{}\r\n{}", row.start_block(), script)
            }
        };

        let mut result = with_start.trim_end().to_string();
        if !ends_with_terminator(&result) {
            result.push_str("\r\nGO");
        }
        result.push_str("\r\n");
        result.push_str(&row.end_block());
        result.push_str("\r\n");

        model.set_current_script(result);
        Ok(())
    }
}

fn ends_with_terminator(script: &str) -> bool {
    script == "GO" || script.ends_with("\nGO")
}

/// Key of the tracking row written by one deployment
struct TrackingRow {
    name: String,
    major: u32,
    minor: u32,
    build: i64,
    revision: i64,
}

impl TrackingRow {
    fn new(target_name: &str, version: &DacVersion) -> Self {
        Self {
            name: target_name.replace('\'', "''"),
            major: version.major,
            minor: version.minor,
            build: version.build.map_or(UNSET_VERSION_COMPONENT, i64::from),
            revision: version.revision.map_or(UNSET_VERSION_COMPONENT, i64::from),
        }
    }

    fn start_block(&self) -> String {
        [
            format!("IF OBJECT_ID(N'{}', N'U') IS NULL", TRACKING_TABLE),
            "BEGIN".to_string(),
            format!("    CREATE TABLE {}", TRACKING_TABLE),
            "    (".to_string(),
            "        [Id] INT IDENTITY(1, 1) NOT NULL CONSTRAINT [PK___DacpacVersion] PRIMARY KEY,".to_string(),
            "        [DacpacName] NVARCHAR(128) NOT NULL,".to_string(),
            "        [Major] INT NOT NULL,".to_string(),
            "        [Minor] INT NOT NULL,".to_string(),
            "        [Build] INT NOT NULL,".to_string(),
            "        [Revision] INT NOT NULL,".to_string(),
            "        [DeploymentStart] DATETIME2 NOT NULL,".to_string(),
            "        [DeploymentEnd] DATETIME2 NULL".to_string(),
            "    );".to_string(),
            "END".to_string(),
            "GO".to_string(),
            format!(
                "INSERT INTO {} ([DacpacName], [Major], [Minor], [Build], [Revision], [DeploymentStart])",
                TRACKING_TABLE
            ),
            format!(
                "VALUES (N'{}', {}, {}, {}, {}, SYSUTCDATETIME());",
                self.name, self.major, self.minor, self.build, self.revision
            ),
            "GO".to_string(),
        ]
        .join("\r\n")
    }

    fn end_block(&self) -> String {
        [
            format!("UPDATE {}", TRACKING_TABLE),
            "SET [DeploymentEnd] = SYSUTCDATETIME()".to_string(),
            format!(
                "WHERE [DacpacName] = N'{}' AND [Major] = {} AND [Minor] = {} AND [Build] = {} AND [Revision] = {} AND [DeploymentEnd] IS NULL;",
                self.name, self.major, self.minor, self.build, self.revision
            ),
            "GO".to_string(),
        ]
        .join("\r\n")
    }
}
