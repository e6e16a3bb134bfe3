//! Project properties supplied up front instead of read from the project file

use super::SqlProjectService;
use crate::core::{SqlProject, SqlProjectProperties};
use async_trait::async_trait;
use tracing::{debug, error};

/// Hands out a fixed set of project properties
///
/// Used by the command line, which takes the target name, DAC version and
/// binary directory as arguments.
#[derive(Debug, Clone, Default)]
pub struct StaticSqlProjectService {
    properties: SqlProjectProperties,
}

impl StaticSqlProjectService {
    pub fn new(properties: SqlProjectProperties) -> Self {
        Self { properties }
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self
            .properties
            .sql_target_name
            .as_deref()
            .map_or(true, |name| name.trim().is_empty())
        {
            missing.push("SqlTargetName");
        }
        if self.properties.binary_directory.is_none() {
            missing.push("OutputPath");
        }
        if self.properties.dac_version.is_none() {
            missing.push("DacVersion");
        }
        missing
    }
}

#[async_trait]
impl SqlProjectService for StaticSqlProjectService {
    async fn try_load_properties(&self, project: &mut SqlProject) -> bool {
        let missing = self.missing();
        if !missing.is_empty() {
            for property in missing {
                error!("The project property '{}' of {} is not set", property, project.name);
            }
            return false;
        }

        project.properties = self.properties.clone();
        debug!("Loaded properties of {}: {:?}", project.name, project.properties);
        true
    }
}
