//! The contract every script modifier works on

use crate::core::config::{NEXT_VERSION_PLACEHOLDER, PREVIOUS_VERSION_PLACEHOLDER};
use crate::core::{ConfigurationModel, DacVersion, PathCollection, SqlProject};
use crate::error::ScriptError;

/// Label used for the target version when the "latest" artifacts are scripted
pub const LATEST_LABEL: &str = "latest";

/// A deploy script being post-processed, plus the run data modifiers consult
///
/// Modifiers replace the current script wholesale, one after another.
#[derive(Debug)]
pub struct ScriptModificationModel<'a> {
    current_script: String,
    pub project: &'a SqlProject,
    pub configuration: &'a ConfigurationModel,
    pub paths: &'a PathCollection,
    pub previous_version: &'a DacVersion,
    pub create_latest: bool,
}

impl<'a> ScriptModificationModel<'a> {
    pub fn new(
        script: String,
        project: &'a SqlProject,
        configuration: &'a ConfigurationModel,
        paths: &'a PathCollection,
        previous_version: &'a DacVersion,
        create_latest: bool,
    ) -> Self {
        Self {
            current_script: script,
            project,
            configuration,
            paths,
            previous_version,
            create_latest,
        }
    }

    pub fn current_script(&self) -> &str {
        &self.current_script
    }

    pub fn set_current_script(&mut self, script: String) {
        self.current_script = script;
    }

    pub fn into_script(self) -> String {
        self.current_script
    }

    /// Previous version rendered with the configured pattern
    pub fn previous_version_label(&self) -> String {
        self.configuration.format_version(self.previous_version)
    }

    /// Target version rendered with the configured pattern, or `latest`
    pub fn next_version_label(&self) -> Result<String, ScriptError> {
        if self.create_latest {
            return Ok(LATEST_LABEL.to_string());
        }

        let version = self
            .project
            .properties
            .dac_version
            .as_ref()
            .ok_or(ScriptError::MissingProjectProperty {
                property: "DacVersion",
            })?;
        Ok(self.configuration.format_version(version))
    }

    /// Substitute the version placeholders in configured header/footer text
    ///
    /// The target version is only required when the text refers to it.
    pub fn substitute_versions(&self, text: &str) -> Result<String, ScriptError> {
        let mut result = text.replace(PREVIOUS_VERSION_PLACEHOLDER, &self.previous_version_label());
        if result.contains(NEXT_VERSION_PLACEHOLDER) {
            result = result.replace(NEXT_VERSION_PLACEHOLDER, &self.next_version_label()?);
        }
        Ok(result)
    }
}
