//! Deployment configuration from JSON or YAML

use crate::core::version::DacVersion;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MAJOR_TOKEN: &str = "{MAJOR}";
pub const MINOR_TOKEN: &str = "{MINOR}";
pub const BUILD_TOKEN: &str = "{BUILD}";
pub const REVISION_TOKEN: &str = "{REVISION}";

/// Placeholder in custom header/footer text replaced with the previous version
pub const PREVIOUS_VERSION_PLACEHOLDER: &str = "{PREVIOUS_VERSION}";

/// Placeholder in custom header/footer text replaced with the version being deployed
pub const NEXT_VERSION_PLACEHOLDER: &str = "{NEXT_VERSION}";

/// Settings controlling how artifacts are produced and scripts are post-processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationModel {
    /// Artifacts root, relative to the project directory
    pub artifacts_path: String,

    /// Publish profile used for script creation, relative to the project directory
    pub publish_profile_path: Option<String>,

    /// How versions are rendered into directory and file names
    pub version_pattern: String,

    pub build_before_script_creation: bool,

    /// Generate the deploy report next to the deploy script
    pub create_documentation_with_script_creation: bool,

    pub comment_out_unnamed_default_constraint_drops: bool,

    pub replace_unnamed_default_constraint_drops: bool,

    pub track_dacpac_version: bool,

    pub remove_sqlcmd_statements: bool,

    pub custom_header: Option<String>,

    pub custom_footer: Option<String>,

    pub delete_refactorlog_after_versioned_script_generation: bool,

    pub delete_latest_after_versioned_script_generation: bool,
}

impl Default for ConfigurationModel {
    fn default() -> Self {
        Self {
            artifacts_path: "_Deployment".to_string(),
            publish_profile_path: None,
            version_pattern: format!("{}.{}.{}", MAJOR_TOKEN, MINOR_TOKEN, BUILD_TOKEN),
            build_before_script_creation: true,
            create_documentation_with_script_creation: true,
            comment_out_unnamed_default_constraint_drops: false,
            replace_unnamed_default_constraint_drops: false,
            track_dacpac_version: false,
            remove_sqlcmd_statements: false,
            custom_header: None,
            custom_footer: None,
            delete_refactorlog_after_versioned_script_generation: true,
            delete_latest_after_versioned_script_generation: true,
        }
    }
}

impl ConfigurationModel {
    /// Load a configuration file; `.yaml`/`.yml` is read as YAML, anything else as JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// Parse a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ConfigurationModel = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ConfigurationModel = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let artifacts = self.artifacts_path.trim();
        if artifacts.is_empty() {
            return Err(ConfigError::Invalid("Artifacts path must not be empty".to_string()));
        }
        if Path::new(artifacts).is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "Artifacts path must be relative to the project directory: {}",
                artifacts
            )));
        }

        if let Some(profile) = &self.publish_profile_path {
            if !profile.ends_with(".publish.xml") {
                return Err(ConfigError::Invalid(format!(
                    "Publish profile path must end with '.publish.xml': {}",
                    profile
                )));
            }
        }

        self.validate_version_pattern()?;

        if self.comment_out_unnamed_default_constraint_drops
            && self.replace_unnamed_default_constraint_drops
        {
            return Err(ConfigError::Invalid(
                "Unnamed default constraint drops can either be commented out or replaced, not both"
                    .to_string(),
            ));
        }

        Ok(())
    }

    fn validate_version_pattern(&self) -> Result<(), ConfigError> {
        let pattern = self.version_pattern.trim();
        if pattern.is_empty() {
            return Err(ConfigError::Invalid("Version pattern must not be empty".to_string()));
        }

        let parts: Vec<&str> = pattern.split('.').collect();
        if parts.len() < 2 || parts.len() > 4 {
            return Err(ConfigError::Invalid(format!(
                "Version pattern must have between two and four parts: {}",
                pattern
            )));
        }

        for part in parts {
            let known = matches!(part, MAJOR_TOKEN | MINOR_TOKEN | BUILD_TOKEN | REVISION_TOKEN);
            if !known && part.parse::<u32>().is_err() {
                return Err(ConfigError::Invalid(format!(
                    "Version pattern part '{}' is neither a number nor a known placeholder",
                    part
                )));
            }
        }

        Ok(())
    }

    /// Render a version with the configured pattern
    ///
    /// Unset build or revision components render as `0`.
    pub fn format_version(&self, version: &DacVersion) -> String {
        self.version_pattern
            .trim()
            .replace(MAJOR_TOKEN, &version.major.to_string())
            .replace(MINOR_TOKEN, &version.minor.to_string())
            .replace(BUILD_TOKEN, &version.build.unwrap_or(0).to_string())
            .replace(REVISION_TOKEN, &version.revision.unwrap_or(0).to_string())
    }

    /// Custom header text, if it contains anything but whitespace
    pub fn header(&self) -> Option<&str> {
        self.custom_header.as_deref().filter(|h| !h.trim().is_empty())
    }

    /// Custom footer text, if it contains anything but whitespace
    pub fn footer(&self) -> Option<&str> {
        self.custom_footer.as_deref().filter(|f| !f.trim().is_empty())
    }
}
