//! SQL project model

use crate::core::version::DacVersion;
use std::path::{Path, PathBuf};

/// A database project the pipelines operate on
#[derive(Debug, Clone)]
pub struct SqlProject {
    /// Project name (usually the project file stem)
    pub name: String,

    /// Full path to the project file
    pub full_path: PathBuf,

    /// Properties loaded by `LoadSqlProjectPropertiesUnit`
    pub properties: SqlProjectProperties,
}

/// Properties read from the project file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlProjectProperties {
    /// Name of the compiled output (`<name>.dacpac`)
    pub sql_target_name: Option<String>,

    /// Directory the build writes the DACPAC into
    pub binary_directory: Option<PathBuf>,

    /// Version stamped into the DACPAC
    pub dac_version: Option<DacVersion>,
}

impl SqlProject {
    /// Create a project from its file path, with the name taken from the file stem
    pub fn new(full_path: impl Into<PathBuf>) -> Self {
        let full_path = full_path.into();
        let name = full_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            full_path,
            properties: SqlProjectProperties::default(),
        }
    }

    /// Directory containing the project file
    pub fn directory(&self) -> &Path {
        self.full_path.parent().unwrap_or_else(|| Path::new(""))
    }
}
