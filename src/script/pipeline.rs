//! Selection, ordering and application of script modifiers

use crate::core::ConfigurationModel;
use crate::error::ScriptError;
use crate::script::matcher::PatternMatcher;
use crate::script::model::ScriptModificationModel;
use crate::script::modifiers::unnamed_constraints::default_matcher;
use crate::script::modifiers::{
    AddCustomFooterModifier, AddCustomHeaderModifier, CommentOutUnnamedDefaultConstraintDropsModifier,
    RemoveSqlCmdStatementsModifier, ReplaceUnnamedDefaultConstraintDropsModifier, ScriptModifier,
    TrackDacpacVersionModifier,
};
use crate::services::{FileSystemAccess, SchemaModelReader};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// The available modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScriptModifierKind {
    CommentOutUnnamedDefaultConstraintDrops,
    ReplaceUnnamedDefaultConstraintDrops,
    AddCustomHeader,
    AddCustomFooter,
    TrackDacpacVersion,
    RemoveSqlCmdStatements,
}

impl ScriptModifierKind {
    /// Application order, lowest first
    ///
    /// Unnamed drops are handled before any text is added around the
    /// script; version tracking wraps the header and footer; SQLCMD removal
    /// runs last so it also sees the statements added before it.
    pub const fn priority(self) -> u8 {
        match self {
            ScriptModifierKind::CommentOutUnnamedDefaultConstraintDrops => 1,
            ScriptModifierKind::ReplaceUnnamedDefaultConstraintDrops => 2,
            ScriptModifierKind::AddCustomHeader => 3,
            ScriptModifierKind::AddCustomFooter => 4,
            ScriptModifierKind::TrackDacpacVersion => 5,
            ScriptModifierKind::RemoveSqlCmdStatements => 6,
        }
    }

    /// Modifiers enabled by `configuration`, in application order
    pub fn selected(configuration: &ConfigurationModel) -> Vec<Self> {
        let mut kinds = Vec::new();

        if configuration.comment_out_unnamed_default_constraint_drops {
            kinds.push(ScriptModifierKind::CommentOutUnnamedDefaultConstraintDrops);
        }
        if configuration.replace_unnamed_default_constraint_drops {
            kinds.push(ScriptModifierKind::ReplaceUnnamedDefaultConstraintDrops);
        }
        if configuration.header().is_some() {
            kinds.push(ScriptModifierKind::AddCustomHeader);
        }
        if configuration.footer().is_some() {
            kinds.push(ScriptModifierKind::AddCustomFooter);
        }
        if configuration.track_dacpac_version {
            kinds.push(ScriptModifierKind::TrackDacpacVersion);
        }
        if configuration.remove_sqlcmd_statements {
            kinds.push(ScriptModifierKind::RemoveSqlCmdStatements);
        }

        kinds.sort_by_key(|kind| kind.priority());
        kinds
    }
}

impl fmt::Display for ScriptModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Applies the configured modifiers to a deploy script
pub struct ModifierPipeline {
    comment_out: CommentOutUnnamedDefaultConstraintDropsModifier,
    replace: ReplaceUnnamedDefaultConstraintDropsModifier,
    header: AddCustomHeaderModifier,
    footer: AddCustomFooterModifier,
    version_tracking: TrackDacpacVersionModifier,
    sqlcmd: RemoveSqlCmdStatementsModifier,
}

impl ModifierPipeline {
    pub fn new(reader: Arc<dyn SchemaModelReader>) -> Self {
        Self::with_matcher(reader, default_matcher())
    }

    /// Use `matcher` to find unnamed default constraint drops
    pub fn with_matcher(reader: Arc<dyn SchemaModelReader>, matcher: Arc<dyn PatternMatcher>) -> Self {
        Self {
            comment_out: CommentOutUnnamedDefaultConstraintDropsModifier::new(matcher.clone()),
            replace: ReplaceUnnamedDefaultConstraintDropsModifier::with_matcher(reader, matcher),
            header: AddCustomHeaderModifier,
            footer: AddCustomFooterModifier,
            version_tracking: TrackDacpacVersionModifier,
            sqlcmd: RemoveSqlCmdStatementsModifier,
        }
    }

    fn modifier(&self, kind: ScriptModifierKind) -> &dyn ScriptModifier {
        match kind {
            ScriptModifierKind::CommentOutUnnamedDefaultConstraintDrops => &self.comment_out,
            ScriptModifierKind::ReplaceUnnamedDefaultConstraintDrops => &self.replace,
            ScriptModifierKind::AddCustomHeader => &self.header,
            ScriptModifierKind::AddCustomFooter => &self.footer,
            ScriptModifierKind::TrackDacpacVersion => &self.version_tracking,
            ScriptModifierKind::RemoveSqlCmdStatements => &self.sqlcmd,
        }
    }

    /// Apply the modifiers selected by the model's configuration in priority order
    ///
    /// Returns the modifiers that ran. Stops at the first modifier error.
    pub async fn apply(
        &self,
        model: &mut ScriptModificationModel<'_>,
    ) -> Result<Vec<ScriptModifierKind>, ScriptError> {
        let kinds = ScriptModifierKind::selected(model.configuration);

        for kind in &kinds {
            debug!("Applying modifier {}", kind);
            self.modifier(*kind).modify(model).await?;
        }

        Ok(kinds)
    }

    /// Read the script at `path`, modify it and write it back
    ///
    /// `model_for` builds the modification model around the script content.
    /// Nothing is written when reading fails or a modifier errors.
    pub async fn modify_file<'a, F>(
        &self,
        file_system: &dyn FileSystemAccess,
        path: &Path,
        model_for: F,
    ) -> Result<Vec<ScriptModifierKind>, ScriptError>
    where
        F: FnOnce(String) -> ScriptModificationModel<'a> + Send,
    {
        let script = file_system
            .read_text(path)
            .await
            .map_err(|source| ScriptError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut model = model_for(script);
        let applied = self.apply(&mut model).await?;

        if applied.is_empty() {
            info!("No script modifiers are enabled");
            return Ok(applied);
        }

        file_system
            .write_text(path, model.current_script())
            .await
            .map_err(|source| ScriptError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Applied {} script modifier(s) to {}", applied.len(), path.display());
        Ok(applied)
    }
}
