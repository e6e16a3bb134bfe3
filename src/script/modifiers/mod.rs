//! Deploy script modifiers
//!
//! Each modifier is an independent text transform over
//! [`ScriptModificationModel::current_script`](crate::script::ScriptModificationModel::current_script).
//! Which ones run, and in which order, is decided by
//! [`ModifierPipeline`](crate::script::ModifierPipeline).

pub mod custom_text;
pub mod sqlcmd;
pub mod unnamed_constraints;
pub mod version_tracking;

use crate::error::ScriptError;
use crate::script::model::ScriptModificationModel;
use async_trait::async_trait;

pub use custom_text::{AddCustomFooterModifier, AddCustomHeaderModifier};
pub use sqlcmd::RemoveSqlCmdStatementsModifier;
pub use unnamed_constraints::{
    CommentOutUnnamedDefaultConstraintDropsModifier, ReplaceUnnamedDefaultConstraintDropsModifier,
    UNNAMED_DROP_PATTERN,
};
pub use version_tracking::{TrackDacpacVersionModifier, UNSET_VERSION_COMPONENT};

/// A transform applied to the deploy script
#[async_trait]
pub trait ScriptModifier: Send + Sync {
    /// Rewrite `model`'s current script
    ///
    /// Degraded conditions (timeouts, unreadable schema models) are logged
    /// and leave the script as it was; an `Err` means the modifier cannot run
    /// at all with the data it was given.
    async fn modify(&self, model: &mut ScriptModificationModel<'_>) -> Result<(), ScriptError>;
}
