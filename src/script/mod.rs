//! Deploy script post-processing
//!
//! Searching works on `GO`-delimited batches ([`search`]), bounded in time
//! where it uses regular expressions ([`matcher`]). Modifiers built on top
//! of it are selected and ordered by [`ModifierPipeline`].

pub mod matcher;
pub mod model;
pub mod modifiers;
pub mod pipeline;
pub mod search;

pub use matcher::{BoundedSearch, MatchTimeout, PatternMatcher, TimedRegexMatcher};
pub use model::ScriptModificationModel;
pub use modifiers::ScriptModifier;
pub use pipeline::{ModifierPipeline, ScriptModifierKind};
pub use search::{
    find_statement_range, for_each_bounded_match, for_each_located_match, for_each_match, StatementRange,
};
