//! Strips SQLCMD-only statements so the script runs in plain T-SQL tools

use super::ScriptModifier;
use crate::error::ScriptError;
use crate::script::model::ScriptModificationModel;
use crate::script::search::terminators;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use tracing::debug;

/// The comment explaining the SQLCMD mode detection
static DETECTION_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)/\*\s*Detect SQLCMD mode.*?\*/").expect("Invalid detection comment regex")
});

/// The block disabling execution outside SQLCMD mode
static DETECTION_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)IF N'\$\(__IsSqlCmdEnabled\)' NOT LIKE N'True'\s*BEGIN.*?\bEND\b")
        .expect("Invalid detection block regex")
});

/// A block comment holding nothing but `:setvar` lines
static COMMENTED_SETVAR_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/\*(?:\s*:setvar[^\r\n]*)+\s*\*/").expect("Invalid setvar group regex")
});

static SETVAR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:--[ \t]*)?:setvar\b[^\r\n]*(?:\r?\n)?")
        .expect("Invalid setvar line regex")
});

static ON_ERROR_EXIT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:--[ \t]*)?:on error exit[^\r\n]*(?:\r?\n)?")
        .expect("Invalid on error exit regex")
});

/// Removes `:setvar`, `:on error exit` and the SQLCMD mode detection
///
/// Batches left empty by the removal are dropped together with their `GO`,
/// so commented and uncommented input produce the same output.
pub struct RemoveSqlCmdStatementsModifier;

#[async_trait]
impl ScriptModifier for RemoveSqlCmdStatementsModifier {
    async fn modify(&self, model: &mut ScriptModificationModel<'_>) -> Result<(), ScriptError> {
        let script = remove_sqlcmd_statements(model.current_script());
        model.set_current_script(script);
        Ok(())
    }
}

fn remove_sqlcmd_statements(script: &str) -> String {
    let mut result = String::with_capacity(script.len());
    let mut batch_start = 0;
    let mut removed = 0;

    for terminator in terminators(script) {
        let batch = &script[batch_start..terminator.start];
        let stripped = strip_sqlcmd(batch);

        // a batch only goes away, with its GO line, when the removal emptied it
        if stripped.trim().is_empty() && !batch.trim().is_empty() {
            removed += 1;
        } else {
            result.push_str(&stripped);
            result.push_str(&script[terminator.start..terminator.next_line]);
        }
        batch_start = terminator.next_line;
    }
    result.push_str(&strip_sqlcmd(&script[batch_start..]));

    debug!("Removed {} batches holding only SQLCMD statements", removed);
    result
}

/// Remove the SQLCMD constructs from a single batch
fn strip_sqlcmd(batch: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(batch);

    for regex in [
        &*DETECTION_COMMENT,
        &*DETECTION_BLOCK,
        &*COMMENTED_SETVAR_GROUP,
        &*SETVAR_LINE,
        &*ON_ERROR_EXIT_LINE,
    ] {
        if let Cow::Owned(replaced) = regex.replace_all(&current, "") {
            current = Cow::Owned(replaced);
        }
    }

    current
}
