//! Handling of `DROP CONSTRAINT ;` statements for unnamed default constraints
//!
//! Schema tooling generates random names for default constraints declared
//! without one, so the deploy script cannot name them and emits a drop with
//! the name left out. These modifiers either comment such drops out or
//! rewrite them into SQL that resolves the name from the catalog at deploy
//! time, using the previous schema model to learn which column each drop
//! belongs to.

use super::ScriptModifier;
use crate::core::DefaultConstraint;
use crate::error::ScriptError;
use crate::script::matcher::{BoundedSearch, PatternMatcher, TimedRegexMatcher};
use crate::script::model::ScriptModificationModel;
use crate::script::search::for_each_bounded_match;
use crate::services::SchemaModelReader;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A drop statement with the constraint name left out
const DROP_STATEMENT_SOURCE: &str =
    r"ALTER TABLE \[(?:[^\]\r\n]|\]\])+\]\.\[(?:[^\]\r\n]|\]\])+\] DROP CONSTRAINT\s*;";

/// An unnamed drop, together with the `PRINT` batch announcing it when present
pub static UNNAMED_DROP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?m)^(?:PRINT N'Dropping unnamed constraint on [^\r\n]*\r?\n(?:[ \t]*\r?\n)*GO\r?\n(?:[ \t]*\r?\n)*)?{}",
        DROP_STATEMENT_SOURCE
    ))
    .expect("Invalid unnamed drop regex")
});

static DROP_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(DROP_STATEMENT_SOURCE).expect("Invalid drop statement regex"));

/// Matcher used when none is injected
pub fn default_matcher() -> Arc<dyn PatternMatcher> {
    Arc::new(TimedRegexMatcher::new(UNNAMED_DROP_PATTERN.clone()))
}

fn report_timeouts(search: &BoundedSearch<'_>) {
    if search.timeouts() == 0 {
        return;
    }

    let skipped = if search.is_exhausted() {
        "; the rest of the script was not searched"
    } else {
        ""
    };
    warn!(
        "Pattern matching timed out {} time(s) while searching for unnamed default constraint drops{}",
        search.timeouts(),
        skipped
    );
}

/// Comments out every batch belonging to an unnamed drop
pub struct CommentOutUnnamedDefaultConstraintDropsModifier {
    matcher: Arc<dyn PatternMatcher>,
}

impl CommentOutUnnamedDefaultConstraintDropsModifier {
    pub fn new(matcher: Arc<dyn PatternMatcher>) -> Self {
        Self { matcher }
    }
}

impl Default for CommentOutUnnamedDefaultConstraintDropsModifier {
    fn default() -> Self {
        Self::new(default_matcher())
    }
}

#[async_trait]
impl ScriptModifier for CommentOutUnnamedDefaultConstraintDropsModifier {
    async fn modify(&self, model: &mut ScriptModificationModel<'_>) -> Result<(), ScriptError> {
        let mut search = BoundedSearch::new(self.matcher.as_ref());
        let mut commented = 0;

        let script = for_each_bounded_match(model.current_script(), 0, &mut search, |batch| {
            commented += 1;
            comment_out(batch)
        })
        .await;

        debug!("Commented out {} unnamed default constraint drop(s)", commented);
        report_timeouts(&search);
        model.set_current_script(script);
        Ok(())
    }
}

fn comment_out(batch: &str) -> String {
    batch
        .split('\n')
        .map(|line| format!("-- {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrites unnamed drops into statements resolving the name at deploy time
///
/// The k-th unnamed drop in the script belongs to the k-th unnamed default
/// constraint of the previous schema model. Drops beyond the model's count
/// are left as they are and reported with a single warning.
pub struct ReplaceUnnamedDefaultConstraintDropsModifier {
    reader: Arc<dyn SchemaModelReader>,
    matcher: Arc<dyn PatternMatcher>,
}

impl ReplaceUnnamedDefaultConstraintDropsModifier {
    pub fn new(reader: Arc<dyn SchemaModelReader>) -> Self {
        Self::with_matcher(reader, default_matcher())
    }

    pub fn with_matcher(reader: Arc<dyn SchemaModelReader>, matcher: Arc<dyn PatternMatcher>) -> Self {
        Self { reader, matcher }
    }
}

#[async_trait]
impl ScriptModifier for ReplaceUnnamedDefaultConstraintDropsModifier {
    async fn modify(&self, model: &mut ScriptModificationModel<'_>) -> Result<(), ScriptError> {
        let sources = &model.paths.deploy_sources;
        let Some(previous_path) = sources.previous_dacpac_path.as_deref() else {
            error!("No previous DACPAC is known, unnamed default constraint drops were not replaced");
            return Ok(());
        };

        let previous = self.reader.default_constraints(previous_path).await;
        let current = self.reader.default_constraints(&sources.new_dacpac_path).await;

        let (previous, current) = match (previous, current) {
            (Ok(previous), Ok(current)) => (previous, current),
            (previous, current) => {
                for message in previous.err().unwrap_or_default() {
                    error!("Failed to read default constraints of the previous model: {}", message);
                }
                for message in current.err().unwrap_or_default() {
                    error!("Failed to read default constraints of the current model: {}", message);
                }
                return Ok(());
            }
        };

        let unnamed: Vec<&DefaultConstraint> =
            previous.iter().filter(|c| c.is_unnamed()).collect();
        debug!(
            "{} unnamed default constraint(s) in the previous model, {} in the current model",
            unnamed.len(),
            current.iter().filter(|c| c.is_unnamed()).count()
        );

        let mut search = BoundedSearch::new(self.matcher.as_ref());
        let mut occurrences = 0;

        let script = for_each_bounded_match(model.current_script(), 0, &mut search, |batch| {
            let mut declared = false;
            DROP_STATEMENT
                .replace_all(batch, |caps: &Captures| {
                    let constraint = unnamed.get(occurrences);
                    occurrences += 1;
                    match constraint {
                        Some(constraint) => {
                            let block = dynamic_drop(constraint, !declared);
                            declared = true;
                            block
                        }
                        None => caps[0].to_string(),
                    }
                })
                .into_owned()
        })
        .await;

        if occurrences > unnamed.len() {
            warn!(
                "The deploy script contains {} more unnamed default constraint drop(s) than the previous model defines; they were left unchanged",
                occurrences - unnamed.len()
            );
        }
        report_timeouts(&search);

        model.set_current_script(script);
        Ok(())
    }
}

fn sql_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

/// Statements dropping the default constraint of a column by its catalog name
///
/// Variables are batch-scoped, so only the first block in a batch declares them.
fn dynamic_drop(constraint: &DefaultConstraint, declare: bool) -> String {
    let mut lines = Vec::new();
    if declare {
        lines.push(
            "DECLARE @schema_name SYSNAME, @table_name SYSNAME, @column_name SYSNAME, @constraint_name SYSNAME, @command NVARCHAR(MAX);"
                .to_string(),
        );
    }
    lines.extend([
        format!("SET @schema_name = {};", sql_literal(&constraint.schema)),
        format!("SET @table_name = {};", sql_literal(&constraint.table)),
        format!("SET @column_name = {};", sql_literal(&constraint.column)),
        "SET @constraint_name = NULL;".to_string(),
        "SELECT @constraint_name = dc.[name]".to_string(),
        "FROM [sys].[tables] AS t".to_string(),
        "INNER JOIN [sys].[default_constraints] AS dc ON dc.[parent_object_id] = t.[object_id]".to_string(),
        "INNER JOIN [sys].[columns] AS c ON c.[object_id] = t.[object_id] AND c.[column_id] = dc.[parent_column_id]".to_string(),
        "WHERE SCHEMA_NAME(t.[schema_id]) = @schema_name AND t.[name] = @table_name AND c.[name] = @column_name;".to_string(),
        "IF @constraint_name IS NOT NULL".to_string(),
        "BEGIN".to_string(),
        "    SET @command = N'ALTER TABLE ' + QUOTENAME(@schema_name) + N'.' + QUOTENAME(@table_name) + N' DROP CONSTRAINT ' + QUOTENAME(@constraint_name) + N';';".to_string(),
        "    EXECUTE (@command);".to_string(),
        "END".to_string(),
    ]);
    lines.join("\r\n")
}
