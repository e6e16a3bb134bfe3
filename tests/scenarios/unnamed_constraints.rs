//! Test: Unnamed default constraint drops - replacement, excess drops, timeouts

use crate::helpers::*;
use dacpac_lifecycle::core::{ConfigurationModel, DefaultConstraint};
use dacpac_lifecycle::script::modifiers::{
    CommentOutUnnamedDefaultConstraintDropsModifier, ReplaceUnnamedDefaultConstraintDropsModifier, ScriptModifier,
    UNNAMED_DROP_PATTERN,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const DYNAMIC_DROP_OF_AUTHOR_NAME: &str = concat!(
    "DECLARE @schema_name SYSNAME, @table_name SYSNAME, @column_name SYSNAME, @constraint_name SYSNAME, @command NVARCHAR(MAX);\r\n",
    "SET @schema_name = N'dbo';\r\n",
    "SET @table_name = N'Author';\r\n",
    "SET @column_name = N'Name';\r\n",
    "SET @constraint_name = NULL;\r\n",
    "SELECT @constraint_name = dc.[name]\r\n",
    "FROM [sys].[tables] AS t\r\n",
    "INNER JOIN [sys].[default_constraints] AS dc ON dc.[parent_object_id] = t.[object_id]\r\n",
    "INNER JOIN [sys].[columns] AS c ON c.[object_id] = t.[object_id] AND c.[column_id] = dc.[parent_column_id]\r\n",
    "WHERE SCHEMA_NAME(t.[schema_id]) = @schema_name AND t.[name] = @table_name AND c.[name] = @column_name;\r\n",
    "IF @constraint_name IS NOT NULL\r\n",
    "BEGIN\r\n",
    "    SET @command = N'ALTER TABLE ' + QUOTENAME(@schema_name) + N'.' + QUOTENAME(@table_name) + N' DROP CONSTRAINT ' + QUOTENAME(@constraint_name) + N';';\r\n",
    "    EXECUTE (@command);\r\n",
    "END",
);

fn replacing() -> ScriptFixture {
    ScriptFixture::new(ConfigurationModel {
        replace_unnamed_default_constraint_drops: true,
        ..Default::default()
    })
}

fn previous_model() -> Vec<DefaultConstraint> {
    vec![
        DefaultConstraint::unnamed("dbo", "Author", "Name"),
        DefaultConstraint::named("dbo", "Book", "Title", "DF_Book_Title"),
        DefaultConstraint::unnamed("dbo", "Publisher", "Country"),
        DefaultConstraint::unnamed("dbo", "Book", "Stock"),
    ]
}

fn modifier(reader: FakeSchemaModelReader) -> ReplaceUnnamedDefaultConstraintDropsModifier {
    ReplaceUnnamedDefaultConstraintDropsModifier::new(Arc::new(reader))
}

/// A single placeholder becomes the catalog lookup, the announcement stays
#[tokio::test]
async fn test_single_drop_is_replaced() {
    let fixture = replacing();
    let mut model = fixture.model(&unnamed_drop("dbo", "Author"));
    let reader = FakeSchemaModelReader::new()
        .with_model(PREVIOUS_DACPAC, previous_model())
        .with_model(NEW_DACPAC, vec![]);

    modifier(reader).modify(&mut model).await.unwrap();

    let expected = format!(
        "PRINT N'Dropping unnamed constraint on [dbo].[Author]...';\r\n\r\n\r\nGO\r\n{}\r\n\r\n\r\nGO\r\n",
        DYNAMIC_DROP_OF_AUTHOR_NAME
    );
    assert_eq!(model.current_script(), expected);
}

/// Placeholders map to the unnamed constraints of the previous model in order;
/// named drops are left alone
#[tokio::test]
async fn test_placeholders_map_to_previous_model_in_order() {
    let (_guard, logs) = capture_logs();
    let fixture = replacing();
    let named = named_drop("dbo", "Book", "DF_Book_Title");
    let script = format!(
        "{}{}{}",
        unnamed_drop("dbo", "Author"),
        named,
        unnamed_drop("dbo", "Publisher")
    );
    let mut model = fixture.model(&script);
    let reader = FakeSchemaModelReader::new()
        .with_model(PREVIOUS_DACPAC, previous_model())
        .with_model(NEW_DACPAC, vec![]);

    modifier(reader).modify(&mut model).await.unwrap();

    let result = model.current_script();
    assert!(!result.contains("DROP CONSTRAINT ;"));
    assert!(result.contains(&named), "named drops must stay untouched");

    let author = result.find("SET @table_name = N'Author';").unwrap();
    let publisher = result.find("SET @table_name = N'Publisher';").unwrap();
    assert!(author < publisher);
    assert!(result.contains("SET @column_name = N'Country';"));
    assert!(!result.contains("N'Stock'"), "only two placeholders were present");
    assert_eq!(result.matches("DECLARE @schema_name").count(), 2);

    assert!(logs.warnings().is_empty(), "{}", logs.contents());
}

/// Variables are declared once per batch
#[tokio::test]
async fn test_two_drops_in_one_batch_declare_once() {
    let fixture = replacing();
    let script = "ALTER TABLE [dbo].[Author] DROP CONSTRAINT ;\r\n\r\n\
ALTER TABLE [dbo].[Publisher] DROP CONSTRAINT ;\r\n\r\n\r\nGO\r\n";
    let mut model = fixture.model(script);
    let reader = FakeSchemaModelReader::new()
        .with_model(PREVIOUS_DACPAC, previous_model())
        .with_model(NEW_DACPAC, vec![]);

    modifier(reader).modify(&mut model).await.unwrap();

    let result = model.current_script();
    assert_eq!(result.matches("DECLARE @schema_name").count(), 1);
    assert_eq!(result.matches("SET @constraint_name = NULL;").count(), 2);
    assert!(result.contains("SET @table_name = N'Publisher';"));
    assert!(result.ends_with("END\r\n\r\n\r\nGO\r\n"));
}

/// More placeholders than unnamed constraints: the excess stays, one warning
#[tokio::test]
async fn test_excess_placeholders_are_left_with_one_warning() {
    let (_guard, logs) = capture_logs();
    let fixture = replacing();
    let script = format!(
        "{}{}{}",
        unnamed_drop("dbo", "Author"),
        unnamed_drop("dbo", "Publisher"),
        unnamed_drop("sales", "Order")
    );
    let mut model = fixture.model(&script);
    let reader = FakeSchemaModelReader::new()
        .with_model(
            PREVIOUS_DACPAC,
            vec![
                DefaultConstraint::unnamed("dbo", "Author", "Name"),
                DefaultConstraint::named("dbo", "Book", "Title", "DF_Book_Title"),
                DefaultConstraint::unnamed("dbo", "Publisher", "Country"),
            ],
        )
        .with_model(NEW_DACPAC, vec![]);

    modifier(reader).modify(&mut model).await.unwrap();

    let result = model.current_script();
    assert!(result.contains("SET @table_name = N'Author';"));
    assert!(result.contains("SET @table_name = N'Publisher';"));
    assert!(result.ends_with(&unnamed_drop("sales", "Order")));

    let warnings = logs.warnings();
    assert_eq!(warnings.len(), 1, "{}", logs.contents());
    assert!(warnings[0].contains("1 more unnamed default constraint drop(s)"));
}

/// Unreadable models leave the script unchanged and report every error
#[tokio::test]
async fn test_read_errors_leave_script_unchanged() {
    let (_guard, logs) = capture_logs();
    let fixture = replacing();
    let script = unnamed_drop("dbo", "Author");
    let mut model = fixture.model(&script);
    let reader = FakeSchemaModelReader::new()
        .with_errors(PREVIOUS_DACPAC, &["model.xml is not well-formed", "no Model element"]);

    modifier(reader).modify(&mut model).await.unwrap();

    assert_eq!(model.current_script(), script);

    let errors = logs.errors();
    assert_eq!(errors.len(), 3, "{}", logs.contents());
    assert!(errors[0]
        .contains("Failed to read default constraints of the previous model: model.xml is not well-formed"));
    assert!(errors[1].contains("Failed to read default constraints of the previous model: no Model element"));
    assert!(errors[2].contains("Failed to read default constraints of the current model: No schema model at"));
}

/// A single timeout on a huge script is retried and the drop is still replaced
#[tokio::test]
async fn test_single_timeout_is_retried() {
    let (_guard, logs) = capture_logs();
    let fixture = replacing();
    let script = format!(
        "PRINT N'{}';\r\nGO\r\n{}",
        "x".repeat(1_000_000),
        unnamed_drop("dbo", "Author")
    );
    assert!(script.len() >= 1_000_000);
    let mut model = fixture.model(&script);
    let reader = FakeSchemaModelReader::new()
        .with_model(PREVIOUS_DACPAC, previous_model())
        .with_model(NEW_DACPAC, vec![]);
    let matcher = SlowOnLargeInputMatcher::new(UNNAMED_DROP_PATTERN.clone(), 1_000_000, 1);

    ReplaceUnnamedDefaultConstraintDropsModifier::with_matcher(Arc::new(reader), Arc::new(matcher))
        .modify(&mut model)
        .await
        .unwrap();

    assert!(model.current_script().contains(DYNAMIC_DROP_OF_AUTHOR_NAME));

    let warnings = logs.warnings();
    assert_eq!(warnings.len(), 1, "{}", logs.contents());
    assert!(warnings[0].contains("timed out 1 time(s)"));
    assert!(!warnings[0].contains("not searched"));
}

/// A timed-out retry stops the search; the script is kept as it was
#[tokio::test]
async fn test_repeated_timeout_stops_search() {
    let (_guard, logs) = capture_logs();
    let fixture = ScriptFixture::new(ConfigurationModel {
        comment_out_unnamed_default_constraint_drops: true,
        ..Default::default()
    });
    let script = format!(
        "PRINT N'{}';\r\nGO\r\n{}",
        "x".repeat(1_000_000),
        unnamed_drop("dbo", "Author")
    );
    let mut model = fixture.model(&script);
    let matcher = SlowOnLargeInputMatcher::new(UNNAMED_DROP_PATTERN.clone(), 1_000_000, 2);

    CommentOutUnnamedDefaultConstraintDropsModifier::new(Arc::new(matcher))
        .modify(&mut model)
        .await
        .unwrap();

    assert_eq!(model.current_script(), script);

    let warnings = logs.warnings();
    assert_eq!(warnings.len(), 1, "{}", logs.contents());
    assert!(warnings[0].contains("timed out 2 time(s)"));
    assert!(warnings[0].contains("the rest of the script was not searched"));
}
