//! Default constraints read from a compiled schema model

/// A column default constraint
///
/// `constraint_name` is `None` for constraints the schema tooling generated
/// without an explicit name; deploy scripts can only refer to those
/// positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultConstraint {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub constraint_name: Option<String>,
}

impl DefaultConstraint {
    pub fn unnamed(schema: &str, table: &str, column: &str) -> Self {
        Self {
            schema: schema.to_string(),
            table: table.to_string(),
            column: column.to_string(),
            constraint_name: None,
        }
    }

    pub fn named(schema: &str, table: &str, column: &str, name: &str) -> Self {
        Self {
            constraint_name: Some(name.to_string()),
            ..Self::unnamed(schema, table, column)
        }
    }

    pub fn is_unnamed(&self) -> bool {
        self.constraint_name.is_none()
    }
}
