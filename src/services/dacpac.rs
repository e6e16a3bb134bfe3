//! Default constraints read straight from a DACPAC's `model.xml`

use super::SchemaModelReader;
use crate::core::DefaultConstraint;
use crate::error::ServiceError;
use async_trait::async_trait;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

const NS: &str = "http://schemas.microsoft.com/sqlserver/dac/Serialization/2012/02";
const MODEL_ENTRY: &str = "model.xml";
const DEFAULT_CONSTRAINT_TYPE: &str = "SqlDefaultConstraint";

fn is_ns_element(node: &roxmltree::Node, local_name: &str) -> bool {
    node.is_element() && node.tag_name().name() == local_name && node.tag_name().namespace() == Some(NS)
}

/// Name of the first reference in the relationship called `relationship`
fn referenced_name<'a>(element: &roxmltree::Node<'a, 'a>, relationship: &str) -> Option<&'a str> {
    let relationship = element
        .children()
        .find(|c| is_ns_element(c, "Relationship") && c.attribute("Name") == Some(relationship))?;
    let entry = relationship.children().find(|c| is_ns_element(c, "Entry"))?;
    let references = entry.children().find(|c| is_ns_element(c, "References"))?;
    references.attribute("Name")
}

/// Split a multi-part name like `[dbo].[Odd]]Name]` into its unbracketed parts
fn name_parts(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '[' {
            continue;
        }
        let mut part = String::new();
        while let Some(c) = chars.next() {
            if c == ']' {
                if chars.peek() == Some(&']') {
                    chars.next();
                    part.push(']');
                } else {
                    break;
                }
            } else {
                part.push(c);
            }
        }
        parts.push(part);
    }

    parts
}

/// Every default constraint in the model, in document order
pub fn parse_default_constraints(model_xml: &str) -> Result<Vec<DefaultConstraint>, String> {
    let document = roxmltree::Document::parse(model_xml).map_err(|e| format!("Invalid model.xml: {}", e))?;

    let mut constraints = Vec::new();
    for element in document
        .descendants()
        .filter(|n| is_ns_element(n, "Element") && n.attribute("Type") == Some(DEFAULT_CONSTRAINT_TYPE))
    {
        let defining_table = referenced_name(&element, "DefiningTable").map(name_parts);
        let for_column = referenced_name(&element, "ForColumn").map(name_parts);

        let (Some([schema, table]), Some(column)) = (
            defining_table.as_deref(),
            for_column.as_ref().and_then(|parts| parts.last()),
        ) else {
            return Err(format!(
                "Default constraint {} has no defining table or column",
                element.attribute("Name").unwrap_or("(unnamed)")
            ));
        };

        let constraint_name = element
            .attribute("Name")
            .and_then(|name| name_parts(name).pop());

        constraints.push(DefaultConstraint {
            schema: schema.clone(),
            table: table.clone(),
            column: column.clone(),
            constraint_name,
        });
    }

    Ok(constraints)
}

fn read_model_xml(path: &Path) -> Result<String, ServiceError> {
    let dacpac_error = |message: String| ServiceError::Dacpac {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| dacpac_error(e.to_string()))?;
    let mut archive = ZipArchive::new(file).map_err(|e| dacpac_error(e.to_string()))?;
    let mut entry = archive
        .by_name(MODEL_ENTRY)
        .map_err(|e| dacpac_error(format!("{}: {}", MODEL_ENTRY, e)))?;

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| dacpac_error(format!("{}: {}", MODEL_ENTRY, e)))?;
    Ok(content)
}

/// [`SchemaModelReader`] over DACPAC files on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct DacpacModelReader;

impl DacpacModelReader {
    fn read(path: &Path) -> Result<Vec<DefaultConstraint>, String> {
        let model_xml = read_model_xml(path).map_err(|e| e.to_string())?;
        parse_default_constraints(&model_xml).map_err(|message| {
            ServiceError::Dacpac {
                path: path.to_path_buf(),
                message,
            }
            .to_string()
        })
    }
}

#[async_trait]
impl SchemaModelReader for DacpacModelReader {
    async fn default_constraints(&self, dacpac_path: &Path) -> Result<Vec<DefaultConstraint>, Vec<String>> {
        let path: PathBuf = dacpac_path.to_path_buf();
        let constraints = tokio::task::spawn_blocking(move || Self::read(&path))
            .await
            .map_err(|e| vec![format!("Reading {} was interrupted: {}", dacpac_path.display(), e)])?
            .map_err(|message| vec![message])?;

        debug!(
            "Read {} default constraints from {}",
            constraints.len(),
            dacpac_path.display()
        );
        Ok(constraints)
    }
}
