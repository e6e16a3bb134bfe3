//! Configured header and footer text

use super::ScriptModifier;
use crate::error::ScriptError;
use crate::script::model::ScriptModificationModel;
use async_trait::async_trait;
use tracing::debug;

/// Prepends `custom_header`, with version placeholders substituted
pub struct AddCustomHeaderModifier;

#[async_trait]
impl ScriptModifier for AddCustomHeaderModifier {
    async fn modify(&self, model: &mut ScriptModificationModel<'_>) -> Result<(), ScriptError> {
        let Some(header) = model.configuration.header() else {
            debug!("No custom header configured");
            return Ok(());
        };

        let header = model.substitute_versions(header)?;
        let script = format!("{}\r\n{}", header, model.current_script());
        model.set_current_script(script);
        Ok(())
    }
}

/// Appends `custom_footer`, with version placeholders substituted
pub struct AddCustomFooterModifier;

#[async_trait]
impl ScriptModifier for AddCustomFooterModifier {
    async fn modify(&self, model: &mut ScriptModificationModel<'_>) -> Result<(), ScriptError> {
        let Some(footer) = model.configuration.footer() else {
            debug!("No custom footer configured");
            return Ok(());
        };

        let footer = model.substitute_versions(footer)?;
        let script = format!("{}\r\n{}", model.current_script(), footer);
        model.set_current_script(script);
        Ok(())
    }
}
