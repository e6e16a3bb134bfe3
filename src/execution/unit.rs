//! The work unit seam

use crate::core::{CancellationFlag, StateModel};
use async_trait::async_trait;

/// One step of a pipeline
///
/// A unit reads and writes only the model fields it documents and always
/// moves `current_state` forward to its landing state. A user-facing problem
/// is reported through [`StateModel::fail`]; an `Err` is a crash and leaves
/// the result unset.
#[async_trait]
pub trait WorkUnit: Send + Sync {
    /// Name used in log output
    fn name(&self) -> &'static str;

    async fn work(&self, model: &mut StateModel, cancel: &CancellationFlag) -> anyhow::Result<()>;
}
