//! Pipeline executor - drives a state model through a work unit table

use crate::core::{CancellationFlag, ProgressCallback, StateModel};
use crate::execution::factory::WorkUnitFactory;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

/// Fires the "finished" progress notification when dropped
struct FinishNotification(ProgressCallback);

impl Drop for FinishNotification {
    fn drop(&mut self) {
        let callback = &self.0;
        // a failing observer must not replace the outcome of the run
        if panic::catch_unwind(AssertUnwindSafe(|| callback(false))).is_err() {
            debug!("Progress callback panicked while reporting the end of a run");
        }
    }
}

/// Runs work units until none remains, one fails, or the run is cancelled
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineExecutor;

impl PipelineExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Drive `model` to completion
    ///
    /// On return `model.result` is `Some(true)` when the table ran out of
    /// units, `Some(false)` when a unit reported a failure, and `None` when
    /// the run was cancelled or a unit crashed; `model.cancelled` tells the
    /// two apart. The progress callback sees
    /// `true` before the first unit and `false` after the last, whatever the
    /// outcome.
    pub async fn run(&self, factory: &dyn WorkUnitFactory, model: &mut StateModel, cancel: &CancellationFlag) {
        let progress = model.progress_callback();
        progress(true);
        let _finished = FinishNotification(progress);

        info!(
            "Starting {} of {} ({})",
            model.flavor.name(),
            model.project.name,
            model.run_id
        );

        loop {
            if cancel.is_cancelled() {
                warn!("{} of {} was cancelled", model.flavor.name(), model.project.name);
                model.cancelled = true;
                break;
            }

            if model.has_failed() {
                error!(
                    "{} of {} failed in state {:?}",
                    model.flavor.name(),
                    model.project.name,
                    model.current_state
                );
                break;
            }

            let Some(unit) = factory.next_unit(model) else {
                model.result = Some(true);
                info!("{} of {} completed", model.flavor.name(), model.project.name);
                break;
            };

            let state = model.current_state;
            debug!("Running {} from state {:?}", unit.name(), state);

            if let Err(e) = unit.work(model, cancel).await {
                error!("{} crashed in state {:?}: {:#}", unit.name(), state, e);
                break;
            }

            assert!(
                model.current_state != state,
                "{} did not advance the run from {:?}",
                unit.name(),
                state
            );
        }
    }
}
