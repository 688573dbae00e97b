use std::io;
use std::sync::mpsc;

use jobscout_core::{ProgressSnapshot, StopSignal};
use pipeline_logging::pipeline_debug;

use super::WorkerContext;

/// Draws progress snapshots somewhere an operator can see them.
///
/// Errors are logged and otherwise ignored; they never reach the workers.
pub trait StatusRenderer: Send {
    fn render(&mut self, snapshot: &ProgressSnapshot) -> io::Result<()>;

    /// Called once after the final render.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Renders on every tick until `until` is raised, then renders once more so the
/// final worker states are shown, and signals `done`.
pub(super) fn run_reporter(
    ctx: &WorkerContext,
    mut renderer: Box<dyn StatusRenderer>,
    until: &StopSignal,
    done: mpsc::Sender<()>,
) {
    loop {
        render_tick(ctx, renderer.as_mut());
        if until.sleep(ctx.settings.refresh_interval) {
            break;
        }
    }
    render_tick(ctx, renderer.as_mut());
    if let Err(err) = renderer.finish() {
        pipeline_debug!("Renderer finish failed: {err}");
    }
    let _ = done.send(());
}

fn render_tick(ctx: &WorkerContext, renderer: &mut dyn StatusRenderer) {
    ctx.report_levels();
    let snapshot = ctx.store.snapshot();
    if let Err(err) = renderer.render(&snapshot) {
        pipeline_debug!("Status render failed: {err}");
    }
}
