use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::pipeline::frame_orchestrator::FrameOrchestrator;
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::report_sink::ReportSink;

/// Configuration for one session run.
pub struct SessionConfig {
    /// Called after every frame with (processed, total); returning `false` aborts the run.
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    /// External stop signal, checked once per frame by every stage.
    pub cancelled: Arc<AtomicBool>,
}

impl SessionConfig {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Reports progress to the callback and the orchestrator's logger.
    pub fn report_progress(
        &self,
        orchestrator: &mut FrameOrchestrator,
        processed: usize,
        total: usize,
    ) -> Result<(), Box<dyn std::error::Error>> {
        orchestrator.logger_mut().progress(processed, total);
        if let Some(ref callback) = self.on_progress {
            if !callback(processed, total) {
                return Err("Cancelled".into());
            }
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Abstracts how the read → orchestrate → write loop is executed.
///
/// Every implementation drives all frames through the single orchestrator
/// it is handed, so tracker, smoother and controller state has one owner.
/// Returns the number of frames whose reports reached the sink.
pub trait SessionExecutor: Send {
    fn execute(
        &self,
        source: Box<dyn FrameSource>,
        sink: Box<dyn ReportSink>,
        orchestrator: &mut FrameOrchestrator,
        config: SessionConfig,
    ) -> Result<usize, Box<dyn std::error::Error>>;
}
