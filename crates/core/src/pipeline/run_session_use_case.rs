use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::pipeline::frame_orchestrator::FrameOrchestrator;
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::report_sink::ReportSink;

use super::session_executor::{SessionConfig, SessionExecutor};

/// Runs one emotion-recognition session from source to sink.
///
/// Wires the frame source, orchestrator and report sink together and
/// delegates the loop to a `SessionExecutor`. Single use: `execute` consumes
/// the source and sink, so a second call fails.
pub struct RunSessionUseCase {
    source: Option<Box<dyn FrameSource>>,
    sink: Option<Box<dyn ReportSink>>,
    orchestrator: FrameOrchestrator,
    executor: Box<dyn SessionExecutor>,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl RunSessionUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        sink: Box<dyn ReportSink>,
        orchestrator: FrameOrchestrator,
        executor: Box<dyn SessionExecutor>,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source: Some(source),
            sink: Some(sink),
            orchestrator,
            executor,
            on_progress,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    /// Returns the number of frames reported.
    pub fn execute(&mut self) -> Result<usize, Box<dyn std::error::Error>> {
        let source = self.source.take().ok_or("Session already executed")?;
        let sink = self.sink.take().ok_or("Session already executed")?;
        let config = SessionConfig {
            on_progress: self.on_progress.take(),
            cancelled: self.cancelled.clone(),
        };

        let processed = self
            .executor
            .execute(source, sink, &mut self.orchestrator, config)?;

        self.orchestrator.logger().summary();
        Ok(processed)
    }

    pub fn orchestrator(&self) -> &FrameOrchestrator {
        &self.orchestrator
    }
}
