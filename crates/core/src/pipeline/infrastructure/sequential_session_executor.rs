use crate::pipeline::frame_orchestrator::FrameOrchestrator;
use crate::pipeline::session_executor::{SessionConfig, SessionExecutor};
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::report_sink::ReportSink;

/// Runs read → orchestrate → write on the calling thread, one frame at a time.
#[derive(Default)]
pub struct SequentialSessionExecutor;

impl SequentialSessionExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl SessionExecutor for SequentialSessionExecutor {
    fn execute(
        &self,
        mut source: Box<dyn FrameSource>,
        mut sink: Box<dyn ReportSink>,
        orchestrator: &mut FrameOrchestrator,
        config: SessionConfig,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let total = source.total_frames();
        let result = run_loop(source.as_mut(), sink.as_mut(), orchestrator, &config, total);
        source.close();

        let close_result = sink.close();
        let processed = result?;
        close_result?;
        Ok(processed)
    }
}

fn run_loop(
    source: &mut dyn FrameSource,
    sink: &mut dyn ReportSink,
    orchestrator: &mut FrameOrchestrator,
    config: &SessionConfig,
    total: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut processed = 0;
    for frame_result in source.frames() {
        if config.is_cancelled() {
            break;
        }
        let frame = frame_result?;
        let report = orchestrator.process_frame(&frame)?;
        sink.write(&report)?;
        processed += 1;
        config.report_progress(orchestrator, processed, total)?;
    }
    Ok(processed)
}
