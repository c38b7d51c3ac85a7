use crate::pipeline::frame_orchestrator::FrameReport;

/// Consumes per-frame reports (renderer, transport, file).
pub trait ReportSink: Send {
    fn write(&mut self, report: &FrameReport) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes buffered output.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
