use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::pipeline::frame_orchestrator::FrameReport;
use crate::video::domain::report_sink::ReportSink;

/// Writes one JSON-encoded `FrameReport` per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
    written: usize,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl JsonLinesSink<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::create(path)
            .map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> ReportSink for JsonLinesSink<W> {
    fn write(&mut self, report: &FrameReport) -> Result<(), Box<dyn std::error::Error>> {
        serde_json::to_writer(&mut self.writer, report)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.writer.flush()?;
        log::debug!("Wrote {} frame reports", self.written);
        Ok(())
    }
}
