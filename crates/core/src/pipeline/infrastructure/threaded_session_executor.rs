use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::pipeline::frame_orchestrator::{FrameOrchestrator, FrameReport};
use crate::pipeline::session_executor::{SessionConfig, SessionExecutor};
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::report_sink::ReportSink;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Executes the session with dedicated threads for input and output.
///
/// Layout: `reader → main [orchestrator] → sink`
///
/// Frame decoding and report writing overlap with orchestration, while
/// tracker, smoother and controller stay on the calling thread.
pub struct ThreadedSessionExecutor {
    channel_capacity: usize,
}

impl ThreadedSessionExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_capacity(channel_capacity: usize) -> Self {
        Self {
            channel_capacity: channel_capacity.max(1),
        }
    }
}

impl Default for ThreadedSessionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionExecutor for ThreadedSessionExecutor {
    fn execute(
        &self,
        source: Box<dyn FrameSource>,
        sink: Box<dyn ReportSink>,
        orchestrator: &mut FrameOrchestrator,
        config: SessionConfig,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let total = source.total_frames();
        let cap = self.channel_capacity;

        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Result<Frame, SendError>>(cap);
        let (report_tx, report_rx) = crossbeam_channel::bounded::<FrameReport>(cap);

        let reader_handle = spawn_reader(source, frame_tx, config.cancelled.clone());
        let sink_handle = spawn_sink(sink, report_rx);

        let main_result = run_main_loop(frame_rx, &report_tx, orchestrator, &config, total);

        drop(report_tx);

        join_threads(reader_handle, sink_handle, main_result)
    }
}

fn spawn_reader(
    mut source: Box<dyn FrameSource>,
    frame_tx: crossbeam_channel::Sender<Result<Frame, SendError>>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<Box<dyn FrameSource>> {
    std::thread::spawn(move || {
        for frame_result in source.frames() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let mapped = frame_result.map_err(|e| -> SendError { e.to_string().into() });
            if frame_tx.send(mapped).is_err() {
                break;
            }
        }
        source
    })
}

fn spawn_sink(
    mut sink: Box<dyn ReportSink>,
    report_rx: crossbeam_channel::Receiver<FrameReport>,
) -> JoinHandle<Result<Box<dyn ReportSink>, SendError>> {
    std::thread::spawn(move || {
        for report in report_rx {
            sink.write(&report)
                .map_err(|e| -> SendError { e.to_string().into() })?;
        }
        Ok(sink)
    })
}

/// Receives decoded frames, runs the orchestrator and forwards reports.
/// Frames still queued when the stop signal is raised are discarded.
fn run_main_loop(
    frame_rx: crossbeam_channel::Receiver<Result<Frame, SendError>>,
    report_tx: &crossbeam_channel::Sender<FrameReport>,
    orchestrator: &mut FrameOrchestrator,
    config: &SessionConfig,
    total: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut processed = 0;

    for frame_result in frame_rx {
        if config.is_cancelled() {
            break;
        }

        let frame = frame_result.map_err(|e| -> Box<dyn std::error::Error> { e })?;
        let report = orchestrator.process_frame(&frame)?;

        report_tx
            .send(report)
            .map_err(|_| "Report sink closed unexpectedly")?;

        processed += 1;
        config.report_progress(orchestrator, processed, total)?;
    }

    Ok(processed)
}

/// Joins the worker threads and coalesces the first error encountered.
///
/// A sink failure takes precedence over the main loop's error because the
/// main loop only observes it as a closed channel.
fn join_threads(
    reader_handle: JoinHandle<Box<dyn FrameSource>>,
    sink_handle: JoinHandle<Result<Box<dyn ReportSink>, SendError>>,
    main_result: Result<usize, Box<dyn std::error::Error>>,
) -> Result<usize, Box<dyn std::error::Error>> {
    let mut first_error: Option<Box<dyn std::error::Error>> = None;

    fn set_if_none(slot: &mut Option<Box<dyn std::error::Error>>, err: Box<dyn std::error::Error>) {
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    match sink_handle.join() {
        Ok(Ok(mut sink)) => {
            if let Err(e) = sink.close() {
                set_if_none(&mut first_error, e);
            }
        }
        Ok(Err(e)) => set_if_none(&mut first_error, e),
        Err(_) => set_if_none(&mut first_error, "Sink thread panicked".into()),
    }

    let processed = match main_result {
        Ok(n) => n,
        Err(e) => {
            set_if_none(&mut first_error, e);
            0
        }
    };

    match reader_handle.join() {
        Ok(mut source) => source.close(),
        Err(_) => set_if_none(&mut first_error, "Reader thread panicked".into()),
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(processed),
    }
}
