pub mod frame_source;
pub mod report_sink;
