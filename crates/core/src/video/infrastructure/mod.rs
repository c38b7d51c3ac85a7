pub mod json_lines_sink;
pub mod session_trace;
