pub mod frame_clock;
pub mod frame_orchestrator;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod run_session_use_case;
pub mod session_executor;
