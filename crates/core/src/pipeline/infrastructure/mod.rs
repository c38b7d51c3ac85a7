pub mod sequential_session_executor;
pub mod threaded_session_executor;
