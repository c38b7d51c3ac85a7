pub mod detection;
pub mod emotion;
pub mod performance;
pub mod pipeline;
pub mod shared;
pub mod tracking;
pub mod video;
