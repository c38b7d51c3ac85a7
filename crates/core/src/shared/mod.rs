pub mod bounding_box;
pub mod config;
pub mod constants;
pub mod face_crop;
pub mod frame;
