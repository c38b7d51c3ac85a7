pub mod face_tracker;
pub mod track;
pub mod track_matcher;
