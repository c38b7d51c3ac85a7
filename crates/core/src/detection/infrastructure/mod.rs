pub mod cached_face_detector;
pub mod min_size_detector;
