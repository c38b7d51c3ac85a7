pub mod emotion_classifier;
pub mod emotion_sample;
pub mod emotion_smoother;
pub mod label_filter;
