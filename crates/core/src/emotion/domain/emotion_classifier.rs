use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::emotion::domain::emotion_sample::EmotionSample;
use crate::shared::face_crop::FaceCrop;

/// A successful classification: the top label, its probability and the
/// full per-label distribution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
    #[serde(default)]
    pub distribution: BTreeMap<String, f64>,
}

/// Result of one classifier invocation.
///
/// Everything except `Emotion` is a sentinel: it carries no usable reading
/// and must never reach the smoother.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierOutcome {
    Emotion(Classification),
    NoFace,
    Error,
    Unknown,
}

impl ClassifierOutcome {
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, ClassifierOutcome::Emotion(_))
    }

    pub fn into_sample(self) -> Option<EmotionSample> {
        match self {
            ClassifierOutcome::Emotion(c) => Some(EmotionSample::new(c.label, c.confidence)),
            _ => None,
        }
    }
}

/// Domain interface for the external emotion classifier.
///
/// An `Err` is treated by callers exactly like the `Error` sentinel.
pub trait EmotionClassifier: Send {
    fn classify(&mut self, crop: &FaceCrop) -> Result<ClassifierOutcome, Box<dyn std::error::Error>>;
}
