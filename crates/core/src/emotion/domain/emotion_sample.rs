use serde::{Deserialize, Serialize};

use crate::shared::constants::UNKNOWN_LABEL;

/// One classifier reading for a tracked face.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmotionSample {
    pub label: String,
    pub confidence: f64,
}

impl EmotionSample {
    /// Confidence is clamped to `[0, 1]`; non-finite values count as 0.
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Stabilized emotion estimate for one track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothedEmotion {
    pub label: String,
    pub confidence: f64,
}

impl SmoothedEmotion {
    pub fn unknown() -> Self {
        Self {
            label: UNKNOWN_LABEL.to_string(),
            confidence: 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.label == UNKNOWN_LABEL && self.confidence == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.7, 0.7)]
    #[case(1.5, 1.0)]
    #[case(-0.2, 0.0)]
    #[case(f64::NAN, 0.0)]
    #[case(f64::INFINITY, 0.0)]
    fn test_confidence_is_sanitized(#[case] input: f64, #[case] expected: f64) {
        assert_relative_eq!(EmotionSample::new("Happy", input).confidence, expected);
    }

    #[test]
    fn test_unknown() {
        let unknown = SmoothedEmotion::unknown();
        assert_eq!(unknown.label, "Unknown");
        assert_relative_eq!(unknown.confidence, 0.0);
        assert!(unknown.is_unknown());
    }
}
