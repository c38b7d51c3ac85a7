use std::collections::HashMap;
use std::sync::Arc;

use crate::emotion::domain::emotion_classifier::{ClassifierOutcome, EmotionClassifier};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::face_crop::FaceCrop;

/// Recorded outcomes keyed by frame index and the face box they were
/// produced for.
pub type OutcomeCache = HashMap<(usize, BoundingBox), ClassifierOutcome>;

/// Replays recorded classifier outcomes.
///
/// A crop is looked up by its source frame index and unpadded box. Tracks
/// that were not detected in that frame (and so were never recorded) get
/// the `Unknown` sentinel.
pub struct ReplayEmotionClassifier {
    outcomes: Arc<OutcomeCache>,
}

impl ReplayEmotionClassifier {
    pub fn new(outcomes: Arc<OutcomeCache>) -> Self {
        Self { outcomes }
    }
}

impl EmotionClassifier for ReplayEmotionClassifier {
    fn classify(
        &mut self,
        crop: &FaceCrop,
    ) -> Result<ClassifierOutcome, Box<dyn std::error::Error>> {
        Ok(self
            .outcomes
            .get(&(crop.frame_index, crop.bbox))
            .cloned()
            .unwrap_or(ClassifierOutcome::Unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::domain::emotion_classifier::Classification;
    use crate::shared::frame::Frame;
    use std::collections::BTreeMap;

    fn crop(frame_index: usize, bbox: BoundingBox) -> FaceCrop {
        FaceCrop::extract(&Frame::blank(200, 200, frame_index), &bbox, 0.2).unwrap()
    }

    fn happy() -> ClassifierOutcome {
        ClassifierOutcome::Emotion(Classification {
            label: "Happy".to_string(),
            confidence: 0.8,
            distribution: BTreeMap::new(),
        })
    }

    #[test]
    fn test_returns_recorded_outcome() {
        let bbox = BoundingBox::new(10, 10, 60, 60);
        let cache = Arc::new(HashMap::from([((3, bbox), happy())]));
        let mut classifier = ReplayEmotionClassifier::new(cache);

        assert_eq!(classifier.classify(&crop(3, bbox)).unwrap(), happy());
    }

    #[test]
    fn test_same_box_in_other_frame_is_unknown() {
        let bbox = BoundingBox::new(10, 10, 60, 60);
        let cache = Arc::new(HashMap::from([((3, bbox), happy())]));
        let mut classifier = ReplayEmotionClassifier::new(cache);

        assert_eq!(
            classifier.classify(&crop(4, bbox)).unwrap(),
            ClassifierOutcome::Unknown
        );
    }

    #[test]
    fn test_recorded_sentinels_are_replayed() {
        let bbox = BoundingBox::new(0, 0, 60, 60);
        let cache = Arc::new(HashMap::from([((0, bbox), ClassifierOutcome::Error)]));
        let mut classifier = ReplayEmotionClassifier::new(cache);

        assert_eq!(
            classifier.classify(&crop(0, bbox)).unwrap(),
            ClassifierOutcome::Error
        );
    }
}
