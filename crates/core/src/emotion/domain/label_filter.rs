use std::collections::HashSet;

use crate::emotion::domain::emotion_classifier::{Classification, ClassifierOutcome};

/// Content filter that removes excluded labels from classifier output.
///
/// Excluded labels are stripped from the distribution. If the top label was
/// excluded, the most probable remaining label takes its place; if nothing
/// remains the outcome becomes `Unknown`. Sentinels pass through unchanged.
#[derive(Clone, Debug, Default)]
pub struct LabelFilter {
    excluded: HashSet<String>,
}

impl LabelFilter {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_excluded(&self, label: &str) -> bool {
        self.excluded.contains(label)
    }

    pub fn apply(&self, outcome: ClassifierOutcome) -> ClassifierOutcome {
        let ClassifierOutcome::Emotion(mut classification) = outcome else {
            return outcome;
        };
        if self.excluded.is_empty() {
            return ClassifierOutcome::Emotion(classification);
        }

        classification
            .distribution
            .retain(|label, _| !self.excluded.contains(label));

        if !self.is_excluded(&classification.label) {
            return ClassifierOutcome::Emotion(classification);
        }

        match best_remaining(&classification) {
            Some((label, confidence)) => ClassifierOutcome::Emotion(Classification {
                label,
                confidence,
                distribution: classification.distribution,
            }),
            None => ClassifierOutcome::Unknown,
        }
    }
}

/// Highest-probability label left in the distribution. The distribution is a
/// `BTreeMap`, so equal probabilities resolve to the alphabetically first label.
fn best_remaining(classification: &Classification) -> Option<(String, f64)> {
    let mut best: Option<(&String, f64)> = None;
    for (label, &p) in &classification.distribution {
        if best.map_or(true, |(_, bp)| p > bp) {
            best = Some((label, p));
        }
    }
    best.map(|(label, p)| (label.clone(), p))
}
