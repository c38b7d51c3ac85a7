use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::emotion::domain::emotion_sample::{EmotionSample, SmoothedEmotion};
use crate::shared::constants::DEFAULT_SMOOTHING_WINDOW;

const OLDEST_WEIGHT: f64 = 0.5;
const NEWEST_WEIGHT: f64 = 1.0;

/// Per-track sliding-window vote over recent classifier readings.
///
/// Each sample's vote is its confidence times a recency weight ramping
/// linearly from 0.5 (oldest) to 1.0 (newest). Votes are summed per label
/// and normalized; the label with the largest share wins, ties going to the
/// label that appears first in the window.
pub struct EmotionSmoother {
    window_size: usize,
    histories: HashMap<u64, VecDeque<EmotionSample>>,
}

impl EmotionSmoother {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            histories: HashMap::new(),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn add_sample(&mut self, track_id: u64, label: impl Into<String>, confidence: f64) {
        let window = self.window_size;
        let history = self
            .histories
            .entry(track_id)
            .or_insert_with(|| VecDeque::with_capacity(window));
        if history.len() == window {
            history.pop_front();
        }
        history.push_back(EmotionSample::new(label, confidence));
    }

    pub fn query(&self, track_id: u64) -> SmoothedEmotion {
        let Some(history) = self.histories.get(&track_id) else {
            return SmoothedEmotion::unknown();
        };
        if history.is_empty() {
            return SmoothedEmotion::unknown();
        }

        // (label, summed vote) in first-occurrence order.
        let mut votes: Vec<(&str, f64)> = Vec::new();
        let mut total = 0.0;
        for (i, sample) in history.iter().enumerate() {
            let vote = recency_weight(i, history.len()) * sample.confidence;
            total += vote;
            match votes.iter_mut().find(|(label, _)| *label == sample.label) {
                Some((_, sum)) => *sum += vote,
                None => votes.push((sample.label.as_str(), vote)),
            }
        }

        if total <= 0.0 {
            return SmoothedEmotion::unknown();
        }

        let mut best = votes[0];
        for &(label, vote) in &votes[1..] {
            if vote > best.1 {
                best = (label, vote);
            }
        }

        SmoothedEmotion {
            label: best.0.to_string(),
            confidence: best.1 / total,
        }
    }

    /// Drops the history of every track not in `active_ids`.
    pub fn cleanup(&mut self, active_ids: &BTreeSet<u64>) {
        self.histories.retain(|id, _| active_ids.contains(id));
    }

    pub fn history_len(&self, track_id: u64) -> usize {
        self.histories.get(&track_id).map_or(0, |h| h.len())
    }

    pub fn has_history(&self, track_id: u64) -> bool {
        self.histories.contains_key(&track_id)
    }

    /// Number of tracks with stored history.
    pub fn tracked_count(&self) -> usize {
        self.histories.len()
    }
}

impl Default for EmotionSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}

fn recency_weight(position: usize, len: usize) -> f64 {
    if len <= 1 {
        return NEWEST_WEIGHT;
    }
    OLDEST_WEIGHT + (NEWEST_WEIGHT - OLDEST_WEIGHT) * position as f64 / (len - 1) as f64
}
