use std::collections::{BTreeMap, BTreeSet};

use crate::shared::bounding_box::BoundingBox;
use crate::tracking::domain::track::Track;
use crate::tracking::domain::track_matcher::TrackMatcher;
use crate::tracking::infrastructure::greedy_matcher::GreedyMatcher;

/// Multi-face tracker assigning stable ids across frames.
///
/// Each update ages every track, associates detections through the
/// configured [`TrackMatcher`], starts a track for every unmatched detection
/// and drops tracks missed for more than `max_missing_frames` updates in a
/// row. Tracks are kept in an id-ordered arena so iteration order is
/// deterministic.
pub struct FaceTracker {
    tracks: BTreeMap<u64, Track>,
    next_id: u64,
    iou_threshold: f64,
    max_missing_frames: usize,
    matcher: Box<dyn TrackMatcher>,
}

impl FaceTracker {
    pub fn new(iou_threshold: f64, max_missing_frames: usize) -> Self {
        Self::with_matcher(iou_threshold, max_missing_frames, Box::new(GreedyMatcher))
    }

    pub fn with_matcher(
        iou_threshold: f64,
        max_missing_frames: usize,
        matcher: Box<dyn TrackMatcher>,
    ) -> Self {
        Self {
            tracks: BTreeMap::new(),
            next_id: 0,
            iou_threshold,
            max_missing_frames,
            matcher,
        }
    }

    /// Advances the tracker by one frame and returns every live track's box.
    pub fn update(&mut self, detections: &[BoundingBox]) -> BTreeMap<u64, BoundingBox> {
        self.age_tracks();

        let (candidate_ids, candidate_boxes) = self.match_candidates();
        let assignments = self
            .matcher
            .assign(&candidate_boxes, detections, self.iou_threshold);

        for (det, assigned) in detections.iter().zip(assignments) {
            match assigned {
                Some(pos) => self.apply_match(candidate_ids[pos], det),
                None => self.create_track(det),
            }
        }

        self.remove_stale_tracks();
        self.live_boxes()
    }

    pub fn live_ids(&self) -> BTreeSet<u64> {
        self.tracks.keys().copied().collect()
    }

    pub fn live_boxes(&self) -> BTreeMap<u64, BoundingBox> {
        self.tracks.iter().map(|(id, t)| (*id, t.bbox)).collect()
    }

    pub fn get(&self, id: u64) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn age_tracks(&mut self) {
        for track in self.tracks.values_mut() {
            track.seen_this_frame = false;
            track.frames_since_seen += 1;
        }
    }

    /// Tracks still within the missing-frame budget after this frame's aging.
    fn match_candidates(&self) -> (Vec<u64>, Vec<BoundingBox>) {
        self.tracks
            .values()
            .filter(|t| t.frames_since_seen <= self.max_missing_frames)
            .map(|t| (t.id, t.bbox))
            .unzip()
    }

    fn apply_match(&mut self, id: u64, bbox: &BoundingBox) {
        if let Some(track) = self.tracks.get_mut(&id) {
            track.bbox = *bbox;
            track.frames_since_seen = 0;
            track.seen_this_frame = true;
        }
    }

    fn create_track(&mut self, bbox: &BoundingBox) {
        let id = self.next_id;
        self.next_id += 1;
        self.tracks.insert(id, Track::new(id, *bbox));
    }

    fn remove_stale_tracks(&mut self) {
        let max_missing = self.max_missing_frames;
        self.tracks.retain(|id, t| {
            let keep = t.frames_since_seen <= max_missing;
            if !keep {
                log::debug!("Track {id} expired after {} missed frames", t.frames_since_seen);
            }
            keep
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::infrastructure::hungarian_matcher::HungarianMatcher;

    fn bbox(x: i32, y: i32, w: i32, h: i32) -> BoundingBox {
        BoundingBox::new(x, y, w, h)
    }

    fn tracker() -> FaceTracker {
        FaceTracker::new(0.3, 10)
    }

    #[test]
    fn test_new_detections_get_sequential_ids() {
        let mut tracker = tracker();
        let live = tracker.update(&[bbox(0, 0, 50, 50), bbox(100, 100, 50, 50)]);
        assert_eq!(live.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_consistent_id_across_frames() {
        let mut tracker = tracker();
        tracker.update(&[bbox(0, 0, 100, 100)]);

        let live = tracker.update(&[bbox(5, 5, 100, 100)]);

        assert_eq!(live.len(), 1);
        assert_eq!(live[&0], bbox(5, 5, 100, 100));
        assert_eq!(tracker.get(0).unwrap().frames_since_seen, 0);
    }

    #[test]
    fn test_track_deleted_exactly_after_max_missing_frames() {
        let mut tracker = tracker();
        tracker.update(&[bbox(0, 0, 100, 100)]);

        for missed in 1..=10 {
            let live = tracker.update(&[]);
            assert!(live.contains_key(&0), "deleted early after {missed} misses");
            assert_eq!(tracker.get(0).unwrap().frames_since_seen, missed);
        }

        assert!(tracker.update(&[]).is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_unmatched_live_track_is_reported_with_last_box() {
        let mut tracker = tracker();
        tracker.update(&[bbox(0, 0, 100, 100)]);

        let live = tracker.update(&[bbox(400, 400, 60, 60)]);

        assert_eq!(live.len(), 2);
        assert_eq!(live[&0], bbox(0, 0, 100, 100));
        assert!(!tracker.get(0).unwrap().seen_this_frame);
        assert!(tracker.get(1).unwrap().seen_this_frame);
    }

    #[test]
    fn test_rematch_within_budget_resets_counter() {
        let mut tracker = tracker();
        tracker.update(&[bbox(10, 10, 50, 50)]);
        for _ in 0..9 {
            tracker.update(&[]);
        }

        // Tenth consecutive frame: the track is still a candidate.
        let live = tracker.update(&[bbox(12, 12, 50, 50)]);

        assert_eq!(live.keys().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(tracker.get(0).unwrap().frames_since_seen, 0);
    }

    #[test]
    fn test_track_past_budget_is_not_rematched() {
        let mut tracker = tracker();
        tracker.update(&[bbox(10, 10, 50, 50)]);
        for _ in 0..10 {
            tracker.update(&[]);
        }

        let live = tracker.update(&[bbox(10, 10, 50, 50)]);

        assert_eq!(live.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_empty_frame_on_empty_tracker() {
        let mut tracker = tracker();
        assert!(tracker.update(&[]).is_empty());
    }

    #[test]
    fn test_track_matched_by_at_most_one_detection() {
        let mut tracker = tracker();
        tracker.update(&[bbox(0, 0, 100, 100)]);

        let live = tracker.update(&[bbox(2, 2, 100, 100), bbox(4, 4, 100, 100)]);

        assert_eq!(live.len(), 2);
        assert_eq!(live[&0], bbox(2, 2, 100, 100));
        assert_eq!(live[&1], bbox(4, 4, 100, 100));
    }

    #[test]
    fn test_overlapping_new_detections_start_separate_tracks() {
        let mut tracker = tracker();
        let live = tracker.update(&[bbox(0, 0, 100, 100), bbox(10, 10, 100, 100)]);
        assert_eq!(live.len(), 2);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut tracker = FaceTracker::new(0.3, 0);
        tracker.update(&[bbox(0, 0, 50, 50)]);
        assert!(tracker.update(&[]).is_empty());

        let live = tracker.update(&[bbox(0, 0, 50, 50)]);

        assert_eq!(live.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_multiple_tracks_independent() {
        let mut tracker = tracker();
        tracker.update(&[bbox(0, 0, 50, 50), bbox(200, 200, 50, 50)]);

        let live = tracker.update(&[bbox(202, 202, 50, 50), bbox(2, 2, 50, 50)]);

        assert_eq!(live[&0], bbox(2, 2, 50, 50));
        assert_eq!(live[&1], bbox(202, 202, 50, 50));
    }

    #[test]
    fn test_live_ids_match_update_result() {
        let mut tracker = tracker();
        let live = tracker.update(&[bbox(0, 0, 50, 50), bbox(300, 0, 50, 50)]);
        assert_eq!(
            tracker.live_ids(),
            live.keys().copied().collect::<BTreeSet<_>>()
        );
        assert_eq!(tracker.tracks().count(), 2);
    }

    #[test]
    fn test_greedy_matcher_is_order_dependent() {
        let mut tracker = tracker();
        tracker.update(&[bbox(0, 0, 100, 100), bbox(50, 0, 100, 100)]);

        let live = tracker.update(&[bbox(25, 0, 100, 100), bbox(-10, 0, 100, 100)]);

        // First detection ties and takes track 0; the second starts track 2.
        assert_eq!(live.len(), 3);
        assert_eq!(live[&0], bbox(25, 0, 100, 100));
        assert_eq!(live[&2], bbox(-10, 0, 100, 100));
    }

    #[test]
    fn test_hungarian_matcher_substitutes_without_lifecycle_change() {
        let mut tracker = FaceTracker::with_matcher(0.3, 10, Box::new(HungarianMatcher));
        tracker.update(&[bbox(0, 0, 100, 100), bbox(50, 0, 100, 100)]);

        let live = tracker.update(&[bbox(25, 0, 100, 100), bbox(-10, 0, 100, 100)]);

        assert_eq!(live.len(), 2);
        assert_eq!(live[&0], bbox(-10, 0, 100, 100));
        assert_eq!(live[&1], bbox(25, 0, 100, 100));
    }
}
