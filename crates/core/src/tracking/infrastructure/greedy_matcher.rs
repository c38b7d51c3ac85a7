use crate::shared::bounding_box::{overlap, BoundingBox};
use crate::tracking::domain::track_matcher::TrackMatcher;

/// Order-dependent greedy association.
///
/// Detections are visited in input order; each takes the not-yet-claimed
/// track with the strictly greatest overlap above the threshold. Earlier
/// tracks win ties. Not globally optimal: an early detection can claim a
/// track that a later one needed more.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyMatcher;

impl TrackMatcher for GreedyMatcher {
    fn assign(
        &self,
        tracks: &[BoundingBox],
        detections: &[BoundingBox],
        threshold: f64,
    ) -> Vec<Option<usize>> {
        let mut claimed = vec![false; tracks.len()];

        detections
            .iter()
            .map(|det| {
                let mut best: Option<usize> = None;
                let mut best_iou = 0.0;
                for (ti, track_box) in tracks.iter().enumerate() {
                    if claimed[ti] {
                        continue;
                    }
                    let iou = overlap(det, track_box);
                    if iou > best_iou && iou > threshold {
                        best_iou = iou;
                        best = Some(ti);
                    }
                }
                if let Some(ti) = best {
                    claimed[ti] = true;
                }
                best
            })
            .collect()
    }
}
