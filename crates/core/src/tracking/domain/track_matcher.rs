use crate::shared::bounding_box::BoundingBox;

/// Detection-to-track association policy.
///
/// Given the boxes of the tracks eligible for matching and this frame's
/// detections, returns one entry per detection: the position in `tracks` it
/// is assigned to, or `None` if it should start a new track. A track
/// position appears at most once, and only pairs whose overlap strictly
/// exceeds `threshold` may be assigned.
pub trait TrackMatcher: Send {
    fn assign(
        &self,
        tracks: &[BoundingBox],
        detections: &[BoundingBox],
        threshold: f64,
    ) -> Vec<Option<usize>>;
}
