use crate::shared::bounding_box::BoundingBox;

/// A persistent face identity.
///
/// `id` is allocated once and never reused; it is the only identity that is
/// stable across frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: u64,
    pub bbox: BoundingBox,
    /// Consecutive updates without a matching detection.
    pub frames_since_seen: usize,
    /// Whether the most recent update matched or created this track.
    pub seen_this_frame: bool,
}

impl Track {
    pub fn new(id: u64, bbox: BoundingBox) -> Self {
        Self {
            id,
            bbox,
            frames_since_seen: 0,
            seen_this_frame: true,
        }
    }
}
