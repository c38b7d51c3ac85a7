use crate::shared::frame::Frame;

/// Supplies frames to a session in presentation order.
///
/// Implementations hide where frames come from (camera, decoder, recorded
/// trace) so the pipeline only sees `Frame`.
pub trait FrameSource: Send {
    /// Number of frames the source will yield, or 0 if unknown (live input).
    fn total_frames(&self) -> usize;

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
