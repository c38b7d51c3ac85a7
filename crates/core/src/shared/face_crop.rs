use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Image region handed to the emotion classifier for one tracked face.
#[derive(Clone, Debug)]
pub struct FaceCrop {
    /// Index of the frame the crop was cut from.
    pub frame_index: usize,
    /// The track's box before padding and clamping.
    pub bbox: BoundingBox,
    pub image: Frame,
}

impl FaceCrop {
    /// Cuts `bbox` out of `frame`, padded by `padding_ratio` of the box size on
    /// every side and clamped to the frame bounds.
    ///
    /// Returns `None` when nothing of the box remains inside the frame.
    pub fn extract(frame: &Frame, bbox: &BoundingBox, padding_ratio: f64) -> Option<FaceCrop> {
        let pad_x = (bbox.width as f64 * padding_ratio) as i64;
        let pad_y = (bbox.height as f64 * padding_ratio) as i64;

        let fw = frame.width() as i64;
        let fh = frame.height() as i64;

        let x0 = (bbox.x as i64 - pad_x).max(0);
        let y0 = (bbox.y as i64 - pad_y).max(0);
        let x1 = (bbox.right() + pad_x).min(fw);
        let y1 = (bbox.bottom() + pad_y).min(fh);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(FaceCrop {
            frame_index: frame.index(),
            bbox: *bbox,
            image: frame.sub_frame(x0 as u32, y0 as u32, x1 as u32, y1 as u32),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_is_padded_on_every_side() {
        let frame = Frame::blank(200, 200, 3);
        let bbox = BoundingBox::new(50, 50, 100, 50);

        let crop = FaceCrop::extract(&frame, &bbox, 0.2).unwrap();

        // pad_x = 20, pad_y = 10
        assert_eq!(crop.image.width(), 140);
        assert_eq!(crop.image.height(), 70);
        assert_eq!(crop.frame_index, 3);
        assert_eq!(crop.bbox, bbox);
    }

    #[test]
    fn test_crop_is_clamped_to_frame() {
        let frame = Frame::blank(100, 100, 0);
        let bbox = BoundingBox::new(-10, 80, 50, 50);

        let crop = FaceCrop::extract(&frame, &bbox, 0.2).unwrap();

        // x: max(0, -20)..min(100, 50) ; y: 70..100
        assert_eq!(crop.image.width(), 50);
        assert_eq!(crop.image.height(), 30);
    }

    #[test]
    fn test_zero_padding_keeps_box_size() {
        let frame = Frame::blank(100, 100, 0);
        let crop = FaceCrop::extract(&frame, &BoundingBox::new(10, 20, 30, 40), 0.0).unwrap();
        assert_eq!(crop.image.width(), 30);
        assert_eq!(crop.image.height(), 40);
    }

    #[test]
    fn test_box_outside_frame_yields_none() {
        let frame = Frame::blank(100, 100, 0);
        let bbox = BoundingBox::new(300, 300, 50, 50);
        assert!(FaceCrop::extract(&frame, &bbox, 0.2).is_none());
    }

    #[test]
    fn test_degenerate_box_yields_none() {
        let frame = Frame::blank(100, 100, 0);
        let bbox = BoundingBox::new(10, 10, 0, 0);
        assert!(FaceCrop::extract(&frame, &bbox, 0.2).is_none());
    }

    #[test]
    fn test_extreme_coordinates_yield_none_instead_of_overflowing() {
        let frame = Frame::blank(100, 100, 0);
        let far = BoundingBox::new(i32::MAX - 10, i32::MAX - 10, 100, 100);
        let before = BoundingBox::new(i32::MIN + 5, i32::MIN + 5, 100, 100);
        assert!(FaceCrop::extract(&frame, &far, 0.2).is_none());
        assert!(FaceCrop::extract(&frame, &before, 0.2).is_none());
    }
}
