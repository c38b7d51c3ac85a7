use ndarray::{s, ArrayView3};

/// A single captured frame: contiguous RGB bytes in row-major order.
///
/// The pipeline never inspects pixels itself; they are only sliced into
/// face crops that are handed to the classifier.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

pub const RGB_CHANNELS: u8 = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Black RGB frame, used when replaying recorded sessions without pixels.
    pub fn blank(width: u32, height: u32, index: usize) -> Self {
        let len = (width as usize) * (height as usize) * RGB_CHANNELS as usize;
        Self::new(vec![0u8; len], width, height, RGB_CHANNELS, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the pixel rectangle `[x0, x1) x [y0, y1)` into a new frame that
    /// keeps this frame's index. Bounds must already lie inside the frame.
    pub fn sub_frame(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> Frame {
        let view = self.as_ndarray();
        let region = view.slice(s![y0 as usize..y1 as usize, x0 as usize..x1 as usize, ..]);
        let data: Vec<u8> = region.iter().copied().collect();
        Frame::new(data, x1 - x0, y1 - y0, self.channels, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_blank_frame_is_black_rgb() {
        let frame = Frame::blank(4, 3, 7);
        assert_eq!(frame.data().len(), 4 * 3 * 3);
        assert!(frame.data().iter().all(|&b| b == 0));
        assert_eq!(frame.channels(), RGB_CHANNELS);
        assert_eq!(frame.index(), 7);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10];
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let frame = Frame::new(vec![0u8; 24], 4, 2, 3, 0);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]);
    }

    #[test]
    fn test_sub_frame_copies_pixels_in_row_major_order() {
        // 3x2 frame, each pixel's R channel holds its linear position.
        let mut data = vec![0u8; 3 * 2 * 3];
        for p in 0..6 {
            data[p * 3] = p as u8;
        }
        let frame = Frame::new(data, 3, 2, 3, 9);

        let sub = frame.sub_frame(1, 0, 3, 2);

        assert_eq!(sub.width(), 2);
        assert_eq!(sub.height(), 2);
        assert_eq!(sub.index(), 9);
        let reds: Vec<u8> = sub.data().chunks(3).map(|px| px[0]).collect();
        assert_eq!(reds, vec![1, 2, 4, 5]);
    }
}
