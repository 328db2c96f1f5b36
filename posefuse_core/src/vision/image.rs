// posefuse_core/src/vision/image.rs

use crate::error::FrameError;

/// Value returned for reads outside the frame.
pub const OUT_OF_BOUNDS_LUMA: u8 = 128;

/// A borrowed, row-major, single-channel 8-bit image.
///
/// Construction checks the buffer against the claimed dimensions, so the
/// accessors never index past the end of `data`. Trailing bytes beyond
/// `width * height` (row padding from a camera plane) are ignored.
#[derive(Debug, Clone, Copy)]
pub struct LumaFrame<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> LumaFrame<'a> {
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyFrame { width, height });
        }
        let expected = width
            .checked_mul(height)
            .ok_or(FrameError::BufferTooShort {
                width,
                height,
                expected: usize::MAX,
                actual: data.len(),
            })?;
        if data.len() < expected {
            return Err(FrameError::BufferTooShort {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.width / 2) as f32, (self.height / 2) as f32)
    }

    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn get(&self, x: i64, y: i64) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        self.data.get(y as usize * self.width + x as usize).copied()
    }

    /// Pixel at `(x, y)` as an integer, mid-grey outside the frame.
    pub fn luminance(&self, x: i64, y: i64) -> i32 {
        self.get(x, y).unwrap_or(OUT_OF_BOUNDS_LUMA) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_short_buffers() {
        let buf = [0u8; 10];
        assert_eq!(
            LumaFrame::new(&buf, 0, 5).unwrap_err(),
            FrameError::EmptyFrame { width: 0, height: 5 }
        );
        assert_eq!(
            LumaFrame::new(&buf, 4, 4).unwrap_err(),
            FrameError::BufferTooShort {
                width: 4,
                height: 4,
                expected: 16,
                actual: 10
            }
        );
    }

    #[test]
    fn test_out_of_bounds_reads_are_mid_grey() {
        let buf: Vec<u8> = (0..12).collect();
        let frame = LumaFrame::new(&buf, 4, 3).unwrap();
        assert_eq!(frame.luminance(1, 2), 9);
        assert_eq!(frame.luminance(-1, 0), 128);
        assert_eq!(frame.luminance(4, 0), 128);
        assert_eq!(frame.luminance(0, 3), 128);
    }

    #[test]
    fn test_padding_is_ignored() {
        let buf = [7u8; 20];
        let frame = LumaFrame::new(&buf, 4, 4).unwrap();
        assert_eq!(frame.get(3, 3), Some(7));
        assert_eq!(frame.get(0, 4), None);
    }
}
