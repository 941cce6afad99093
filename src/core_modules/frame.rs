// THEORY:
// A `FrameBuffer` is one decoded frame: a rectangular RGB pixel grid with
// width, height and a packed byte buffer. Decoding (file formats, movie
// demuxing) happens outside the core; by the time a frame reaches the
// detector it is already a plain grid of bytes. The buffer is immutable for
// the lifetime of the analysis session so a reanalysis pass can replay it.

use crate::core_modules::pixel::pixel::Pixel;
use crate::error::AnalysisError;

const CHANNELS: usize = 3;

/// One decoded RGB frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    /// Packed row-major RGB bytes, `width * height * 3` of them.
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Wraps a raw row-major RGB buffer, validating its geometry.
    pub fn from_raw_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, AnalysisError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(AnalysisError::FrameGeometry {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reads the pixel at `(x, y)`. Callers stay within bounds; the detector
    /// only ever asks for coordinates produced by its own scan.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        debug_assert!(x < self.width && y < self.height);
        let index = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Pixel::from(&self.data[index..index + CHANNELS])
    }
}

impl From<image::RgbImage> for FrameBuffer {
    fn from(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}
