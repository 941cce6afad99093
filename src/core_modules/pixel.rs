// THEORY:
// The `Pixel` module is the most fundamental unit of the vision system. It is a
// "dumb" data container for a single RGB pixel plus the one heuristic the rest
// of the engine needs from it: perceptual luminance. Anything that needs more
// than one pixel (connectivity, centroids, motion) belongs in higher layers.
//
// Key architectural principles:
// 1.  **Single-pixel scope**: the darkness test reads only this pixel's
//     channels. It never looks at neighbors or history.
// 2.  **Fixed perceptual weighting**: luminance uses the Rec. 601 weights
//     (0.2989 R + 0.587 G + 0.114 B). The classifier is a fixed threshold on
//     the rounded luminance, not an adaptive one; the threshold value itself
//     is carried by the caller's configuration.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Luminance = f64;

    // Rec. 601 luma weights.
    const LUMA_RED: Luminance = 0.2989;
    const LUMA_GREEN: Luminance = 0.587;
    const LUMA_BLUE: Luminance = 0.114;

    /// A single RGB pixel as read out of a decoded frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }

        /// Perceptual luminance of this pixel in [0, 255].
        pub fn luminance(&self) -> Luminance {
            self.red as Luminance * LUMA_RED
                + self.green as Luminance * LUMA_GREEN
                + self.blue as Luminance * LUMA_BLUE
        }

        /// The foreground test: a pixel is "dark enough" to belong to an
        /// object when its luminance, rounded to the nearest integer, does not
        /// exceed the contrast threshold.
        pub fn is_dark(&self, contrast_threshold: Channel) -> bool {
            self.luminance().round() as i64 <= contrast_threshold as i64
        }
    }

    impl From<&[Byte]> for Pixel {
        /// Builds a pixel from the first three bytes of an RGB slice.
        fn from(bytes: &[Byte]) -> Self {
            Self {
                red: bytes[0],
                green: bytes[1],
                blue: bytes[2],
            }
        }
    }
}
