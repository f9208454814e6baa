//! Color treatments for the map panel.

use std::fmt;
use std::str::FromStr;

use image::{imageops, Rgba, RgbaImage};

/// Dark end of the night-vision ramp.
pub const NIGHT_VISION_DARK: [u8; 3] = [0x00, 0x05, 0x00];

/// Bright end of the night-vision ramp.
pub const NIGHT_VISION_BRIGHT: [u8; 3] = [0x00, 0xFF, 0x66];

/// How tile colors are transformed before display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorRemap {
    /// Original colors.
    #[default]
    None,
    /// Grayscale, then mapped onto a dark-to-green ramp.
    NightVision,
}

impl ColorRemap {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorRemap::None => "none",
            ColorRemap::NightVision => "night-vision",
        }
    }

    pub fn apply(&self, image: RgbaImage) -> RgbaImage {
        match self {
            ColorRemap::None => image,
            ColorRemap::NightVision => colorize(&image, NIGHT_VISION_DARK, NIGHT_VISION_BRIGHT),
        }
    }
}

impl fmt::Display for ColorRemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorRemap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" | "off" | "" => Ok(ColorRemap::None),
            "night-vision" | "nightvision" | "nv" => Ok(ColorRemap::NightVision),
            other => Err(format!("unknown color remap '{}'", other)),
        }
    }
}

/// Map luminance linearly from `dark` (black) to `bright` (white). Alpha is
/// kept.
pub fn colorize(image: &RgbaImage, dark: [u8; 3], bright: [u8; 3]) -> RgbaImage {
    let gray = imageops::grayscale(image);
    let mut out = RgbaImage::new(image.width(), image.height());

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let luma = gray.get_pixel(x, y)[0] as u32;
        let channel = |i: usize| {
            let (lo, hi) = (dark[i] as u32, bright[i] as u32);
            ((lo * (255 - luma) + hi * luma + 127) / 255) as u8
        };
        let alpha = image.get_pixel(x, y)[3];
        *pixel = Rgba([channel(0), channel(1), channel(2), alpha]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_night_vision_endpoints() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([255, 255, 255, 128]));

        let out = ColorRemap::NightVision.apply(image);
        assert_eq!(out.get_pixel(0, 0), &Rgba([0x00, 0x05, 0x00, 255]));
        assert_eq!(out.get_pixel(1, 0), &Rgba([0x00, 0xFF, 0x66, 128]));
    }

    #[test]
    fn test_night_vision_is_monotonic_in_brightness() {
        let mut image = RgbaImage::new(3, 1);
        for (x, v) in [40u8, 120, 200].into_iter().enumerate() {
            image.put_pixel(x as u32, 0, Rgba([v, v, v, 255]));
        }
        let out = ColorRemap::NightVision.apply(image);
        let greens: Vec<u8> = (0..3).map(|x| out.get_pixel(x, 0)[1]).collect();
        assert!(greens[0] < greens[1] && greens[1] < greens[2]);
        assert!(out.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_none_is_identity() {
        let mut image = RgbaImage::new(1, 1);
        image.put_pixel(0, 0, Rgba([10, 20, 30, 40]));
        assert_eq!(ColorRemap::None.apply(image.clone()), image);
    }

    #[test]
    fn test_parse() {
        assert_eq!("night_vision".parse::<ColorRemap>(), Ok(ColorRemap::NightVision));
        assert_eq!("None".parse::<ColorRemap>(), Ok(ColorRemap::None));
        assert!("sepia".parse::<ColorRemap>().is_err());
        assert_eq!(ColorRemap::NightVision.to_string(), "night-vision");
    }
}
