use image::{GrayImage, Luma, Rgb};

use crate::color::{Hsv, HsvRange};
use crate::frame::Frame;

pub(crate) const MASK_ON: u8 = 255;

/// RGB to 8-bit HSV with the same rounding and tie-breaking OpenCV uses for
/// `COLOR_BGR2HSV` on 8-bit input.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> Hsv {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v == 0 { 0 } else { (255 * diff + v / 2) / v };

    let h = if diff == 0 {
        0
    } else {
        let sixth = if v == r {
            (g - b) as f64
        } else if v == g {
            (b - r + 2 * diff) as f64
        } else {
            (r - g + 4 * diff) as f64
        };
        let mut h = (30.0 * sixth / diff as f64 + 0.5).floor() as i32;
        if h < 0 {
            h += 180;
        }
        h
    };

    Hsv::new(h as u8, s as u8, v as u8)
}

/// Binary mask of pixels inside `range` (255 inside, 0 outside).
pub fn in_range(frame: &Frame, range: &HsvRange) -> GrayImage {
    let image = frame.image();
    let mut mask = GrayImage::new(image.width(), image.height());
    for (x, y, Rgb(rgb)) in image.enumerate_pixels() {
        if range.contains(rgb_to_hsv(*rgb)) {
            mask.put_pixel(x, y, Luma([MASK_ON]));
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorClass;

    #[test]
    fn primaries() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), Hsv::new(0, 255, 255));
        assert_eq!(rgb_to_hsv([0, 255, 0]), Hsv::new(60, 255, 255));
        assert_eq!(rgb_to_hsv([0, 0, 255]), Hsv::new(120, 255, 255));
    }

    #[test]
    fn grays_have_no_hue_or_saturation() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), Hsv::new(0, 0, 0));
        assert_eq!(rgb_to_hsv([128, 128, 128]), Hsv::new(0, 0, 128));
    }

    #[test]
    fn negative_hue_wraps() {
        // crimson sits just below 360 degrees
        assert_eq!(rgb_to_hsv([220, 20, 60]), Hsv::new(174, 232, 220));
    }

    #[test]
    fn mask_selects_only_in_range_pixels() {
        let mut frame = Frame::filled(4, 1, [0, 0, 0]);
        frame.fill_rect(1, 0, 1, 1, [220, 20, 60]);
        frame.fill_rect(2, 0, 1, 1, [30, 180, 40]);

        let red = in_range(&frame, &ColorClass::Red.spec().range);
        assert_eq!(red.get_pixel(1, 0).0, [MASK_ON]);
        assert_eq!(red.get_pixel(2, 0).0, [0]);

        let green = in_range(&frame, &ColorClass::Green.spec().range);
        assert_eq!(green.get_pixel(2, 0).0, [MASK_ON]);
        assert_eq!(green.get_pixel(1, 0).0, [0]);
    }
}
