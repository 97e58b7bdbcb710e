//! Tracked color classes and their fixed thresholds.
//!
//! Every class is one row of `CLASS_TABLE`. Adding a class means adding a row;
//! the classifier, notifier and overlay iterate the table and never name a
//! class directly.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Regions whose contour area is at or below this value are discarded.
pub const MIN_REGION_AREA: f64 = 300.0;

/// Side of the square dilation kernel applied to every mask.
pub const DILATION_KERNEL: u32 = 5;

/// Minimum spacing between two keep-alive messages.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ColorClass {
    Red,
    Green,
}

impl ColorClass {
    /// Table row for this class.
    pub fn spec(self) -> &'static ColorClassSpec {
        match self {
            ColorClass::Red => &CLASS_TABLE[0],
            ColorClass::Green => &CLASS_TABLE[1],
        }
    }

    pub fn all() -> impl Iterator<Item = ColorClass> {
        CLASS_TABLE.iter().map(|spec| spec.class)
    }
}

impl fmt::Display for ColorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorClass::Red => f.write_str("red"),
            ColorClass::Green => f.write_str("green"),
        }
    }
}

/// A pixel in OpenCV's 8-bit HSV convention: hue in half-degrees (0..=179),
/// saturation and value in 0..=255.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Inclusive bound triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl HsvRange {
    pub fn contains(&self, px: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&px.h)
            && (self.lower.s..=self.upper.s).contains(&px.s)
            && (self.lower.v..=self.upper.v).contains(&px.v)
    }
}

#[derive(Clone, Debug)]
pub struct ColorClassSpec {
    pub class: ColorClass,
    pub range: HsvRange,
    /// Overlay label.
    pub label: &'static str,
    /// Box color as RGB.
    pub box_color: [u8; 3],
    /// Payload published when the class becomes active.
    pub status_code: char,
    /// Minimum spacing between two status messages for this class.
    pub debounce: Duration,
}

pub static CLASS_TABLE: [ColorClassSpec; 2] = [
    ColorClassSpec {
        class: ColorClass::Red,
        range: HsvRange {
            lower: Hsv::new(136, 87, 111),
            upper: Hsv::new(180, 255, 255),
        },
        label: "Ripe Strawberry",
        box_color: [255, 0, 0],
        status_code: '1',
        debounce: Duration::from_secs(30),
    },
    ColorClassSpec {
        class: ColorClass::Green,
        range: HsvRange {
            lower: Hsv::new(25, 52, 72),
            upper: Hsv::new(102, 255, 255),
        },
        label: "Unripe Strawberry",
        box_color: [0, 255, 0],
        status_code: '0',
        debounce: Duration::from_secs(30),
    },
];
