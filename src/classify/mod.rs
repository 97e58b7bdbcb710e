//! Frame classification by fixed HSV thresholds.
//!
//! For every row of the class table the classifier builds an HSV mask, closes
//! small gaps with a 5×5 dilation, traces the mask borders and keeps those
//! whose area exceeds `MIN_REGION_AREA`. The result depends only on the frame:
//! no state is carried between calls.

mod contours;
mod hsv;
mod morphology;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::color::{ColorClass, ColorClassSpec, CLASS_TABLE, DILATION_KERNEL, MIN_REGION_AREA};
use crate::frame::Frame;

use contours::find_contours;
pub use hsv::{in_range, rgb_to_hsv};
pub use morphology::dilate;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetectedRegion {
    pub bbox: BoundingBox,
    pub area: f64,
}

/// Regions found in one frame, keyed by class. Every class in the table has
/// an entry, possibly empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detections {
    by_class: BTreeMap<ColorClass, Vec<DetectedRegion>>,
}

impl Detections {
    pub fn empty() -> Self {
        Self {
            by_class: ColorClass::all().map(|class| (class, Vec::new())).collect(),
        }
    }

    pub fn regions(&self, class: ColorClass) -> &[DetectedRegion] {
        self.by_class.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A class is active when at least one region survived the area filter.
    pub fn is_active(&self, class: ColorClass) -> bool {
        !self.regions(class).is_empty()
    }

    pub fn active_classes(&self) -> impl Iterator<Item = ColorClass> + '_ {
        ColorClass::all().filter(|class| self.is_active(*class))
    }

    pub fn total(&self) -> usize {
        self.by_class.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColorClass, &DetectedRegion)> {
        self.by_class
            .iter()
            .flat_map(|(class, regions)| regions.iter().map(move |r| (*class, r)))
    }
}

impl Default for Detections {
    fn default() -> Self {
        Self::empty()
    }
}

/// Classify one frame against every row of the class table.
pub fn classify(frame: &Frame) -> Detections {
    let mut detections = Detections::empty();
    if frame.is_empty() {
        return detections;
    }
    for spec in CLASS_TABLE.iter() {
        detections
            .by_class
            .insert(spec.class, classify_class(frame, spec));
    }
    detections
}

/// Regions for a single class, in contour discovery order.
pub fn classify_class(frame: &Frame, spec: &ColorClassSpec) -> Vec<DetectedRegion> {
    let mask = in_range(frame, &spec.range);
    let mask = dilate(&mask, DILATION_KERNEL);
    find_contours(&mask)
        .iter()
        .filter_map(|contour| {
            let area = contour.area();
            log::trace!(
                "{} {:?} border (parent {:?}): area {}",
                spec.class,
                contour.kind,
                contour.parent,
                area
            );
            (area > MIN_REGION_AREA).then(|| DetectedRegion {
                bbox: contour.bounding_box(),
                area,
            })
        })
        .collect()
}
