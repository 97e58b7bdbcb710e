//! Box and label overlay for display output.

use ab_glyph::FontRef;
use image::Rgb;
use imageproc::drawing::{draw_text_mut, text_size};
use std::sync::OnceLock;

use crate::classify::{BoundingBox, Detections};
use crate::frame::Frame;

pub const WINDOW_TITLE: &str = "Ripe Strawberry Detection";

const BOX_THICKNESS: u32 = 2;

/// Label glyph height in pixels.
pub const LABEL_SCALE: f32 = 18.0;

/// Gap between the bottom of a label and the top edge of its box.
const LABEL_GAP: i32 = 2;

static LABEL_FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

fn label_font() -> Option<&'static FontRef<'static>> {
    static FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();
    FONT.get_or_init(|| match FontRef::try_from_slice(LABEL_FONT_BYTES) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("label font unusable, drawing boxes only: {}", e);
            None
        }
    })
    .as_ref()
}

/// Copy of `frame` with one rectangle per detected region in its class
/// color, labelled just above its top-left corner.
pub fn annotate(frame: &Frame, detections: &Detections) -> Frame {
    let mut out = frame.clone();
    for (class, region) in detections.iter() {
        let spec = class.spec();
        draw_box(&mut out, region.bbox, spec.box_color);
        draw_label(&mut out, region.bbox, spec.label, spec.box_color);
    }
    out
}

/// Text whose bottom sits `LABEL_GAP` pixels above the box, pushed down to
/// stay inside the frame when the box touches the top edge.
pub fn draw_label(frame: &mut Frame, bbox: BoundingBox, text: &str, rgb: [u8; 3]) {
    let Some(font) = label_font() else {
        return;
    };
    let (_, text_height) = text_size(LABEL_SCALE, font, text);
    let y = (bbox.y as i32 - LABEL_GAP - text_height as i32).max(0);
    draw_text_mut(
        frame.image_mut(),
        Rgb(rgb),
        bbox.x as i32,
        y,
        LABEL_SCALE,
        font,
        text,
    );
}

/// Window title naming the active classes and their region counts.
pub fn title(detections: &Detections) -> String {
    let labels: Vec<String> = detections
        .active_classes()
        .map(|class| {
            let n = detections.regions(class).len();
            if n == 1 {
                class.spec().label.to_string()
            } else {
                format!("{} x{}", class.spec().label, n)
            }
        })
        .collect();
    if labels.is_empty() {
        WINDOW_TITLE.to_string()
    } else {
        format!("{} - {}", WINDOW_TITLE, labels.join(", "))
    }
}

/// Hollow rectangle from (x, y) to (x + w, y + h), grown inward by the stroke
/// thickness and clipped to the frame.
pub fn draw_box(frame: &mut Frame, bbox: BoundingBox, rgb: [u8; 3]) {
    let (fw, fh) = (frame.width() as i64, frame.height() as i64);
    let x0 = bbox.x as i64;
    let y0 = bbox.y as i64;
    let x1 = x0 + bbox.width as i64;
    let y1 = y0 + bbox.height as i64;
    let t = BOX_THICKNESS as i64;

    let image = frame.image_mut();
    let mut plot = |x: i64, y: i64| {
        if (0..fw).contains(&x) && (0..fh).contains(&y) {
            image.put_pixel(x as u32, y as u32, Rgb(rgb));
        }
    };
    for y in y0..=y1 {
        for x in x0..=x1 {
            let on_edge = x < x0 + t || x > x1 - t || y < y0 + t || y > y1 - t;
            if on_edge {
                plot(x, y);
            }
        }
    }
}
