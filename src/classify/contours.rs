//! Border following over a binary mask.
//!
//! Borders come from `imageproc`'s Suzuki & Abe tracer: every outer border and
//! every hole border, in raster order of discovery, each with the index of the
//! border that directly encloses it. Chains are then compressed so straight
//! horizontal, vertical and diagonal runs keep only their endpoints.

use image::GrayImage;
use imageproc::contours::BorderType;

use crate::classify::BoundingBox;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Point {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BorderKind {
    Outer,
    Hole,
}

#[derive(Clone, Debug)]
pub(crate) struct Contour {
    pub(crate) points: Vec<Point>,
    pub(crate) kind: BorderKind,
    /// Index of the enclosing contour in the returned list; `None` when the
    /// contour is enclosed only by the image frame.
    pub(crate) parent: Option<usize>,
}

impl Contour {
    /// Polygon area of the traced chain (shoelace, unsigned).
    pub(crate) fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0i64;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            twice += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
        }
        twice.abs() as f64 / 2.0
    }

    pub(crate) fn bounding_box(&self) -> BoundingBox {
        let Some(first) = self.points.first() else {
            return BoundingBox::default();
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        BoundingBox {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        }
    }
}

/// Trace all borders of the nonzero region of `mask`.
pub(crate) fn find_contours(mask: &GrayImage) -> Vec<Contour> {
    imageproc::contours::find_contours::<i32>(mask)
        .into_iter()
        .map(|traced| {
            let chain: Vec<Point> = traced
                .points
                .iter()
                .map(|p| Point { x: p.x, y: p.y })
                .collect();
            Contour {
                points: compress_chain(&chain),
                kind: match traced.border_type {
                    BorderType::Outer => BorderKind::Outer,
                    BorderType::Hole => BorderKind::Hole,
                },
                parent: traced.parent,
            }
        })
        .collect()
}

/// Keep only the points where the chain changes direction.
fn compress_chain(chain: &[Point]) -> Vec<Point> {
    let n = chain.len();
    if n <= 2 {
        return chain.to_vec();
    }
    let step = |a: Point, b: Point| (b.x - a.x, b.y - a.y);
    let kept: Vec<Point> = (0..n)
        .filter(|&k| {
            let before = step(chain[(k + n - 1) % n], chain[k]);
            let after = step(chain[k], chain[(k + 1) % n]);
            before != after
        })
        .map(|k| chain[k])
        .collect();
    if kept.is_empty() {
        chain[..1].to_vec()
    } else {
        kept
    }
}
