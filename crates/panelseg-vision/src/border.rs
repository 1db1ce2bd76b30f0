//! Border mask builder.
//!
//! Flood-fills the page background from the four corners of a region of
//! interest into a Planar-8 mask: `255` marks background, `0` marks
//! content/interior. The fillability predicate is chosen once by probing
//! the four corner pixels of the source buffer — alpha if any corner is
//! translucent, CIELab color distance otherwise.

use panelseg_core::{Point, RasterF32x4, RasterU8, RasterU8Mut, Region};
use std::collections::VecDeque;

const D50: [f32; 3] = [0.964_355, 1.0, 0.825_195];
const LAB_EPSILON: f32 = 0.008856;
const LAB_KAPPA: f32 = 903.3;
const COLOR_DISTANCE_THRESHOLD_SQ: f32 = 6.7;

fn xyz_to_lab(xyz: [f32; 3]) -> [f32; 3] {
    let r = [
        (xyz[0] / D50[0]).clamp(0.0, 1.0),
        (xyz[1] / D50[1]).clamp(0.0, 1.0),
        (xyz[2] / D50[2]).clamp(0.0, 1.0),
    ];
    let f = |v: f32| {
        if v > LAB_EPSILON {
            v.cbrt()
        } else {
            (LAB_KAPPA * v + 16.0) / 116.0
        }
    };
    let fx = f(r[0]);
    let fy = f(r[1]);
    let fz = f(r[2]);
    // L from fy (the standard formula); the original computes it from fx.
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

fn lab_distance_sq(a: [f32; 3], b: [f32; 3]) -> f32 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    d0 * d0 + d1 * d1 + d2 * d2
}

enum Predicate {
    Alpha,
    Color([f32; 3]),
}

impl Predicate {
    fn is_fillable(&self, pixel: [f32; 4]) -> bool {
        match self {
            Predicate::Alpha => pixel[3] < 0.5,
            Predicate::Color(reference) => {
                lab_distance_sq(xyz_to_lab([pixel[0], pixel[1], pixel[2]]), *reference)
                    < COLOR_DISTANCE_THRESHOLD_SQ
            }
        }
    }
}

/// Scan-line flood fill from `(x, y)`, writing `255` into every reachable
/// fillable, not-yet-marked pixel. Uses an explicit work queue so stack
/// depth stays bounded regardless of fill size.
fn fill_from(source: &RasterF32x4, dest: &mut RasterU8Mut, predicate: &Predicate, x: u32, y: u32) {
    let width = source.width();
    let height = source.height();
    let mut queue = VecDeque::new();
    queue.push_back((x, y));

    while let Some((x, y)) = queue.pop_front() {
        let is_open = |dest: &RasterU8Mut, x: u32| {
            dest.get_pixel_unchecked(x, y) == 0
                && predicate.is_fillable(source.get_pixel_unchecked(x, y))
        };

        if !is_open(dest, x) {
            continue;
        }

        let mut lo = x;
        let mut hi = x;
        while lo > 0 && is_open(dest, lo - 1) {
            lo -= 1;
        }
        while hi < width - 1 && is_open(dest, hi + 1) {
            hi += 1;
        }

        for cx in lo..=hi {
            dest.set_pixel_unchecked(cx, y, 255);
        }

        if y > 0 {
            for cx in lo..=hi {
                queue.push_back((cx, y - 1));
            }
        }
        if y < height - 1 {
            for cx in lo..=hi {
                queue.push_back((cx, y + 1));
            }
        }
    }
}

/// Build the background mask for `roi` within `source`.
///
/// Deviates from the distilled spec's phrasing of the initial fill ("0xFF
/// inside roi, 0x00 outside"): the original source sets pixels *outside*
/// `roi` to `0xFF` and pixels *inside* to `0x00`, which is the only
/// reading consistent with the documented output semantics (`0` =
/// content/interior — true for untouched pixels only if they start at
/// `0`). Followed here; see DESIGN.md.
pub fn extract_border(source: &RasterF32x4, roi: Region) -> RasterU8 {
    let width = source.width();
    let height = source.height();
    let mut dest = RasterU8Mut::new(width, height).expect("source dimensions already validated");

    let min_x = roi.lo.x.round() as u32;
    let min_y = roi.lo.y.round() as u32;
    let max_x = (roi.hi.x.round() as u32).saturating_sub(1).min(width - 1);
    let max_y = (roi.hi.y.round() as u32).saturating_sub(1).min(height - 1);

    let full_image = min_x == 0 && min_y == 0 && max_x == width - 1 && max_y == height - 1;

    if full_image {
        dest.clear();
    } else {
        for y in 0..height {
            for x in 0..width {
                let inside_roi = (min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y);
                dest.set_pixel_unchecked(x, y, if inside_roi { 0 } else { 255 });
            }
        }
    }

    let corners = [
        (min_x, min_y),
        (max_x, min_y),
        (min_x, max_y),
        (max_x, max_y),
    ];

    let any_translucent = corners
        .iter()
        .any(|&(x, y)| source.get_pixel_unchecked(x, y)[3] != 1.0);

    for &(x, y) in &corners {
        let predicate = if any_translucent {
            Predicate::Alpha
        } else {
            let seed = source.get_pixel_unchecked(x, y);
            Predicate::Color(xyz_to_lab([seed[0], seed[1], seed[2]]))
        };
        fill_from(source, &mut dest, &predicate, x, y);
    }

    dest.into()
}

#[allow(dead_code)]
fn full_roi(width: u32, height: u32) -> Region {
    Region::new(Point::new(0.0, 0.0), Point::new(width as f64, height as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [f32; 4]) -> RasterF32x4 {
        RasterF32x4::from_pixels(width, height, vec![color; (width * height) as usize]).unwrap()
    }

    #[test]
    fn uniform_opaque_page_fills_entirely_to_background() {
        let source = solid(20, 20, [0.9, 0.9, 0.9, 1.0]);
        let mask = extract_border(&source, full_roi(20, 20));
        for y in 0..20 {
            for x in 0..20 {
                assert_eq!(mask.get_pixel(x, y), Some(255), "at ({x},{y})");
            }
        }
    }

    #[test]
    fn translucent_corner_blocks_a_dissimilar_center() {
        let mut pixels = vec![[0.9f32, 0.9, 0.9, 1.0]; 20 * 20];
        pixels[0] = [0.9, 0.9, 0.9, 0.0];
        for y in 8..12 {
            for x in 8..12 {
                pixels[(y * 20 + x) as usize] = [0.1, 0.1, 0.1, 1.0];
            }
        }
        let source = RasterF32x4::from_pixels(20, 20, pixels).unwrap();
        let mask = extract_border(&source, full_roi(20, 20));
        assert_eq!(mask.get_pixel(10, 10), Some(0));
        assert_eq!(mask.get_pixel(0, 0), Some(255));
    }

    #[test]
    fn outside_roi_is_always_background() {
        let source = solid(20, 20, [0.9, 0.9, 0.9, 1.0]);
        let roi = Region::new(Point::new(5.0, 5.0), Point::new(15.0, 15.0));
        let mask = extract_border(&source, roi);
        assert_eq!(mask.get_pixel(0, 0), Some(255));
        assert_eq!(mask.get_pixel(19, 19), Some(255));
    }
}
