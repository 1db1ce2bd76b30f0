//! Morphological erosion-difference edge detector.
//!
//! The 3×3 planar minimum is computed into a scratch buffer, then
//! subtracted componentwise from the source, saturating at zero. The
//! result is written back into the same buffer.

use panelseg_core::{RasterU8, Result};

/// Erosion-difference edge detector, mutating `raster` in place.
pub fn detect_edges(raster: RasterU8) -> Result<RasterU8> {
    let width = raster.width();
    let height = raster.height();
    let mut eroded = vec![0u8; (width * height) as usize];

    for y in 0..height {
        for x in 0..width {
            let mut min = u8::MAX;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        continue;
                    }
                    min = min.min(raster.get_pixel_unchecked(nx as u32, ny as u32));
                }
            }
            eroded[(y * width + x) as usize] = min;
        }
    }

    let mut result = raster
        .try_into_mut()
        .unwrap_or_else(|shared| shared.deep_clone().try_into_mut().unwrap());

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            let src = result.get_pixel_unchecked(x, y);
            result.set_pixel_unchecked(x, y, src.saturating_sub(eroded[idx]));
        }
    }

    Ok(result.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_has_no_edges() {
        let raster = RasterU8::from_pixels(10, 10, vec![200u8; 100]).unwrap();
        let edges = detect_edges(raster).unwrap();
        assert!(edges.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn a_sharp_square_yields_a_border_of_nonzero_edges() {
        let mut pixels = vec![0u8; 10 * 10];
        for y in 3..7 {
            for x in 3..7 {
                pixels[y * 10 + x] = 255;
            }
        }
        let raster = RasterU8::from_pixels(10, 10, pixels).unwrap();
        let edges = detect_edges(raster).unwrap();
        assert_eq!(edges.get_pixel(3, 3), Some(255));
        assert_eq!(edges.get_pixel(0, 0), Some(0));
        assert_eq!(edges.get_pixel(5, 5), Some(0));
    }

    #[test]
    fn shared_raster_still_produces_a_result() {
        let raster = RasterU8::new(4, 4).unwrap();
        let shared = raster.clone();
        let edges = detect_edges(raster).unwrap();
        assert_eq!(edges.width(), 4);
        drop(shared);
    }
}
