//! Raster containers for the vision pipeline.
//!
//! `RasterF32x4` holds the XYZA source image, straight off the
//! `vImage_Buffer<Float32>` boundary in the original. `RasterU8` holds the
//! single-channel Planar-8 masks that flow between border extraction, edge
//! detection, and the PPHT analyzer. Both follow the same Arc-backed
//! immutable-plus-builder shape as `Pix`/`PixMut`: an immutable handle is
//! cheap to clone and share, `try_into_mut` recovers exclusive access to
//! build a new one in place, and `From<RasterU8Mut>` converts back.

use crate::error::{Error, Result};
use std::sync::Arc;

#[derive(Debug)]
struct RasterF32x4Data {
    width: u32,
    height: u32,
    data: Vec<[f32; 4]>,
}

/// An immutable, cheaply-cloneable XYZA float raster.
#[derive(Debug, Clone)]
pub struct RasterF32x4 {
    inner: Arc<RasterF32x4Data>,
}

impl RasterF32x4 {
    /// Build a zero-filled raster of the given dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::vimage(0, "raster dimensions must be non-zero"));
        }
        let len = (width as usize) * (height as usize);
        Ok(Self {
            inner: Arc::new(RasterF32x4Data {
                width,
                height,
                data: vec![[0.0; 4]; len],
            }),
        })
    }

    /// Build a raster from already-packed pixel data, row-major, no padding.
    pub fn from_pixels(width: u32, height: u32, data: Vec<[f32; 4]>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::vimage(0, "raster dimensions must be non-zero"));
        }
        if data.len() != (width as usize) * (height as usize) {
            return Err(Error::vimage(0, "pixel buffer does not match dimensions"));
        }
        Ok(Self {
            inner: Arc::new(RasterF32x4Data {
                width,
                height,
                data,
            }),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[inline]
    pub fn data(&self) -> &[[f32; 4]] {
        &self.inner.data
    }

    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.inner.width || y >= self.inner.height {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> [f32; 4] {
        self.inner.data[(y * self.inner.width + x) as usize]
    }
}

#[derive(Debug)]
struct RasterU8Data {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// An immutable, cheaply-cloneable single-channel 8-bit raster.
#[derive(Debug, Clone)]
pub struct RasterU8 {
    inner: Arc<RasterU8Data>,
}

impl RasterU8 {
    /// Build a zero-filled (black) raster of the given dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::vimage(0, "raster dimensions must be non-zero"));
        }
        let len = (width as usize) * (height as usize);
        Ok(Self {
            inner: Arc::new(RasterU8Data {
                width,
                height,
                data: vec![0u8; len],
            }),
        })
    }

    /// Build a raster from already-packed pixel data, row-major, no padding.
    pub fn from_pixels(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::vimage(0, "raster dimensions must be non-zero"));
        }
        if data.len() != (width as usize) * (height as usize) {
            return Err(Error::vimage(0, "pixel buffer does not match dimensions"));
        }
        Ok(Self {
            inner: Arc::new(RasterU8Data {
                width,
                height,
                data,
            }),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.inner.width || y >= self.inner.height {
            return None;
        }
        Some(self.get_pixel_unchecked(x, y))
    }

    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u8 {
        self.inner.data[(y * self.inner.width + x) as usize]
    }

    /// Create a fully independent copy, rather than sharing data via `Arc`.
    pub fn deep_clone(&self) -> Self {
        Self {
            inner: Arc::new(RasterU8Data {
                width: self.inner.width,
                height: self.inner.height,
                data: self.inner.data.clone(),
            }),
        }
    }

    /// Recover exclusive access to the backing buffer if this is the only
    /// handle; otherwise hand the (unchanged) raster back to the caller.
    pub fn try_into_mut(self) -> std::result::Result<RasterU8Mut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(RasterU8Mut { inner: data }),
            Err(arc) => Err(RasterU8 { inner: arc }),
        }
    }
}

/// Mutable builder for a [`RasterU8`], convertible back via `into()`.
#[derive(Debug)]
pub struct RasterU8Mut {
    inner: RasterU8Data,
}

impl RasterU8Mut {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::vimage(0, "raster dimensions must be non-zero"));
        }
        let len = (width as usize) * (height as usize);
        Ok(Self {
            inner: RasterU8Data {
                width,
                height,
                data: vec![0u8; len],
            },
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.inner.data
    }

    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u8 {
        self.inner.data[(y * self.inner.width + x) as usize]
    }

    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, value: u8) {
        let idx = (y * self.inner.width + x) as usize;
        self.inner.data[idx] = value;
    }

    pub fn clear(&mut self) {
        self.inner.data.fill(0);
    }
}

impl From<RasterU8Mut> for RasterU8 {
    fn from(mut_raster: RasterU8Mut) -> Self {
        RasterU8 {
            inner: Arc::new(mut_raster.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert!(RasterU8::new(0, 10).is_err());
        assert!(RasterF32x4::new(10, 0).is_err());
    }

    #[test]
    fn clone_shares_data_deep_clone_does_not() {
        let r1 = RasterU8::new(4, 4).unwrap();
        let r2 = r1.clone();
        assert_eq!(r1.ref_count(), 2);
        assert_eq!(r1.data().as_ptr(), r2.data().as_ptr());

        let r3 = r1.deep_clone();
        assert_ne!(r1.data().as_ptr(), r3.data().as_ptr());
    }

    #[test]
    fn mut_round_trip_sets_pixels() {
        let raster = RasterU8::new(3, 3).unwrap();
        let mut m = raster.try_into_mut().unwrap();
        m.set_pixel_unchecked(1, 1, 255);
        let raster: RasterU8 = m.into();
        assert_eq!(raster.get_pixel(1, 1), Some(255));
        assert_eq!(raster.get_pixel(0, 0), Some(0));
        assert_eq!(raster.get_pixel(3, 0), None);
    }

    #[test]
    fn try_into_mut_fails_while_shared() {
        let raster = RasterU8::new(2, 2).unwrap();
        let _shared = raster.clone();
        assert!(raster.try_into_mut().is_err());
    }
}
