//! Raster containers, geometry, the trig table, the parameter dictionary,
//! and the shared error type used throughout the panelseg pipeline.

pub mod error;
pub mod geom;
pub mod params;
pub mod raster;
pub mod trig;

pub use error::{Error, Kind, Result};
pub use geom::{Point, Region};
pub use params::{ParamDict, ParamValue, PphtParams};
pub use raster::{RasterF32x4, RasterU8, RasterU8Mut};
pub use trig::{MAX_THETA, trig_at, trig_table};
