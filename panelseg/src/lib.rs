//! panelseg - Panel-region detection core for comic/manga page rasters
//!
//! Given a single page raster, discovers the rectangular panels on that
//! page: border extraction, edge detection, Progressive Probabilistic
//! Hough Transform line detection, polyline linking, and reading-order
//! region grouping.
//!
//! # Example
//!
//! ```
//! use panelseg::{ParamDict, RasterU8};
//!
//! let edges = RasterU8::new(100, 100).unwrap();
//! let regions = panelseg::detect_regions(&edges, &ParamDict::new()).unwrap();
//! assert!(regions.is_empty());
//! ```

pub use panelseg_core::*;
pub use panelseg_vision::*;
