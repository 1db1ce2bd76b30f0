//! Border extraction, edge detection, PPHT segment detection, polyline
//! linking, and reading-order region extraction — the flat external API
//! of the panel-detection pipeline.
//!
//! `detect_segments`, `detect_polylines`, and `detect_regions` are each
//! independently callable and each rerun the full upstream pipeline from
//! scratch on the buffer they're given: the PPHT analyzer is a one-shot,
//! consuming object with no cheaper way to share state between calls.

pub mod border;
pub mod edge;
pub mod error;
pub mod linker;
pub mod ppht;
pub mod regions;

pub use error::{VisionError, VisionResult};

use panelseg_core::{ParamDict, Point, PphtParams, RasterF32x4, RasterU8, Region};

/// Flood-fill the page background from the four corners of `roi`.
/// Total: never fails.
pub fn extract_border(source: &RasterF32x4, roi: Region) -> RasterU8 {
    border::extract_border(source, roi)
}

/// Erosion-difference edge mask, mutating `buffer` in place.
pub fn detect_edges(buffer: RasterU8) -> VisionResult<RasterU8> {
    Ok(edge::detect_edges(buffer)?)
}

/// Run the PPHT analyzer over an edge mask and return the accepted line
/// segments.
pub fn detect_segments(
    edges: &RasterU8,
    params: &ParamDict,
) -> VisionResult<Vec<(Point, Point)>> {
    let params = PphtParams::from_dict(params)?;
    let analyzer = ppht::PphtAnalyzer::new(edges, params);
    Ok(analyzer.analyze())
}

/// Detect segments, then link them into polylines.
pub fn detect_polylines(edges: &RasterU8, params: &ParamDict) -> VisionResult<Vec<Vec<Point>>> {
    let validated = PphtParams::from_dict(params)?;
    let analyzer = ppht::PphtAnalyzer::new(edges, validated);
    let segments = analyzer.analyze();
    Ok(linker::link_segments(&segments, validated.close_gap))
}

/// Detect segments, link them into polylines, and reduce those to
/// reading-order regions.
pub fn detect_regions(
    edges: &RasterU8,
    params: &ParamDict,
) -> VisionResult<Vec<(f64, f64, f64, f64)>> {
    let polylines = detect_polylines(edges, params)?;
    let regions = regions::detect_regions(&polylines);
    Ok(regions
        .into_iter()
        .map(|r| (r.lo.x, r.lo.y, r.width(), r.height()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_detects_no_regions() {
        let edges = RasterU8::new(100, 100).unwrap();
        let regions = detect_regions(&edges, &ParamDict::new()).unwrap();
        assert!(regions.is_empty());
    }
}
