//! Progressive Probabilistic Hough Transform analyzer.
//!
//! Consumes an edge mask and emits line segments, each backed by a run of
//! pixels that voted for a common `(θ, ρ)` bin and passed a Poisson
//! null-hypothesis significance test. The analyzer is one-shot: `analyze`
//! drains its own internal queue and returns the full segment list.

use panelseg_core::{MAX_THETA, Point, PphtParams, RasterU8, trig_at};
use rand::Rng;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelState {
    Unset,
    Pending,
    Voted,
}

/// Lanczos approximation of `ln Γ(x)` for `x > 0`, used by the Poisson
/// significance test (no `n` here ever exceeds a few thousand, so a
/// general-purpose approximation is accurate enough).
fn ln_gamma(x: f64) -> f64 {
    const G: f64 = 7.0;
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula: Γ(x)Γ(1-x) = π / sin(πx)
        let pi = std::f64::consts::PI;
        (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut acc = COEFFS[0];
        for (i, c) in COEFFS.iter().enumerate().skip(1) {
            acc += c / (x + i as f64);
        }
        let t = x + G + 0.5;
        0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
    }
}

fn next_down(v: f64) -> f64 {
    if v <= 0.0 {
        return v;
    }
    f64::from_bits(v.to_bits() - 1)
}

struct Accumulator {
    max_theta: usize,
    max_rho: u32,
    counts: Vec<u32>,
}

impl Accumulator {
    fn new(max_rho: u32) -> Self {
        Self {
            max_theta: MAX_THETA,
            max_rho,
            counts: vec![0; MAX_THETA * max_rho as usize],
        }
    }

    #[inline]
    fn index(&self, theta: usize, rho: u32) -> usize {
        theta + rho as usize * self.max_theta
    }
}

pub struct PphtAnalyzer {
    width: u32,
    height: u32,
    rho_scale: f64,
    max_rho: u32,
    threshold: f64,
    max_gap: u32,
    state: Vec<PixelState>,
    accumulator: Accumulator,
    queue: Vec<(u32, u32)>,
    voted: i64,
}

impl PphtAnalyzer {
    /// Build an analyzer over `edges`, queuing every nonzero pixel as a
    /// candidate draw.
    pub fn new(edges: &RasterU8, params: PphtParams) -> Self {
        let width = edges.width();
        let height = edges.height();
        let diagonal = ((width * width + height * height) as f64).sqrt().ceil();
        let rho_scale = 2f64.powf(((MAX_THETA as f64).log2() - diagonal.log2()).round());
        let max_rho = (diagonal * rho_scale).ceil() as u32;

        let mut state = Vec::with_capacity((width * height) as usize);
        let mut queue = Vec::new();

        for y in 0..height {
            for x in 0..width {
                if edges.get_pixel_unchecked(x, y) != 0 {
                    state.push(PixelState::Pending);
                    queue.push((x, y));
                } else {
                    state.push(PixelState::Unset);
                }
            }
        }

        Self {
            width,
            height,
            rho_scale,
            max_rho,
            threshold: params.significance_threshold(),
            max_gap: params.max_gap,
            state,
            accumulator: Accumulator::new(max_rho),
            queue,
            voted: 0,
        }
    }

    #[inline]
    fn state_at(&self, x: u32, y: u32) -> PixelState {
        self.state[(y * self.width + x) as usize]
    }

    #[inline]
    fn set_state_at(&mut self, x: u32, y: u32, value: PixelState) {
        self.state[(y * self.width + x) as usize] = value;
    }

    /// Cast votes for every θ bucket for `pixel`; return the winning
    /// `(θ, ρ)` bin if its peak count clears the Poisson significance
    /// threshold, `None` otherwise.
    fn vote(&mut self, pixel: Point, rng: &mut impl Rng) -> Option<(usize, u32)> {
        let mut n: u32 = 0;
        let mut peaks: Vec<(usize, u32)> = Vec::new();

        for theta in 0..MAX_THETA {
            let (cos_t, sin_t) = trig_at(theta);
            let rho = (pixel.x * cos_t + pixel.y * sin_t) * self.rho_scale;
            let rho = rho.round();
            if rho < 0.0 || rho >= self.max_rho as f64 {
                continue;
            }
            let rho = rho as u32;
            let idx = self.accumulator.index(theta, rho);
            self.accumulator.counts[idx] += 1;
            let count = self.accumulator.counts[idx];

            if n < count {
                n = count;
                peaks.clear();
            }
            if n == count {
                peaks.push((theta, rho));
            }
        }

        self.voted += 1;
        let lambda = self.voted as f64 / self.max_rho as f64;
        let lnp = (n as f64) * lambda.ln() - ln_gamma(n as f64 + 1.0) - lambda;

        if lnp > self.threshold {
            return None;
        }

        if peaks.len() > 1 {
            let mut factor: u32 = 512;
            loop {
                factor >>= 1;
                // Keep only the peaks aligned to this (coarser-first)
                // factor, but only if at least one peak qualifies —
                // otherwise leave the set untouched and try a finer factor.
                let matched: Vec<(usize, u32)> = peaks
                    .iter()
                    .copied()
                    .filter(|&(theta, _)| theta as u32 % factor == 0)
                    .collect();
                if !matched.is_empty() {
                    peaks = matched;
                }
                if !(peaks.len() > 1 && factor > 1) {
                    break;
                }
            }
        }

        let index = if peaks.len() == 1 {
            0
        } else {
            rng.random_range(0..peaks.len())
        };
        Some(peaks[index])
    }

    /// Undo the vote cast for `pixel`, decrementing every accumulator cell
    /// it touched.
    fn unvote(&mut self, pixel: Point) {
        for theta in 0..MAX_THETA {
            let (cos_t, sin_t) = trig_at(theta);
            let rho = (pixel.x * cos_t + pixel.y * sin_t) * self.rho_scale;
            let rho = rho.round();
            if rho < 0.0 || rho >= self.max_rho as f64 {
                continue;
            }
            let idx = self.accumulator.index(theta, rho as u32);
            if self.accumulator.counts[idx] > 0 {
                self.accumulator.counts[idx] -= 1;
            }
        }
        self.voted -= 1;
    }

    /// Drain the analyzer, returning every accepted line segment as a
    /// `(start, end)` pair.
    pub fn analyze(mut self) -> Vec<(Point, Point)> {
        let mut result = Vec::new();
        let mut rng = rand::rng();
        let mut remaining = self.queue.len();

        while remaining > 0 {
            let idx = rng.random_range(0..remaining);
            remaining -= 1;
            self.queue.swap(idx, remaining);
            let (x, y) = self.queue[remaining];

            if self.state_at(x, y) != PixelState::Pending {
                continue;
            }
            self.set_state_at(x, y, PixelState::Voted);

            let pixel = Point::new(x as f64, y as f64);
            let Some((theta, rho)) = self.vote(pixel, &mut rng) else {
                continue;
            };

            let (cos_t, sin_t) = trig_at(theta);
            let p0 = Point::new(
                rho as f64 / self.rho_scale * cos_t,
                rho as f64 / self.rho_scale * sin_t,
            );
            let (perp_cos, perp_sin) = trig_at(theta + MAX_THETA / 4);

            let bound_x = next_down(self.width as f64);
            let bound_y = next_down(self.height as f64);

            let mut z_min = f64::INFINITY;
            let mut z_max = f64::NEG_INFINITY;

            let consider = |z: f64, in_bounds: bool, z_min: &mut f64, z_max: &mut f64| {
                if in_bounds {
                    if *z_min > z {
                        *z_min = z;
                    }
                    if *z_max < z {
                        *z_max = z;
                    }
                }
            };

            if perp_cos != 0.0 {
                let z0 = -p0.x / perp_cos;
                if z0.is_finite() {
                    let y = z0 * perp_sin + p0.y;
                    consider(z0, (0.0..=bound_y).contains(&y), &mut z_min, &mut z_max);
                }
                let z1 = (bound_x - p0.x) / perp_cos;
                if z1.is_finite() {
                    let y = z1 * perp_sin + p0.y;
                    consider(z1, (0.0..=bound_y).contains(&y), &mut z_min, &mut z_max);
                }
            }
            if perp_sin != 0.0 {
                let z0 = -p0.y / perp_sin;
                if z0.is_finite() {
                    let x = z0 * perp_cos + p0.x;
                    consider(z0, (0.0..=bound_x).contains(&x), &mut z_min, &mut z_max);
                }
                let z1 = (bound_y - p0.y) / perp_sin;
                if z1.is_finite() {
                    let x = z1 * perp_cos + p0.x;
                    consider(z1, (0.0..=bound_x).contains(&x), &mut z_min, &mut z_max);
                }
            }

            if !z_min.is_finite() || !z_max.is_finite() {
                continue;
            }

            let mut candidates: Vec<(f64, f64, HashSet<(i32, i32)>)> = Vec::new();
            let mut points: HashSet<(i32, i32)> = HashSet::new();
            let mut z_lo = 0.0;
            let mut z_hi = 0.0;
            let mut gap: u32 = 1;

            let mut z = z_min;
            while z <= z_max {
                let p = Point::new(p0.x + perp_cos * z, p0.y + perp_sin * z);
                let cx = p.x.round() as i32;
                let cy = p.y.round() as i32;

                let mut hit = false;
                for ny in (cy - 1)..=(cy + 1) {
                    if ny < 0 || ny as u32 >= self.height {
                        continue;
                    }
                    for nx in (cx - 1)..=(cx + 1) {
                        if nx < 0 || nx as u32 >= self.width {
                            continue;
                        }
                        if self.state_at(nx as u32, ny as u32) != PixelState::Unset {
                            points.insert((nx, ny));
                            hit = true;
                        }
                    }
                }

                if hit {
                    if gap > 0 {
                        z_lo = z;
                    }
                    z_hi = z;
                    gap = 0;
                } else {
                    gap += 1;
                    if gap >= self.max_gap * 2 && !points.is_empty() {
                        candidates.push((z_lo, z_hi, std::mem::take(&mut points)));
                    }
                }

                z += 0.5;
            }
            if !points.is_empty() {
                candidates.push((z_lo, z_hi, points));
            }

            if candidates.is_empty() {
                // Deliberate deviation from the original: rather than
                // aborting the whole analysis (discarding every prior
                // result), skip this draw and keep going.
                continue;
            }

            let (seg_lo, seg_hi, seg_points) = candidates
                .into_iter()
                .max_by(|a, b| (a.1 - a.0).partial_cmp(&(b.1 - b.0)).unwrap())
                .unwrap();

            for &(px, py) in &seg_points {
                let (px, py) = (px as u32, py as u32);
                if self.state_at(px, py) == PixelState::Voted {
                    self.unvote(Point::new(px as f64, py as f64));
                }
                self.set_state_at(px, py, PixelState::Unset);
            }

            let p1 = Point::new(p0.x + perp_cos * seg_lo, p0.y + perp_sin * seg_lo);
            let p2 = Point::new(p0.x + perp_cos * seg_hi, p0.y + perp_sin * seg_hi);

            if p1.distance_squared_to(p2) > 100.0 {
                result.push((p1, p2));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges_from_points(width: u32, height: u32, points: &[(u32, u32)]) -> RasterU8 {
        let mut data = vec![0u8; (width * height) as usize];
        for &(x, y) in points {
            data[(y * width + x) as usize] = 255;
        }
        RasterU8::from_pixels(width, height, data).unwrap()
    }

    #[test]
    fn empty_edge_mask_yields_no_segments() {
        let edges = RasterU8::new(50, 50).unwrap();
        let analyzer = PphtAnalyzer::new(&edges, PphtParams::default());
        assert!(analyzer.analyze().is_empty());
    }

    #[test]
    fn a_long_horizontal_line_yields_one_segment() {
        let width = 100;
        let height = 50;
        let points: Vec<(u32, u32)> = (10..90).map(|x| (x, 25)).collect();
        let edges = edges_from_points(width, height, &points);
        let analyzer = PphtAnalyzer::new(
            &edges,
            PphtParams {
                sensitivity: 1.6,
                max_gap: 3,
                close_gap: 5,
            },
        );
        let segments = analyzer.analyze();
        assert!(!segments.is_empty());
        for (p1, p2) in &segments {
            assert!((p1.y - 25.0).abs() < 2.0);
            assert!((p2.y - 25.0).abs() < 2.0);
        }
    }

    #[test]
    fn ln_gamma_matches_known_factorials() {
        // ln(5!) = ln(120)
        assert!((ln_gamma(6.0) - 120f64.ln()).abs() < 1e-6);
        assert!((ln_gamma(1.0)).abs() < 1e-9);
    }
}
