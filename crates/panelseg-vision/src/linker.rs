//! Polyline linker.
//!
//! Grows each unlinked segment into the longest polyline reachable by
//! repeatedly joining the nearest endpoint within a fixed growth radius,
//! closing the loop via line intersection once the two open ends meet
//! within `closeGap`.
//!
//! The growth radius that decides whether a neighboring segment is close
//! enough to join is a fixed 5px (squared: 25.0), distinct from the
//! user-supplied `closeGap` used only for the final loop-closure test —
//! the original keeps these as two different constants rather than one
//! shared parameter. See DESIGN.md.
use panelseg_core::Point;
use std::collections::VecDeque;

const GROWTH_LIMIT_SQ: f64 = 25.0;

/// Intersection of the lines through `(a, b)` and `(c, d)`.
///
/// Returns the midpoint of `a` and `c` when the two lines are coincident
/// (within `1e-6`), or `(∞, ∞)` when they are parallel but not coincident.
fn intersection(a: Point, b: Point, c: Point, d: Point) -> Point {
    let tx = b.x - a.x;
    let ty = b.y - a.y;
    let ux = d.x - c.x;
    let uy = d.y - c.y;

    let vx = ty * ux;
    let vy = tx * uy;
    let denom = vy - vx;

    if denom == 0.0 {
        let r1 = a.x * ty + a.y * tx;
        let r2 = c.x * ty + c.y * tx;
        if (r1 - r2).abs() < 1e-6 {
            return Point::new((a.x + c.x) / 2.0, (a.y + c.y) / 2.0);
        }
        return Point::new(f64::INFINITY, f64::INFINITY);
    }

    let p_scalar = tx * a.y - ty * a.x;
    let q_scalar = ux * c.y - uy * c.x;

    Point::new(
        (p_scalar * ux - q_scalar * tx) / denom,
        (p_scalar * uy - q_scalar * ty) / denom,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Front,
    Back,
}

fn second_point(dq: &VecDeque<Point>, side: Side) -> Point {
    match side {
        Side::Back => dq[dq.len() - 2],
        Side::Front => dq[1],
    }
}

/// Squared distance between a pool candidate's nearer endpoint and `p0`,
/// normalizing the candidate in place so its nearer endpoint is the front.
fn measure_distance(p0: Point, candidate: &mut VecDeque<Point>) -> f64 {
    let front = *candidate.front().unwrap();
    let back = *candidate.back().unwrap();
    let d1 = p0.distance_squared_to(front);
    let d2 = p0.distance_squared_to(back);
    if d1 > d2 {
        *candidate.front_mut().unwrap() = back;
        *candidate.back_mut().unwrap() = front;
        d2
    } else {
        d1
    }
}

/// Attempt to grow `current` (at `current_idx`) by consuming the nearest
/// pool member in `[begin, end)`. Returns the (possibly shrunk) pool end;
/// unchanged from `end` means no growth happened.
fn grow_polyline(
    polylines: &mut [VecDeque<Point>],
    begin: usize,
    end: usize,
    current_idx: usize,
    side: Side,
) -> usize {
    if begin >= end {
        return end;
    }

    let (p0, p1) = {
        let current = &polylines[current_idx];
        (
            match side {
                Side::Back => *current.back().unwrap(),
                Side::Front => *current.front().unwrap(),
            },
            second_point(current, side),
        )
    };

    let mut best_idx = begin;
    let mut best_dist = f64::INFINITY;
    for i in begin..end {
        let d = measure_distance(p0, &mut polylines[i]);
        if d < best_dist {
            best_dist = d;
            best_idx = i;
        }
    }

    if best_dist > GROWTH_LIMIT_SQ {
        return end;
    }

    let q0 = *polylines[best_idx].front().unwrap();
    let q1 = *polylines[best_idx].back().unwrap();

    let mut q2 = intersection(p0, p1, q0, q1);
    if p0.distance_squared_to(q2) > best_dist {
        q2 = Point::new((p0.x + q0.x) / 2.0, (p0.y + q0.y) / 2.0);
    }

    let new_end = end - 1;
    polylines.swap(best_idx, new_end);

    let new_corner = intersection(p0, p1, q2, q1);
    match side {
        Side::Back => {
            *polylines[current_idx].back_mut().unwrap() = new_corner;
            polylines[current_idx].push_back(q1);
        }
        Side::Front => {
            *polylines[current_idx].front_mut().unwrap() = new_corner;
            polylines[current_idx].push_front(q1);
        }
    }

    new_end
}

fn endpoint_distance_sq(polyline: &VecDeque<Point>) -> f64 {
    polyline
        .front()
        .unwrap()
        .distance_squared_to(*polyline.back().unwrap())
}

fn close_polyline(polyline: &mut VecDeque<Point>) {
    let first = polyline[0];
    let second = polyline[1];
    let last = polyline[polyline.len() - 1];
    let second_last = polyline[polyline.len() - 2];
    let corner = intersection(first, second, last, second_last);
    *polyline.front_mut().unwrap() = corner;
    *polyline.back_mut().unwrap() = corner;
}

/// Link unordered segments into polylines, joining nearby endpoints and
/// closing loops within `close_gap` pixels.
pub fn link_segments(segments: &[(Point, Point)], close_gap: u32) -> Vec<Vec<Point>> {
    let close_gap_sq = (close_gap as f64) * (close_gap as f64);

    let mut polylines: Vec<VecDeque<Point>> = segments
        .iter()
        .map(|&(a, b)| VecDeque::from(vec![a, b]))
        .collect();

    let mut begin = 0usize;
    let mut end = polylines.len();

    'outer: while begin < end {
        let longest = (begin..end)
            .max_by(|&i, &j| {
                endpoint_distance_sq(&polylines[i])
                    .partial_cmp(&endpoint_distance_sq(&polylines[j]))
                    .unwrap()
            })
            .unwrap();
        polylines.swap(begin, longest);
        let current_idx = begin;
        begin += 1;

        loop {
            let new_end = grow_polyline(&mut polylines, begin, end, current_idx, Side::Back);
            if new_end == end {
                break;
            }
            end = new_end;
            if endpoint_distance_sq(&polylines[current_idx]) <= close_gap_sq {
                close_polyline(&mut polylines[current_idx]);
                continue 'outer;
            }
        }

        loop {
            let new_end = grow_polyline(&mut polylines, begin, end, current_idx, Side::Front);
            if new_end == end {
                break;
            }
            end = new_end;
            if endpoint_distance_sq(&polylines[current_idx]) <= close_gap_sq {
                close_polyline(&mut polylines[current_idx]);
                continue 'outer;
            }
        }
    }

    polylines.truncate(end);
    polylines
        .into_iter()
        .map(|dq| dq.into_iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_segments_yields_no_polylines() {
        assert!(link_segments(&[], 5).is_empty());
    }

    #[test]
    fn colinear_segments_with_a_small_gap_merge_into_one_open_polyline() {
        let segments = [
            (Point::new(0.0, 50.0), Point::new(100.0, 50.0)),
            (Point::new(105.0, 50.0), Point::new(200.0, 50.0)),
        ];
        let polylines = link_segments(&segments, 10);
        assert_eq!(polylines.len(), 1);
        let p = &polylines[0];
        assert_eq!(p.len(), 3);
        assert!((p.first().unwrap().x - 0.0).abs() < 1e-6);
        assert!((p.last().unwrap().x - 200.0).abs() < 1e-6);
    }

    #[test]
    fn four_segments_close_into_one_polyline() {
        // A rough square; each pair of adjacent sides shares a near-corner
        // within close_gap=5, so the walk should link and close.
        let segments = [
            (Point::new(0.0, 0.0), Point::new(100.0, 1.0)),
            (Point::new(99.0, 0.0), Point::new(101.0, 100.0)),
            (Point::new(100.0, 99.0), Point::new(1.0, 101.0)),
            (Point::new(0.0, 100.0), Point::new(1.0, 1.0)),
        ];
        let polylines = link_segments(&segments, 5);
        assert_eq!(polylines.len(), 1);
        let p = &polylines[0];
        assert!((p.first().unwrap().x - p.last().unwrap().x).abs() < 1e-6);
        assert!((p.first().unwrap().y - p.last().unwrap().y).abs() < 1e-6);
    }

    #[test]
    fn intersection_of_parallel_noncoincident_lines_is_infinite() {
        let p = intersection(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(1.0, 5.0),
        );
        assert!(p.x.is_infinite() && p.y.is_infinite());
    }

    #[test]
    fn intersection_of_coincident_lines_is_the_midpoint() {
        let p = intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(20.0, 0.0),
        );
        assert!((p.y).abs() < 1e-9);
        assert!((p.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn intersection_of_crossing_lines() {
        let p = intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        );
        assert!((p.x - 5.0).abs() < 1e-6);
        assert!((p.y - 5.0).abs() < 1e-6);
    }
}
