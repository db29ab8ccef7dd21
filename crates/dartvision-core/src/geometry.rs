use log::warn;
use nalgebra::{Point2, Vector2};

use crate::image::FrameSize;

/// Line through two points. Functions below treat it either as a segment
/// (`point_to_line_distance`) or as the infinite line through both points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub p1: Point2<f32>,
    pub p2: Point2<f32>,
}

/// Infinite line in parametric form: `support + t * direction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VectorLine {
    pub support: Point2<f32>,
    pub direction: Vector2<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point2<f32>,
    pub radius: f32,
}

/// Counter-clockwise perpendicular.
#[inline]
pub(crate) fn perp(v: Vector2<f32>) -> Vector2<f32> {
    Vector2::new(-v.y, v.x)
}

/// Distance from `point` to the segment `line.p1..line.p2`.
///
/// The projection parameter is clamped to `[0, 1]`, so distance to points
/// beyond the segment ends is measured to the nearest endpoint, not to the
/// infinite line.
pub fn point_to_line_distance(line: &Line, point: Point2<f32>) -> f32 {
    let d = line.p2 - line.p1;
    let len_sq = d.norm_squared();
    if len_sq <= f32::EPSILON {
        return (point - line.p1).norm();
    }

    let u = ((point - line.p1).dot(&d) / len_sq).clamp(0.0, 1.0);
    let nearest = line.p1 + d * u;
    (point - nearest).norm()
}

/// Unclamped projection of `point` onto the infinite line through
/// `line.p1` and `line.p2`.
pub fn closest_point_on_line(line: &Line, point: Point2<f32>) -> Point2<f32> {
    let n = line.p2 - line.p1;
    let v = point - line.p1;
    line.p1 + n * (v.dot(&n) / n.dot(&n))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineCircleIntersection {
    None,
    Tangent(Point2<f32>),
    Secant(Point2<f32>, Point2<f32>),
}

/// Intersect the infinite line through `line.p1`/`line.p2` with a circle.
///
/// Solves the quadratic in the line's parametric form. A negative
/// discriminant (line misses the circle) is not an error.
pub fn intersect_line_circle(circle: &Circle, line: &Line) -> LineCircleIntersection {
    let ba = line.p2 - line.p1;
    let ca = circle.center - line.p1;

    let a = ba.norm_squared();
    if a <= f32::EPSILON {
        return LineCircleIntersection::None;
    }

    let p_by2 = ba.dot(&ca) / a;
    let q = (ca.norm_squared() - circle.radius * circle.radius) / a;

    let disc = p_by2 * p_by2 - q;
    if disc < 0.0 {
        return LineCircleIntersection::None;
    }

    if disc == 0.0 {
        return LineCircleIntersection::Tangent(line.p1 + ba * p_by2);
    }

    let root = disc.sqrt();
    LineCircleIntersection::Secant(
        line.p1 + ba * (p_by2 + root),
        line.p1 + ba * (p_by2 - root),
    )
}

fn intersect_vector_lines(a: &VectorLine, b: &VectorLine) -> Option<Point2<f32>> {
    let diff = a.support - b.support;
    let normal = perp(a.direction);

    let denom = normal.dot(&b.direction);
    if denom.abs() <= f32::EPSILON {
        return None; // parallel
    }

    let num = normal.dot(&diff);
    Some(b.support + b.direction * (num / denom))
}

/// Clip an infinite line against the four image-boundary half-planes,
/// returning the two boundary crossings inside the frame.
///
/// A line passing almost exactly through a frame corner can intersect more
/// than two borders inside bounds; the first two crossings are kept and the
/// condition is logged rather than silently resolved.
pub fn line_frame_intersection(line: &VectorLine, frame: FrameSize) -> Option<Line> {
    let w = frame.width as f32;
    let h = frame.height as f32;

    let borders = [
        VectorLine {
            support: Point2::new(0.0, 0.0),
            direction: Vector2::new(1.0, 0.0),
        },
        VectorLine {
            support: Point2::new(0.0, h - 1.0),
            direction: Vector2::new(1.0, 0.0),
        },
        VectorLine {
            support: Point2::new(0.0, 0.0),
            direction: Vector2::new(0.0, 1.0),
        },
        VectorLine {
            support: Point2::new(w - 1.0, 0.0),
            direction: Vector2::new(0.0, 1.0),
        },
    ];

    let mut crossings: Vec<Point2<f32>> = Vec::with_capacity(2);
    for border in &borders {
        let Some(p) = intersect_vector_lines(border, line) else {
            continue;
        };
        let inside = if border.direction.x != 0.0 {
            p.x >= 0.0 && p.x < w
        } else {
            p.y >= 0.0 && p.y < h
        };
        if inside {
            crossings.push(p);
        }
    }

    if crossings.len() > 2 {
        warn!(
            "line crosses the frame boundary {} times (near-corner case), keeping the first two",
            crossings.len()
        );
        crossings.truncate(2);
    }

    if crossings.len() == 2 {
        Some(Line {
            p1: crossings[0],
            p2: crossings[1],
        })
    } else {
        None
    }
}
