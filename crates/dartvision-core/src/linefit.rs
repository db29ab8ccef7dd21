//! Robust 2D line fitting by iteratively reweighted least squares.
//!
//! Each iteration fits the weighted principal axis through the weighted
//! centroid, then reweights points by their perpendicular residual. Welsch
//! weights suppress far outliers hard; Huber keeps more of their influence
//! and suits a second, tightening pass over pre-filtered inliers.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geometry::{perp, VectorLine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobustLoss {
    Welsch,
    Huber,
}

impl RobustLoss {
    fn weight(self, abs_r: f32, scale: f32) -> f32 {
        let c = scale.max(1e-6);
        match self {
            RobustLoss::Welsch => {
                let t = abs_r / c;
                (-t * t).exp()
            }
            RobustLoss::Huber => {
                if abs_r <= c {
                    1.0
                } else {
                    c / abs_r
                }
            }
        }
    }
}

/// Perpendicular distance from `point` to an infinite parametric line.
fn residual(line: &VectorLine, point: Point2<f32>) -> f32 {
    let normal = perp(line.direction.normalize());
    (point - line.support).dot(&normal).abs()
}

fn fit_line_weighted(points: &[Point2<f32>], weights: &[f32]) -> Option<VectorLine> {
    let total: f32 = weights.iter().sum();
    if total <= 1e-9 {
        return None;
    }

    let mut cx = 0.0f32;
    let mut cy = 0.0f32;
    for (p, w) in points.iter().zip(weights) {
        cx += w * p.x;
        cy += w * p.y;
    }
    cx /= total;
    cy /= total;

    let mut sxx = 0.0f32;
    let mut sxy = 0.0f32;
    let mut syy = 0.0f32;
    for (p, w) in points.iter().zip(weights) {
        let dx = p.x - cx;
        let dy = p.y - cy;
        sxx += w * dx * dx;
        sxy += w * dx * dy;
        syy += w * dy * dy;
    }

    if sxx + syy <= 1e-9 {
        return None; // all weighted points coincide
    }

    // Principal axis of the 2x2 scatter matrix via the double-angle form.
    let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);

    Some(VectorLine {
        support: Point2::new(cx, cy),
        direction: nalgebra::Vector2::new(theta.cos(), theta.sin()),
    })
}

/// Fit a line through `points`, downweighting outliers with the given loss.
///
/// Returns `None` for fewer than two points or a degenerate (single-point)
/// configuration.
pub fn fit_line_robust(
    points: &[Point2<f32>],
    loss: RobustLoss,
    scale: f32,
    iterations: usize,
) -> Option<VectorLine> {
    if points.len() < 2 {
        return None;
    }

    let mut weights = vec![1.0f32; points.len()];
    let mut line = fit_line_weighted(points, &weights)?;

    for _ in 0..iterations.clamp(1, 50) {
        for (w, p) in weights.iter_mut().zip(points) {
            *w = loss.weight(residual(&line, *p), scale);
        }
        line = fit_line_weighted(points, &weights)?;
    }

    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn direction_angle(line: &VectorLine) -> f32 {
        let mut a = line.direction.y.atan2(line.direction.x);
        // Undirected line: fold into [0, pi).
        if a < 0.0 {
            a += std::f32::consts::PI;
        }
        a
    }

    #[test]
    fn exact_line_is_recovered() {
        let points: Vec<Point2<f32>> = (0..10)
            .map(|i| Point2::new(i as f32, 2.0 * i as f32 + 1.0))
            .collect();

        let line = fit_line_robust(&points, RobustLoss::Welsch, 10.0, 10).expect("fit");
        assert_relative_eq!(direction_angle(&line), 2.0f32.atan(), epsilon = 1e-4);
        assert_relative_eq!(residual(&line, Point2::new(5.0, 11.0)), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn welsch_fit_shrugs_off_outliers() {
        let mut points: Vec<Point2<f32>> =
            (0..20).map(|i| Point2::new(100.0, 10.0 * i as f32)).collect();
        points.push(Point2::new(300.0, 50.0));
        points.push(Point2::new(280.0, 130.0));

        let line = fit_line_robust(&points, RobustLoss::Welsch, 10.0, 10).expect("fit");

        // Vertical line at x = 100 despite two far-off flight points.
        assert_relative_eq!(
            direction_angle(&line),
            std::f32::consts::FRAC_PI_2,
            epsilon = 1e-2
        );
        assert!(residual(&line, Point2::new(100.0, 95.0)) < 1.0);
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(fit_line_robust(&[], RobustLoss::Huber, 5.0, 5).is_none());
        assert!(fit_line_robust(&[Point2::new(1.0, 1.0)], RobustLoss::Huber, 5.0, 5).is_none());

        let coincident = [Point2::new(3.0, 4.0); 5];
        assert!(fit_line_robust(&coincident, RobustLoss::Welsch, 5.0, 5).is_none());
    }
}
