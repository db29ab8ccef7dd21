//! Corner resolver: turn a noisy set of candidate feature points from one
//! strike event into a single authoritative impact location.
//!
//! The tip of a dart is unreliable on its own (shafts wobble, reflections
//! create spurious corners). The shaft's line direction is the stable
//! signal, so the pipeline filters the cloud down to points on that line
//! and only then trusts the extremal point along it, validated by local
//! point density.

use dartvision_core::{
    fit_line_robust, line_frame_intersection, point_to_line_distance, FrameSize, RobustLoss,
};
use kiddo::{KdTree, SquaredEuclidean};
use log::info;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Tunable policy constants of the resolver pipeline. The defaults are
/// nominal starting points, not load-bearing contracts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolverParams {
    /// Horizontal half-window around the candidate mean kept by the
    /// density filter.
    pub density_window_px: f32,
    /// Maximal perpendicular distance from the fitted shaft line.
    pub line_distance_px: f32,
    /// Minimal candidate count to attempt resolution at all.
    pub min_candidates: usize,
    /// Minimal surviving count after the line filter.
    pub min_on_line: usize,
    /// Radius of the neighbor-density band around the tip candidate.
    pub neighbor_band_px: f32,
    /// Neighbors (tip included) required inside the band.
    pub min_neighbors: usize,
    /// Welsch scale of the first, outlier-suppressing fit pass.
    pub first_pass_scale: f32,
    /// Huber scale of the second, tightening fit pass.
    pub second_pass_scale: f32,
    pub fit_iterations: usize,
}

impl Default for ResolverParams {
    fn default() -> Self {
        Self {
            density_window_px: 150.0,
            line_distance_px: 15.0,
            min_candidates: 20,
            min_on_line: 15,
            neighbor_band_px: 40.0,
            min_neighbors: 3,
            first_pass_scale: 10.0,
            second_pass_scale: 5.0,
            fit_iterations: 10,
        }
    }
}

/// Resolve the impact point of one strike event, or `None` when any stage
/// leaves too little evidence. "No dart this cycle" is the expected common
/// case, so failures are logged and never raised.
pub fn resolve(
    candidates: &[Point2<f32>],
    frame: FrameSize,
    params: &ResolverParams,
) -> Option<Point2<f32>> {
    if candidates.len() < params.min_candidates {
        info!(
            "dart not detected: only {} candidate corners",
            candidates.len()
        );
        return None;
    }

    let clustered = filter_by_density(candidates, params.density_window_px);
    if clustered.len() < 2 {
        info!("dart not detected: density filter left {}", clustered.len());
        return None;
    }

    let Some(on_line) = filter_on_line(&clustered, frame, params) else {
        info!("dart not detected: no stable shaft line");
        return None;
    };
    if on_line.len() < params.min_on_line {
        info!(
            "dart not detected: {} corners on the shaft line",
            on_line.len()
        );
        return None;
    }

    select_impact_point(&on_line, params)
}

/// Drop points whose horizontal distance to the candidate mean exceeds the
/// window; background noise is rarely near the dart cluster.
fn filter_by_density(points: &[Point2<f32>], window: f32) -> Vec<Point2<f32>> {
    let mean_x = points.iter().map(|p| p.x).sum::<f32>() / points.len() as f32;
    points
        .iter()
        .copied()
        .filter(|p| (p.x - mean_x).abs() <= window)
        .collect()
}

/// Two-pass robust line filter. A single robust fit is still skewed by the
/// flight of the dart; the second pass tightens the estimate using only
/// points already close to the first line.
fn filter_on_line(
    points: &[Point2<f32>],
    frame: FrameSize,
    params: &ResolverParams,
) -> Option<Vec<Point2<f32>>> {
    let first = fit_line_robust(
        points,
        RobustLoss::Welsch,
        params.first_pass_scale,
        params.fit_iterations,
    )?;
    let clipped = line_frame_intersection(&first, frame)?;

    let inliers: Vec<Point2<f32>> = points
        .iter()
        .copied()
        .filter(|p| point_to_line_distance(&clipped, *p) <= params.line_distance_px)
        .collect();
    if inliers.len() < 2 {
        return None;
    }

    let second = fit_line_robust(
        &inliers,
        RobustLoss::Huber,
        params.second_pass_scale,
        params.fit_iterations,
    )?;
    let clipped = line_frame_intersection(&second, frame)?;

    Some(
        points
            .iter()
            .copied()
            .filter(|p| point_to_line_distance(&clipped, *p) <= params.line_distance_px)
            .collect(),
    )
}

/// The impact point is the topmost surviving point, provided enough
/// neighbors back it up. Sparse tips are discarded one at a time until a
/// dense one is found or the set runs out.
fn select_impact_point(points: &[Point2<f32>], params: &ResolverParams) -> Option<Point2<f32>> {
    let coords: Vec<[f32; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
    let tree: KdTree<f32, 2> = (&coords).into();
    let band_sq = params.neighbor_band_px * params.neighbor_band_px;

    let mut removed = vec![false; points.len()];
    let mut remaining = points.len();

    while remaining > 0 {
        let tip_index = points
            .iter()
            .enumerate()
            .filter(|(i, _)| !removed[*i])
            .min_by(|(_, a), (_, b)| a.y.total_cmp(&b.y))
            .map(|(i, _)| i)?;
        let tip = points[tip_index];

        let neighbors = tree
            .within_unsorted::<SquaredEuclidean>(&[tip.x, tip.y], band_sq)
            .into_iter()
            .filter(|n| !removed[n.item as usize])
            .count();

        if neighbors >= params.min_neighbors {
            return Some(tip);
        }

        info!("skipped tip candidate with {neighbors} neighbors");
        removed[tip_index] = true;
        remaining -= 1;
    }

    info!("dart not detected: no tip candidate with enough neighbors");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lax_params() -> ResolverParams {
        ResolverParams {
            min_candidates: 3,
            min_on_line: 3,
            min_neighbors: 2,
            ..ResolverParams::default()
        }
    }

    #[test]
    fn too_few_candidates_fail_immediately() {
        let frame = FrameSize::new(800, 600);
        let points = [Point2::new(10.0, 10.0), Point2::new(12.0, 30.0)];
        assert!(resolve(&points, frame, &ResolverParams::default()).is_none());
    }

    #[test]
    fn resolves_the_tip_of_an_aligned_shaft() {
        // Three aligned shaft corners plus one far-off noise point.
        let points = [
            Point2::new(400.0, 100.0),
            Point2::new(405.0, 130.0),
            Point2::new(410.0, 160.0),
            Point2::new(900.0, 500.0),
        ];
        let frame = FrameSize::new(800, 600);

        let impact = resolve(&points, frame, &lax_params()).expect("resolved");
        assert_relative_eq!(impact.x, 400.0);
        assert_relative_eq!(impact.y, 100.0);
    }

    #[test]
    fn density_filter_removes_far_noise() {
        let points = [
            Point2::new(400.0, 100.0),
            Point2::new(405.0, 130.0),
            Point2::new(410.0, 160.0),
            Point2::new(900.0, 500.0),
        ];
        let kept = filter_by_density(&points, 150.0);
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|p| p.x < 500.0));
    }

    #[test]
    fn dominant_cluster_wins_over_separated_noise_cluster() {
        // Eight collinear shaft points and a second, well-separated
        // three-point cluster. The resolved point must come from the shaft,
        // never from an average of both clusters.
        let mut points: Vec<Point2<f32>> = (0..8)
            .map(|i| Point2::new(300.0, 100.0 + 20.0 * i as f32))
            .collect();
        points.push(Point2::new(500.0, 300.0));
        points.push(Point2::new(501.0, 320.0));
        points.push(Point2::new(500.0, 340.0));

        let params = ResolverParams {
            min_candidates: 3,
            min_on_line: 3,
            min_neighbors: 3,
            neighbor_band_px: 45.0,
            ..ResolverParams::default()
        };
        let impact = resolve(&points, FrameSize::new(800, 600), &params).expect("resolved");
        assert_relative_eq!(impact.x, 300.0);
        assert_relative_eq!(impact.y, 100.0);
    }

    #[test]
    fn sparse_tip_is_skipped_for_a_dense_one() {
        // A lone corner above the shaft must not be mistaken for the tip.
        let mut points = vec![Point2::new(420.0, 20.0)];
        points.extend((0..6).map(|i| Point2::new(400.0, 200.0 + 15.0 * i as f32)));

        let params = ResolverParams {
            min_candidates: 3,
            min_on_line: 3,
            min_neighbors: 3,
            line_distance_px: 25.0,
            ..ResolverParams::default()
        };
        let impact = resolve(&points, FrameSize::new(800, 600), &params).expect("resolved");
        assert_relative_eq!(impact.y, 200.0);
    }

    #[test]
    fn exhausting_all_tips_fails_the_event() {
        // Three corners spread too thin for any of them to have backup.
        let points = [
            Point2::new(400.0, 100.0),
            Point2::new(402.0, 300.0),
            Point2::new(398.0, 500.0),
        ];
        let params = ResolverParams {
            min_candidates: 3,
            min_on_line: 3,
            min_neighbors: 2,
            ..ResolverParams::default()
        };
        assert!(resolve(&points, FrameSize::new(800, 600), &params).is_none());
    }
}
