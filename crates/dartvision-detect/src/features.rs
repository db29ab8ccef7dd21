use dartvision_core::GrayImageView;
use nalgebra::Point2;

/// Corner feature extraction over the motion-difference image of one
/// strike event.
///
/// Any algorithm satisfying "return up to `max_corners` strong
/// local-gradient corner points" is acceptable. The resolver treats an
/// empty or saturated (`len == max_corners`) result as an immediate
/// detection failure.
pub trait FeatureExtractor {
    fn corners(
        &self,
        image: &GrayImageView<'_>,
        max_corners: usize,
        quality: f32,
        min_distance: f32,
    ) -> Vec<Point2<f32>>;
}
