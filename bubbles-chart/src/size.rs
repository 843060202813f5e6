use bubbles_common::types::{ValueRange, Viewport};

use crate::config::ChartConfig;

/// Maps raw size values onto bubble radii.
///
/// Bubble *areas* are affine in the size value: the value is clamped into the
/// observed size range (widened to include zero), interpolated into a pixel
/// area range scaled to the viewport, then turned back into a radius.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeProjector {
    /// `None` when no size column is bound
    data_range: Option<(f64, f64)>,
    pixel_area_range: (f64, f64),
    default_radius: f64,
}

impl SizeProjector {
    pub fn new(size_range: Option<&ValueRange>, viewport: Viewport, config: &ChartConfig) -> Self {
        let data_range = size_range.map(|range| {
            let min = range.min.unwrap_or(0.0).min(0.0);
            let max = range.max.unwrap_or(0.0).max(0.0);
            (min, max)
        });
        Self {
            data_range,
            pixel_area_range: Self::pixel_area_range(viewport, config),
            default_radius: config.default_radius,
        }
    }

    /// Bubble area bounds in square pixels, scaled by the viewport's smaller
    /// side relative to the reference chart
    pub fn pixel_area_range(viewport: Viewport, config: &ChartConfig) -> (f64, f64) {
        let ratio = if viewport.is_empty() {
            1.0
        } else {
            let side = viewport.width.min(viewport.height);
            side * side / config.reference_area
        };
        (
            (config.min_size_area * ratio).round(),
            (config.max_size_area * ratio).round(),
        )
    }

    /// Size domain after widening to include zero
    pub fn data_range(&self) -> Option<(f64, f64)> {
        self.data_range
    }

    /// Interpolate a value in the size domain into the pixel area range.
    ///
    /// If either range has zero width the minimum area is returned for
    /// values inside the size domain and `None` for anything else.
    pub fn project(&self, value: f64) -> Option<f64> {
        let (d0, d1) = self.data_range?;
        let (a0, a1) = self.pixel_area_range;
        if d1 - d0 == 0.0 || a1 - a0 == 0.0 {
            return (d0 <= value && value <= d1).then_some(a0);
        }
        let t = (value - d0) / (d1 - d0);
        Some(a0 + t * (a1 - a0))
    }

    /// Rounded bubble diameter for a raw size value. Image markers use this as
    /// their side length.
    pub fn diameter(&self, size: Option<f64>) -> Option<f64> {
        let (d0, d1) = self.data_range?;
        let value = size?;
        let area = self.project(value.max(d0).min(d1))?;
        Some(((area / std::f64::consts::PI).sqrt() * 2.0).round())
    }

    /// Radius for a raw size value, falling back to the default radius when
    /// there is no size column, no value, or nothing to project
    pub fn radius(&self, size: Option<f64>) -> f64 {
        self.diameter(size)
            .map(|d| d / 2.0)
            .unwrap_or(self.default_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;
    use std::f64::consts::PI;

    fn projector(min: f64, max: f64) -> SizeProjector {
        SizeProjector::new(
            Some(&ValueRange::new(min, max)),
            Viewport::new(300.0, 300.0),
            &ChartConfig::default(),
        )
    }

    #[test]
    fn test_no_size_column_uses_default() {
        let projector = SizeProjector::new(None, Viewport::new(300.0, 300.0), &ChartConfig::default());
        assert_eq!(projector.radius(Some(10.0)), 6.0);
        assert_eq!(projector.diameter(Some(10.0)), None);
    }

    #[test]
    fn test_null_size_uses_default() {
        assert_eq!(projector(5.0, 15.0).radius(None), 6.0);
    }

    #[test]
    fn test_range_includes_zero() {
        assert_eq!(projector(5.0, 15.0).data_range(), Some((0.0, 15.0)));
        assert_eq!(projector(-4.0, -1.0).data_range(), Some((-4.0, 0.0)));
    }

    #[rstest]
    #[case(Viewport::new(300.0, 300.0), (200.0, 3000.0))]
    #[case(Viewport::new(600.0, 900.0), (800.0, 12000.0))]
    #[case(Viewport::new(150.0, 400.0), (50.0, 750.0))]
    #[case(Viewport::new(0.0, 400.0), (200.0, 3000.0))]
    fn test_pixel_area_range(#[case] viewport: Viewport, #[case] expected: (f64, f64)) {
        assert_eq!(
            SizeProjector::pixel_area_range(viewport, &ChartConfig::default()),
            expected
        );
    }

    #[test]
    fn test_area_is_affine_in_value() {
        let projector = projector(0.0, 100.0);
        let a = projector.project(25.0).unwrap();
        let b = projector.project(50.0).unwrap();
        let c = projector.project(75.0).unwrap();
        assert_approx_eq!(f64, b - a, c - b);
        assert_approx_eq!(f64, projector.project(0.0).unwrap(), 200.0);
        assert_approx_eq!(f64, projector.project(100.0).unwrap(), 3000.0);
    }

    #[test]
    fn test_diameter() {
        let projector = projector(5.0, 15.0);
        // 15 is the top of the range: round(sqrt(3000 / pi) * 2)
        let expected = ((3000.0 / PI).sqrt() * 2.0).round();
        assert_eq!(projector.diameter(Some(15.0)), Some(expected));
        assert_eq!(projector.radius(Some(15.0)), expected / 2.0);
        // values beyond the range are clamped
        assert_eq!(projector.diameter(Some(1000.0)), Some(expected));
    }

    #[test]
    fn test_monotonic_radius() {
        let projector = projector(5.0, 15.0);
        let radii = [0.0, 5.0, 10.0, 15.0].map(|v| projector.radius(Some(v)));
        assert!(radii.windows(2).all(|w| w[0] <= w[1]));
        assert!(projector.radius(Some(15.0)) > projector.radius(Some(5.0)));
    }

    #[test]
    fn test_degenerate_range() {
        // all sizes zero: the domain collapses to [0, 0]
        let projector = projector(0.0, 0.0);
        assert_eq!(projector.project(0.0), Some(200.0));
        assert_eq!(projector.project(1.0), None);
        let expected = ((200.0 / PI).sqrt() * 2.0).round() / 2.0;
        assert_eq!(projector.radius(Some(0.0)), expected);
    }
}
