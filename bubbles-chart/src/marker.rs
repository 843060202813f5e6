use std::cmp::Reverse;

use bubbles_common::types::Viewport;
use bubbles_scales::linear::{ContinuousScale, LinearScale};
use bubbles_text::measurement::{TextMeasurementConfig, TextMeasurer};
use bubbles_text::types::FontSpec;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::axis::defined;
use crate::config::{ChartConfig, DEFAULT_FONT_FAMILY};
use crate::error::BubblesChartError;
use crate::point::{PointKey, ScatterData, ScatterPoint};
use crate::size::SizeProjector;

/// What a marker draws
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkerGeometry {
    /// SVG path data centered on the origin
    Path { d: String },
    /// Square image of side `size`, with its top-left corner at the origin
    Image { url: String, size: f64 },
}

/// Translate, then rotate about `origin` (relative to the translated frame)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerTransform {
    pub translate: (f64, f64),
    pub rotate: f64,
    pub origin: (f64, f64),
}

impl MarkerTransform {
    pub fn to_svg(&self) -> String {
        let (x, y) = self.translate;
        if self.origin == (0.0, 0.0) {
            format!("translate({x},{y}) rotate({})", self.rotate)
        } else {
            let (cx, cy) = self.origin;
            format!("translate({x},{y}) rotate({},{cx},{cy})", self.rotate)
        }
    }
}

/// Lifecycle of a marker relative to the previous frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinState {
    #[default]
    Enter,
    Update,
}

/// One marker, ready for a drawing surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerCommand {
    pub key: PointKey,
    pub geometry: MarkerGeometry,
    pub transform: MarkerTransform,
    /// `None` draws an outline only
    pub fill: Option<String>,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    pub radius: f64,
    pub state: JoinState,
    /// Transition length in milliseconds
    pub duration: f64,
}

/// Map one point to screen space
pub fn project_point(
    point: &ScatterPoint,
    x_scale: &LinearScale,
    y_scale: &LinearScale,
    projector: &SizeProjector,
    opacity: f64,
) -> MarkerCommand {
    let x = defined(x_scale.scale(point.x));
    let y = defined(y_scale.scale(point.y));
    let radius = projector.radius(point.size);

    let (geometry, transform) = match point.image_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => (
            MarkerGeometry::Image {
                url: url.to_string(),
                size: radius * 2.0,
            },
            MarkerTransform {
                translate: (defined(x - radius), defined(y - radius)),
                rotate: point.rotation,
                origin: (radius, radius),
            },
        ),
        None => (
            MarkerGeometry::Path {
                d: point.shape.svg_path((4.0 * radius * radius) as f32),
            },
            MarkerTransform {
                translate: (x, y),
                rotate: point.rotation,
                origin: (0.0, 0.0),
            },
        ),
    };

    MarkerCommand {
        key: point.key.clone(),
        geometry,
        transform,
        fill: point.fill.clone(),
        stroke: point.stroke.clone(),
        stroke_width: point.stroke_width,
        opacity,
        radius,
        state: JoinState::Enter,
        duration: 0.0,
    }
}

pub fn marker_opacity(point: &ScatterPoint, has_selection: bool, config: &ChartConfig) -> f64 {
    if has_selection && !point.selected {
        config.dimmed_opacity
    } else {
        config.default_opacity
    }
}

/// Points in draw order: largest size first so small bubbles stay on top
pub fn draw_order(points: &[ScatterPoint]) -> Vec<&ScatterPoint> {
    let mut ordered: Vec<&ScatterPoint> = points.iter().collect();
    ordered.sort_by_key(|p| Reverse(OrderedFloat(p.size.unwrap_or(f64::NEG_INFINITY))));
    ordered
}

pub fn draw_markers(
    data: &ScatterData,
    x_scale: &LinearScale,
    y_scale: &LinearScale,
    projector: &SizeProjector,
    config: &ChartConfig,
) -> Vec<MarkerCommand> {
    let has_selection = data.has_selection();
    draw_order(&data.points)
        .into_iter()
        .map(|p| {
            let opacity = marker_opacity(p, has_selection, config);
            project_point(p, x_scale, y_scale, projector, opacity)
        })
        .collect()
}

/// Category label drawn above a marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLabel {
    pub key: PointKey,
    pub text: String,
    /// Center of the label's baseline before `offset` is applied
    pub anchor: (f64, f64),
    pub offset: (f64, f64),
    pub color: String,
    pub font_size: f32,
}

/// Lay out category labels for every point that has one.
///
/// Labels are ellipsized to the width of the plotting area.
pub fn layout_labels(
    data: &ScatterData,
    x_scale: &LinearScale,
    y_scale: &LinearScale,
    projector: &SizeProjector,
    inner: Viewport,
    measurer: &dyn TextMeasurer,
    config: &ChartConfig,
) -> Result<Vec<MarkerLabel>, BubblesChartError> {
    let settings = &data.settings.category_labels;
    let font = FontSpec::try_new(DEFAULT_FONT_FAMILY, settings.font_size_px())?;
    let (x_divisor, y_divisor) = config.label_offset_divisors;

    let mut labels = Vec::new();
    for point in data.points.iter() {
        let Some(raw) = data.category_label(point) else {
            continue;
        };
        let text_config = TextMeasurementConfig::new(&raw, &font);
        let text = measurer.ellipsize(&text_config, inner.width as f32);
        let width = measurer.measure_width(&text_config.with_text(&text)) as f64;
        let height = measurer.estimate_height(&text_config) as f64;

        let radius = projector.radius(point.size);
        labels.push(MarkerLabel {
            key: point.key.clone(),
            anchor: (
                defined(x_scale.scale(point.x)),
                defined(y_scale.scale(point.y)) - (radius + config.label_margin),
            ),
            offset: (width / x_divisor, height / y_divisor),
            text,
            color: settings.color.clone(),
            font_size: font.size,
        });
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::RangeOverrides;
    use bubbles_common::shape::SymbolShape;
    use bubbles_common::types::ValueRange;
    use bubbles_scales::linear::LinearScaleConfig;
    use crate::data::{CellValue, ColumnMetadata, Role};
    use bubbles_text::measurement::approximate::ApproximateTextMeasurer;
    use float_cmp::assert_approx_eq;

    fn point(category: &str, x: f64, y: f64, size: Option<f64>) -> ScatterPoint {
        ScatterPoint {
            key: PointKey {
                category: category.to_string(),
                series: String::new(),
                occurrence: 0,
            },
            category_index: 0,
            category: CellValue::Text(category.to_string()),
            x,
            y,
            size,
            fill: Some("#ff0000".to_string()),
            stroke: "#ff0000".to_string(),
            stroke_width: 1.0,
            shape: SymbolShape::Circle,
            rotation: 0.0,
            image_url: None,
            backdrop_url: None,
            overrides: RangeOverrides::default(),
            selected: false,
        }
    }

    fn scales() -> (LinearScale, LinearScale) {
        (
            LinearScale::new(&LinearScaleConfig {
                domain: (0.0, 10.0),
                range: (0.0, 200.0),
                ..Default::default()
            }),
            LinearScale::new(&LinearScaleConfig {
                domain: (0.0, 10.0),
                range: (100.0, 0.0),
                ..Default::default()
            }),
        )
    }

    fn projector() -> SizeProjector {
        SizeProjector::new(
            Some(&ValueRange::new(1.0, 10.0)),
            Viewport::new(300.0, 300.0),
            &ChartConfig::default(),
        )
    }

    #[test]
    fn test_vector_marker() {
        let (xs, ys) = scales();
        let mut p = point("a", 5.0, 5.0, None);
        p.rotation = 30.0;
        let marker = project_point(&p, &xs, &ys, &projector(), 0.85);

        assert_eq!(marker.radius, 6.0);
        assert_eq!(marker.transform.to_svg(), "translate(100,50) rotate(30)");
        match &marker.geometry {
            MarkerGeometry::Path { d } => {
                assert_eq!(d, &SymbolShape::Circle.svg_path(144.0))
            }
            other => panic!("expected a path, got {other:?}"),
        }
    }

    #[test]
    fn test_image_marker() {
        let (xs, ys) = scales();
        let mut p = point("a", 5.0, 5.0, None);
        p.image_url = Some("http://img/a.svg".to_string());
        p.rotation = 90.0;
        let marker = project_point(&p, &xs, &ys, &projector(), 0.85);

        assert_eq!(
            marker.geometry,
            MarkerGeometry::Image {
                url: "http://img/a.svg".to_string(),
                size: 12.0,
            }
        );
        assert_eq!(marker.transform.to_svg(), "translate(94,44) rotate(90,6,6)");
    }

    #[test]
    fn test_draw_order_and_opacity() {
        let (xs, ys) = scales();
        let mut data = ScatterData {
            points: vec![
                point("small", 1.0, 1.0, Some(2.0)),
                point("none", 2.0, 2.0, None),
                point("big", 3.0, 3.0, Some(9.0)),
            ],
            ..Default::default()
        };
        let keys = |markers: &[MarkerCommand]| -> Vec<String> {
            markers.iter().map(|m| m.key.category.clone()).collect()
        };

        let markers = draw_markers(&data, &xs, &ys, &projector(), &ChartConfig::default());
        assert_eq!(keys(&markers), vec!["big", "small", "none"]);
        assert!(markers.iter().all(|m| m.opacity == 0.85));
        assert!(markers[0].radius > markers[1].radius);

        data.points[0].selected = true;
        let markers = draw_markers(&data, &xs, &ys, &projector(), &ChartConfig::default());
        let opacities: Vec<f64> = markers.iter().map(|m| m.opacity).collect();
        assert_eq!(opacities, vec![0.4, 0.85, 0.4]);
    }

    #[test]
    fn test_nan_positions_are_zeroed() {
        let (xs, _) = scales();
        let flat = LinearScale::new(&LinearScaleConfig {
            domain: (f64::NAN, 1.0),
            range: (0.0, 100.0),
            ..Default::default()
        });
        let marker = project_point(&point("a", 1.0, 1.0, None), &xs, &flat, &projector(), 1.0);
        assert!(!marker.transform.translate.1.is_nan());
    }

    #[test]
    fn test_labels() {
        let (xs, ys) = scales();
        let measurer = ApproximateTextMeasurer::new();
        let mut data = ScatterData {
            points: vec![point("Seattle", 5.0, 5.0, None)],
            category_column: Some(ColumnMetadata::new("City", Role::Category)),
            ..Default::default()
        };
        data.settings.category_labels.show = true;

        let labels = layout_labels(
            &data,
            &xs,
            &ys,
            &projector(),
            Viewport::new(200.0, 100.0),
            &measurer,
            &ChartConfig::default(),
        )
        .unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].text, "Seattle");
        assert_approx_eq!(f64, labels[0].anchor.0, 100.0);
        assert_approx_eq!(f64, labels[0].anchor.1, 50.0 - (6.0 + 8.0));
        assert_approx_eq!(f32, labels[0].font_size, 12.0);

        let narrow = layout_labels(
            &data,
            &xs,
            &ys,
            &projector(),
            Viewport::new(20.0, 100.0),
            &measurer,
            &ChartConfig::default(),
        )
        .unwrap();
        assert!(narrow[0].text.ends_with("..."));

        data.category_column = None;
        let none = layout_labels(
            &data,
            &xs,
            &ys,
            &projector(),
            Viewport::new(200.0, 100.0),
            &measurer,
            &ChartConfig::default(),
        )
        .unwrap();
        assert!(none.is_empty());
    }
}
