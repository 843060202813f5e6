use bubbles_common::types::{ChartLayout, Margin, Viewport};
use bubbles_text::measurement::{default_text_measurer, TextMeasurer};
use indexmap::IndexSet;
use serde::Serialize;

use crate::axis::{layout_axis_titles, AxisProperties, AxisTick, AxisTitle};
use crate::color::{ColorPalette, DefaultPalette};
use crate::config::{ChartConfig, ScatterSettings};
use crate::crosshair::{Crosshair, CrosshairView, PointerEvent};
use crate::data::DataView;
use crate::error::BubblesChartError;
use crate::join::MarkerFrame;
use crate::margin::{fit_viewport_to_image, MarginLimits, MarginSolver, SolvedLayout};
use crate::marker::{draw_markers, layout_labels, MarkerLabel};
use crate::point::{extract, LegendData, PointKey, ScatterData};
use crate::size::SizeProjector;

/// Ask the host to load a backdrop image and report its size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackdropRequest {
    pub url: String,
}

/// Backdrop image placed behind the plotting area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Backdrop {
    pub url: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct BackdropImage {
    url: String,
    width: f64,
    height: f64,
}

/// Declarative output of one render pass, in inner viewport coordinates
/// except for the axis titles
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    pub layout: ChartLayout,
    pub x_axis: AxisProperties,
    pub y_axis: AxisProperties,
    pub render_x_axis: bool,
    pub render_y_axis: bool,
    /// Empty when the axis is not rendered
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
    pub x_title: Option<AxisTitle>,
    pub y_title: Option<AxisTitle>,
    pub markers: MarkerFrame,
    pub labels: Vec<MarkerLabel>,
    pub backdrop: Option<Backdrop>,
    pub backdrop_request: Option<BackdropRequest>,
    /// `None` when the legend is hidden
    pub legend: Option<LegendData>,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The plotting area has no extent; nothing is drawn
    Skipped,
    Rendered(Box<RenderPass>),
}

/// Stateful scatter chart: holds the extracted data between updates, the
/// keys of the last frame and the loaded backdrop size
pub struct ScatterChart {
    config: ChartConfig,
    measurer: Box<dyn TextMeasurer>,
    palette: Box<dyn ColorPalette>,
    data: ScatterData,
    viewport: Viewport,
    legend_size: Viewport,
    backdrop_image: Option<BackdropImage>,
    last_backdrop: Option<String>,
    previous_keys: IndexSet<PointKey>,
    crosshair: Option<Crosshair>,
}

impl ScatterChart {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            measurer: Box::new(default_text_measurer()),
            palette: Box::new(DefaultPalette::default()),
            data: ScatterData::default(),
            viewport: Viewport::default(),
            legend_size: Viewport::default(),
            backdrop_image: None,
            last_backdrop: None,
            previous_keys: IndexSet::new(),
            crosshair: None,
        }
    }

    pub fn with_measurer(mut self, measurer: Box<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn with_palette(mut self, palette: Box<dyn ColorPalette>) -> Self {
        self.palette = palette;
        self
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn data(&self) -> &ScatterData {
        &self.data
    }

    /// Re-extract the points from `view` and render.
    ///
    /// `legend_size` is the space the host's legend occupies and is taken
    /// off the viewport before layout.
    pub fn update(
        &mut self,
        view: &DataView,
        settings: &ScatterSettings,
        viewport: Viewport,
        legend_size: Viewport,
    ) -> Result<RenderOutcome, BubblesChartError> {
        self.data = extract(view, settings, self.palette.as_mut());
        self.viewport = viewport;
        self.legend_size = legend_size;
        self.render()
    }

    /// Mark the given points selected and dim the rest on the next render
    pub fn apply_selection(&mut self, keys: &[PointKey]) {
        self.data.apply_selection(keys);
    }

    /// Record a loaded backdrop's size. Returns `true` when the image differs
    /// from the one last rendered, in which case the host renders again.
    pub fn on_backdrop_loaded(&mut self, url: &str, width: f64, height: f64) -> bool {
        self.backdrop_image = Some(BackdropImage {
            url: url.to_string(),
            width,
            height,
        });
        if self.last_backdrop.as_deref() == Some(url) {
            return false;
        }
        self.last_backdrop = Some(url.to_string());
        true
    }

    /// Route a pointer event to the crosshair of the last render pass
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Option<&CrosshairView> {
        let crosshair = self.crosshair.as_mut()?;
        if !crosshair.is_enabled() {
            return None;
        }
        Some(crosshair.handle(event))
    }

    /// Lay out and draw the current data
    #[tracing::instrument(skip_all)]
    pub fn render(&mut self) -> Result<RenderOutcome, BubblesChartError> {
        let config = &self.config;
        let data = &self.data;
        let settings = &data.settings;

        let viewport = self
            .viewport
            .shrink(self.legend_size.width, self.legend_size.height);
        let limits = MarginLimits::new(viewport, config);
        let margin = Margin {
            bottom: limits.bottom,
            left: config.default_left_margin,
            ..config.default_margin
        };
        let layout = ChartLayout::new(viewport, margin);
        if layout.inner().is_empty() {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "skipping render of an empty plotting area"
            );
            self.crosshair = None;
            return Ok(RenderOutcome::Skipped);
        }

        let solver = MarginSolver::new(data, self.measurer.as_ref(), config);
        let axes = solver.calculate_axes(&layout)?;
        let render = solver.render_flags(&axes);
        let mut solved = solver.fit(layout, axes, limits, render)?;

        let backdrop_url = settings
            .backdrop
            .url
            .as_deref()
            .filter(|url| settings.backdrop.show && !url.is_empty());
        let mut backdrop_request = None;
        if let Some(url) = backdrop_url {
            match self.backdrop_image.as_ref().filter(|image| image.url == url) {
                Some(image) => {
                    let fitted = fit_viewport_to_image(&solved.layout, image.width, image.height);
                    let SolvedLayout {
                        layout,
                        axes,
                        iterations,
                        converged,
                    } = solved;
                    let refit = solver.fit(layout.with_viewport(fitted), axes, limits, render)?;
                    solved = SolvedLayout {
                        iterations: iterations + refit.iterations,
                        converged: converged && refit.converged,
                        ..refit
                    };
                }
                None => {
                    backdrop_request = Some(BackdropRequest {
                        url: url.to_string(),
                    })
                }
            }
        }

        let layout = solved.layout;
        let inner = layout.inner();
        let (render_x, render_y) = render;
        let (x_axis, y_axis) = (solved.axes.x, solved.axes.y);

        let (x_title, y_title) = layout_axis_titles(
            &layout,
            x_axis.axis_label.as_deref().filter(|_| render_x),
            y_axis.axis_label.as_deref().filter(|_| render_y),
            settings.value_axis.position,
            self.measurer.as_ref(),
            config,
        );

        let projector = SizeProjector::new(data.size_range.as_ref(), layout.viewport(), config);
        let markers = draw_markers(data, &x_axis.scale, &y_axis.scale, &projector, config);
        let markers = MarkerFrame::join(&self.previous_keys, markers, config.animation_duration);

        let labels = if settings.category_labels.show {
            layout_labels(
                data,
                &x_axis.scale,
                &y_axis.scale,
                &projector,
                inner,
                self.measurer.as_ref(),
                config,
            )?
        } else {
            Vec::new()
        };

        let backdrop = backdrop_url.map(|url| Backdrop {
            url: url.to_string(),
            x: 0.0,
            y: 0.0,
            width: inner.width,
            height: inner.height,
        });

        let crosshair = Crosshair::new(
            settings.crosshair.show,
            inner,
            x_axis.scale.clone(),
            y_axis.scale.clone(),
            config,
        );

        let pass = RenderPass {
            layout,
            x_ticks: if render_x { x_axis.ticks() } else { Vec::new() },
            y_ticks: if render_y { y_axis.ticks() } else { Vec::new() },
            x_axis,
            y_axis,
            render_x_axis: render_x,
            render_y_axis: render_y,
            x_title,
            y_title,
            markers,
            labels,
            backdrop,
            backdrop_request,
            legend: settings.legend.show.then(|| data.legend.clone()),
            iterations: solved.iterations,
            converged: solved.converged,
        };

        self.previous_keys = pass.markers.keys();
        self.crosshair = Some(crosshair);
        Ok(RenderOutcome::Rendered(Box::new(pass)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CategoryColumn, Categorical, CellValue, ColumnMetadata, Role, SeriesGroup, ValueColumn};
    use bubbles_text::measurement::approximate::ApproximateTextMeasurer;

    fn view() -> DataView {
        DataView::from_categorical(Categorical {
            categories: vec![CategoryColumn::new(
                ColumnMetadata::new("City", Role::Category),
                vec![
                    CellValue::Text("a".to_string()),
                    CellValue::Text("b".to_string()),
                ],
            )],
            series_source: None,
            groups: vec![SeriesGroup::new(vec![
                ValueColumn::new(
                    ColumnMetadata::new("X", Role::X),
                    vec![CellValue::Number(1.0), CellValue::Number(2.0)],
                ),
                ValueColumn::new(
                    ColumnMetadata::new("Y", Role::Y),
                    vec![CellValue::Number(3.0), CellValue::Number(4.0)],
                ),
            ])],
        })
    }

    fn chart() -> ScatterChart {
        ScatterChart::new(ChartConfig::default()).with_measurer(Box::new(ApproximateTextMeasurer::new()))
    }

    fn rendered(outcome: RenderOutcome) -> RenderPass {
        match outcome {
            RenderOutcome::Rendered(pass) => *pass,
            RenderOutcome::Skipped => panic!("expected a render pass"),
        }
    }

    #[test]
    fn test_legend_size_is_subtracted() {
        let mut chart = chart();
        let pass = rendered(
            chart
                .update(
                    &view(),
                    &ScatterSettings::default(),
                    Viewport::new(500.0, 400.0),
                    Viewport::new(0.0, 40.0),
                )
                .unwrap(),
        );
        assert_eq!(pass.layout.viewport(), Viewport::new(500.0, 360.0));
        assert!(pass.legend.is_some());
    }

    #[test]
    fn test_legend_swallowing_viewport_skips() {
        let mut chart = chart();
        let outcome = chart
            .update(
                &view(),
                &ScatterSettings::default(),
                Viewport::new(500.0, 400.0),
                Viewport::new(500.0, 0.0),
            )
            .unwrap();
        assert_eq!(outcome, RenderOutcome::Skipped);
        assert!(chart.handle_pointer(&PointerEvent::Enter).is_none());
    }

    #[test]
    fn test_hidden_axes_have_no_ticks_or_titles() {
        let mut settings = ScatterSettings::default();
        settings.category_axis.show = false;
        let mut chart = chart();
        let pass = rendered(
            chart
                .update(&view(), &settings, Viewport::new(500.0, 400.0), Viewport::default())
                .unwrap(),
        );
        assert!(!pass.render_x_axis);
        assert!(pass.x_ticks.is_empty());
        assert!(pass.x_title.is_none());
        assert!(pass.render_y_axis);
        assert!(!pass.y_ticks.is_empty());
        assert_eq!(pass.y_title.map(|t| t.text), Some("Y".to_string()));
    }

    #[test]
    fn test_category_labels_follow_setting() {
        let mut settings = ScatterSettings::default();
        let mut chart = chart();
        let pass = rendered(
            chart
                .update(&view(), &settings, Viewport::new(500.0, 400.0), Viewport::default())
                .unwrap(),
        );
        assert!(pass.labels.is_empty());

        settings.category_labels.show = true;
        let pass = rendered(
            chart
                .update(&view(), &settings, Viewport::new(500.0, 400.0), Viewport::default())
                .unwrap(),
        );
        let texts: Vec<&str> = pass.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_selection_dims_other_markers() {
        let mut chart = chart();
        chart
            .update(
                &view(),
                &ScatterSettings::default(),
                Viewport::new(500.0, 400.0),
                Viewport::default(),
            )
            .unwrap();
        let selected = chart.data().points[0].key.clone();
        chart.apply_selection(&[selected.clone()]);
        let pass = rendered(chart.render().unwrap());
        for marker in pass.markers.markers.iter() {
            let expected = if marker.key == selected { 0.85 } else { 0.4 };
            assert_eq!(marker.opacity, expected);
        }
    }
}
