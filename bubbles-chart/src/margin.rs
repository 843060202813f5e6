//! Fits the chart margins to the rendered tick labels.
//!
//! Margins depend on tick label extents, while the ticks depend on the
//! plotting area the margins leave. The solver alternates the two a bounded
//! number of times and stops early once the Y tick count is stable.

use bubbles_common::types::{ChartLayout, Margin, Viewport};
use bubbles_text::measurement::{TextMeasurementConfig, TextMeasurer};

use crate::axis::{create_axis, label_max_width, AxisOptions, AxisProperties};
use crate::config::{AxisPosition, ChartConfig};
use crate::error::BubblesChartError;
use crate::point::ScatterData;

/// Room needed around the plot by the tick labels alone
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickLabelMargins {
    pub y_left: f64,
    pub y_right: f64,
    pub x_max: f64,
}

/// Bounds on how much of the viewport the labels may take
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginLimits {
    pub left_right: f64,
    pub bottom: f64,
}

impl MarginLimits {
    pub fn new(viewport: Viewport, config: &ChartConfig) -> Self {
        Self {
            left_right: viewport.width * config.max_margin_factor,
            bottom: config
                .default_margin
                .bottom
                .max((viewport.height * config.max_margin_factor).ceil()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisPair {
    pub x: AxisProperties,
    pub y: AxisProperties,
}

/// Outcome of one margin fitting pass
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedLayout {
    pub layout: ChartLayout,
    pub axes: AxisPair,
    pub iterations: usize,
    pub converged: bool,
}

/// Measure the tick labels of both axes and derive the margins they need
#[allow(clippy::too_many_arguments)]
pub fn tick_label_margins(
    inner_width: f64,
    limits: MarginLimits,
    axes: &AxisPair,
    y_position: AxisPosition,
    render_x: bool,
    render_y: bool,
    measurer: &dyn TextMeasurer,
    config: &ChartConfig,
) -> TickLabelMargins {
    let font = &config.axis_font;
    let width_of = |text: &str| measurer.measure_width(&TextMeasurementConfig::new(text, font)) as f64;

    let y_width = if render_y {
        axes.y
            .tick_labels
            .iter()
            .map(|l| width_of(l))
            .fold(0.0, f64::max)
    } else {
        0.0
    };

    let (mut overflow_left, mut overflow_right, mut x_max) = (0.0, 0.0, 0.0);
    if render_x && !axes.x.tick_labels.is_empty() {
        let text_height = measurer.estimate_height(&TextMeasurementConfig::new("", font)) as f64;
        let lines = if axes.x.will_labels_word_break {
            let max_lines = (limits.bottom / text_height).floor().max(1.0) as usize;
            let max_width = label_max_width(&axes.x, inner_width) as f32;
            axes.x
                .tick_labels
                .iter()
                .map(|l| {
                    measurer
                        .split_by_width(&TextMeasurementConfig::new(l, font), max_width, max_lines)
                        .len()
                })
                .max()
                .unwrap_or(1)
        } else {
            1
        };
        x_max = lines as f64 * text_height;

        let ticks = axes.x.ticks();
        if let (Some(first), Some(last)) = (ticks.first(), ticks.last()) {
            overflow_left = width_of(&first.label) / 2.0 - first.position;
            overflow_right = width_of(&last.label) / 2.0 - (inner_width - last.position);
        }
    }
    let cap = |v: f64| v.clamp(0.0, config.max_label_overflow);
    let (overflow_left, overflow_right) = (cap(overflow_left), cap(overflow_right));

    let (y_left, y_right) = match y_position {
        AxisPosition::Left => (overflow_left.max(y_width), overflow_right),
        AxisPosition::Right => (overflow_left, overflow_right.max(y_width)),
    };

    TickLabelMargins {
        y_left: y_left.min(limits.left_right).ceil(),
        y_right: y_right.min(limits.left_right).ceil(),
        x_max: x_max.ceil().min(limits.bottom),
    }
}

/// Builds both axes for a layout and fits the margins around them
pub struct MarginSolver<'a> {
    pub data: &'a ScatterData,
    pub measurer: &'a dyn TextMeasurer,
    pub config: &'a ChartConfig,
}

impl<'a> MarginSolver<'a> {
    pub fn new(data: &'a ScatterData, measurer: &'a dyn TextMeasurer, config: &'a ChartConfig) -> Self {
        Self {
            data,
            measurer,
            config,
        }
    }

    /// Observed x and y extents, or the default domain when there are no points
    pub fn data_domains(&self) -> ((f64, f64), (f64, f64)) {
        let points = &self.data.points;
        if points.is_empty() {
            return (self.config.default_domain, self.config.default_domain);
        }
        (
            extent(points.iter().map(|p| p.x)),
            extent(points.iter().map(|p| p.y)),
        )
    }

    /// Both axes for the plotting area `layout` leaves
    pub fn calculate_axes(&self, layout: &ChartLayout) -> Result<AxisPair, BubblesChartError> {
        let settings = &self.data.settings;
        let inner = layout.inner();
        let (x_domain, y_domain) = self.data_domains();

        let x = create_axis(
            &AxisOptions {
                pixel_span: inner.width,
                data_domain: x_domain,
                forced_domain: (settings.category_axis.start, settings.category_axis.end),
                vertical: false,
                display_units: settings.category_axis.display_units,
                is_date_time: self.data.x_column.as_ref().is_some_and(|c| c.is_date_time),
                axis_label: self.data.axis_labels.x.clone(),
            },
            self.config,
        )?
        .with_label_flags(
            inner.width,
            self.config.word_break_labels,
            self.measurer,
            &self.config.axis_font,
        );

        let y = create_axis(
            &AxisOptions {
                pixel_span: inner.height,
                data_domain: y_domain,
                forced_domain: (settings.value_axis.start, settings.value_axis.end),
                vertical: true,
                display_units: settings.value_axis.display_units,
                is_date_time: self.data.y_column.as_ref().is_some_and(|c| c.is_date_time),
                axis_label: self.data.axis_labels.y.clone(),
            },
            self.config,
        )?;

        Ok(AxisPair { x, y })
    }

    /// Whether each axis is drawn at all
    pub fn render_flags(&self, axes: &AxisPair) -> (bool, bool) {
        let settings = &self.data.settings;
        (
            settings.category_axis.show && !axes.x.tick_values.is_empty(),
            settings.value_axis.show && !axes.y.tick_values.is_empty(),
        )
    }

    /// Alternate label measurement and axis construction until the Y tick
    /// count is stable or the iteration cap is reached
    pub fn fit(
        &self,
        mut layout: ChartLayout,
        mut axes: AxisPair,
        limits: MarginLimits,
        render: (bool, bool),
    ) -> Result<SolvedLayout, BubblesChartError> {
        let (render_x, render_y) = render;
        let y_position = self.data.settings.value_axis.position;
        let y_on_right = y_position == AxisPosition::Right;
        let config = self.config;

        let mut iterations = 0;
        let mut converged = false;
        while !converged && iterations < config.max_iterations {
            iterations += 1;

            let margins = tick_label_margins(
                layout.inner().width,
                limits,
                &axes,
                y_position,
                render_x,
                render_y,
                self.measurer,
                config,
            );

            // the main side carries the Y axis
            let (mut main_side, mut second_side) = if y_on_right {
                (margins.y_right, margins.y_left)
            } else {
                (margins.y_left, margins.y_right)
            };
            main_side += config.axis_side;
            second_side += config.axis_side;
            let mut x_max = margins.x_max + config.x_max_offset;

            if render_y {
                if y_on_right {
                    second_side += config.second_axis_side;
                } else {
                    main_side += config.second_axis_side;
                }
            }
            if axes.x.axis_label.is_some() {
                x_max += config.additional_x_max_offset;
            }
            if axes.y.axis_label.is_some() {
                main_side += config.second_axis_side;
            }

            let (left, right) = if y_on_right {
                (second_side, main_side)
            } else {
                (main_side, second_side)
            };
            let margin = Margin::new(layout.margin().top, right, x_max, left);
            layout = layout.with_margin(margin);

            let previous_y_ticks = axes.y.tick_values.len();
            axes = self.calculate_axes(&layout)?;
            converged = axes.y.tick_values.len() == previous_y_ticks;

            tracing::debug!(
                iteration = iterations,
                top = margin.top,
                right = margin.right,
                bottom = margin.bottom,
                left = margin.left,
                y_ticks = axes.y.tick_values.len(),
                converged,
                "margin solver iteration"
            );
        }

        Ok(SolvedLayout {
            layout,
            axes,
            iterations,
            converged,
        })
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Shrink the viewport so the plotting area takes the image's aspect ratio
pub fn fit_viewport_to_image(layout: &ChartLayout, image_width: f64, image_height: f64) -> Viewport {
    let viewport = layout.viewport();
    let inner = layout.inner();
    if !(image_width > 0.0 && image_height > 0.0) {
        return viewport;
    }
    if image_width * inner.height < inner.width * image_height {
        let delta = inner.width - inner.height * image_width / image_height;
        Viewport::new(viewport.width - delta, viewport.height)
    } else {
        let delta = inner.height - inner.width * image_height / image_width;
        Viewport::new(viewport.width, viewport.height - delta)
    }
}
