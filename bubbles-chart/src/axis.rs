use bubbles_common::types::ChartLayout;
use bubbles_scales::error::BubblesScaleError;
use bubbles_scales::format::{DisplayUnits, TickFormatter};
use bubbles_scales::linear::{ContinuousScale, LinearScale, LinearScaleConfig};
use bubbles_text::measurement::{TextMeasurementConfig, TextMeasurer};
use bubbles_text::types::FontSpec;
use serde::Serialize;

use crate::config::{AxisPosition, ChartConfig};
use crate::error::BubblesChartError;

/// Inputs for building one axis
#[derive(Debug, Clone, PartialEq)]
pub struct AxisOptions {
    /// Length of the axis in pixels
    pub pixel_span: f64,
    /// Observed extent of the data along this axis
    pub data_domain: (f64, f64),
    /// User or data supplied bounds that replace the observed ones
    pub forced_domain: (Option<f64>, Option<f64>),
    /// Vertical axes map the domain onto `[span, 0]`
    pub vertical: bool,
    pub display_units: DisplayUnits,
    /// Values are milliseconds since the Unix epoch
    pub is_date_time: bool,
    pub axis_label: Option<String>,
}

/// A solved axis: its scale, ticks and label layout flags
#[derive(Debug, Clone, PartialEq)]
pub struct AxisProperties {
    pub scale: LinearScale,
    pub tick_values: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub axis_label: Option<String>,
    pub is_date_time: bool,
    pub will_labels_fit: bool,
    pub will_labels_word_break: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub value: f64,
    /// Offset along the axis from the plotting area origin
    pub position: f64,
    pub label: String,
}

impl AxisProperties {
    pub fn domain(&self) -> (f64, f64) {
        self.scale.domain()
    }

    pub fn ticks(&self) -> Vec<AxisTick> {
        self.tick_values
            .iter()
            .zip(self.tick_labels.iter())
            .map(|(value, label)| AxisTick {
                value: *value,
                position: defined(self.scale.scale(*value)),
                label: label.clone(),
            })
            .collect()
    }

    /// Set the label layout flags for a horizontal axis of `width` pixels
    pub fn with_label_flags(
        mut self,
        width: f64,
        allow_word_break: bool,
        measurer: &dyn TextMeasurer,
        font: &FontSpec,
    ) -> Self {
        self.will_labels_fit = will_labels_fit(&self, width, measurer, font);
        self.will_labels_word_break =
            !self.will_labels_fit && allow_word_break && will_labels_word_break(&self, width, measurer, font);
        self
    }
}

/// Replace NaN with zero so that degenerate scales never emit NaN coordinates
pub(crate) fn defined(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

pub fn recommended_tick_count(pixel_span: f64, vertical: bool) -> usize {
    let (small, medium) = if vertical { (150.0, 300.0) } else { (300.0, 500.0) };
    if pixel_span < small {
        3
    } else if pixel_span < medium {
        5
    } else {
        8
    }
}

/// Overlay the forced bounds on the data domain. A forced pair that would
/// invert the domain is ignored.
pub fn combine_domain(forced: (Option<f64>, Option<f64>), data: (f64, f64)) -> (f64, f64) {
    let combined = (forced.0.unwrap_or(data.0), forced.1.unwrap_or(data.1));
    if combined.0 > combined.1 {
        data
    } else {
        combined
    }
}

/// Clamp the magnitude of a non-zero value into `envelope`, keeping its sign
pub fn optimize_translate_value(value: f64, envelope: (f64, f64)) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    value.signum() * value.abs().clamp(envelope.0, envelope.1)
}

pub fn create_axis(options: &AxisOptions, config: &ChartConfig) -> Result<AxisProperties, BubblesChartError> {
    let tick_count = recommended_tick_count(options.pixel_span, options.vertical);
    let forced = options.forced_domain;
    let (mut d0, mut d1) = combine_domain(forced, options.data_domain);
    d0 = optimize_translate_value(d0, config.translate_envelope);
    d1 = optimize_translate_value(d1, config.translate_envelope);
    if d0 == d1 {
        d0 -= 1.0;
        d1 += 1.0;
    }

    let span = options.pixel_span.max(0.0);
    let range = if options.vertical { (span, 0.0) } else { (0.0, span) };
    let nice = (forced.0.is_none() && forced.1.is_none()).then_some(tick_count);
    let scale = LinearScale::try_new(&LinearScaleConfig {
        domain: (d0, d1),
        range,
        clamp: false,
        nice,
    })?;

    let tick_values = scale.ticks(Some(tick_count));
    let numeric = TickFormatter::numeric(scale.domain(), scale.tick_step(Some(tick_count)), options.display_units);
    let tick_labels = if options.is_date_time {
        tick_values
            .iter()
            .map(|value| date_label(*value, &numeric))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        numeric.format_all(&tick_values)?
    };

    Ok(AxisProperties {
        scale,
        tick_values,
        tick_labels,
        axis_label: options.axis_label.clone(),
        is_date_time: options.is_date_time,
        will_labels_fit: false,
        will_labels_word_break: false,
    })
}

/// Date label for a tick, or its numeric label when the timestamp is out of
/// the calendar's range
fn date_label(value: f64, numeric: &TickFormatter) -> Result<String, BubblesScaleError> {
    TickFormatter::Date.format(value).or_else(|err| {
        tracing::debug!(%err, "formatting date tick as a number");
        numeric.format(value)
    })
}

/// Width available to each X tick label
pub fn label_max_width(axis: &AxisProperties, width: f64) -> f64 {
    match axis.tick_values.len() {
        0 => width.max(1.0),
        n => (width / n as f64).max(1.0),
    }
}

/// True when every tick label fits in its share of the axis
pub fn will_labels_fit(axis: &AxisProperties, width: f64, measurer: &dyn TextMeasurer, font: &FontSpec) -> bool {
    if axis.tick_labels.is_empty() {
        return false;
    }
    let max_width = label_max_width(axis, width);
    axis.tick_labels
        .iter()
        .all(|label| measurer.measure_width(&TextMeasurementConfig::new(label, font)) as f64 <= max_width)
}

/// True when every label that overflows its share can be broken at whitespace
pub fn will_labels_word_break(
    axis: &AxisProperties,
    width: f64,
    measurer: &dyn TextMeasurer,
    font: &FontSpec,
) -> bool {
    let max_width = label_max_width(axis, width);
    !axis.tick_labels.is_empty()
        && axis
            .tick_labels
            .iter()
            .filter(|label| measurer.measure_width(&TextMeasurementConfig::new(label, font)) as f64 > max_width)
            .all(|label| label.trim().contains(char::is_whitespace))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub text: String,
    /// Anchor in viewport coordinates; the text is centered on it
    pub position: (f64, f64),
    /// Degrees, clockwise
    pub rotation: f64,
}

/// Place the axis titles in the margins, ellipsized to the plot's extent
pub fn layout_axis_titles(
    layout: &ChartLayout,
    x_label: Option<&str>,
    y_label: Option<&str>,
    y_position: AxisPosition,
    measurer: &dyn TextMeasurer,
    config: &ChartConfig,
) -> (Option<AxisTitle>, Option<AxisTitle>) {
    let viewport = layout.viewport();
    let margin = layout.margin();
    let inner = layout.inner();
    let font = &config.axis_font;
    let font_size = font.size as f64;
    let fit = |text: &str, max_width: f64| {
        measurer.ellipsize(&TextMeasurementConfig::new(text, font), max_width as f32)
    };

    let x_title = x_label.map(|text| AxisTitle {
        text: fit(text, inner.width),
        position: (
            margin.left + inner.width / 2.0,
            viewport.height - font_size - config.axis_title_offset,
        ),
        rotation: 0.0,
    });

    let y_title = y_label.map(|text| {
        let x = match y_position {
            AxisPosition::Left => 0.0,
            AxisPosition::Right => viewport.width - font_size,
        };
        AxisTitle {
            text: fit(text, inner.height),
            position: (x, margin.top + (viewport.height - margin.top) / 2.0),
            rotation: -90.0,
        }
    });

    (x_title, y_title)
}
