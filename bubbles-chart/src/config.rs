use bubbles_common::types::Margin;
use bubbles_scales::format::DisplayUnits;
use bubbles_text::types::{FontSpec, FontStyle, FontWeight};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString, VariantNames};

use crate::error::BubblesChartError;

pub const DEFAULT_FONT_FAMILY: &str = "helvetica, arial, sans-serif";

/// Layout constants shared by every stage of a render pass.
///
/// Built once with `Default` and handed to each component by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Margin every render pass starts from
    pub default_margin: Margin,
    /// Left margin every render pass starts from
    pub default_left_margin: f64,
    /// Fraction of the viewport that axis labels may claim on one side
    pub max_margin_factor: f64,
    /// Cap on margin solver iterations per pass
    pub max_iterations: usize,
    /// Padding next to the Y tick labels
    pub axis_side: f64,
    /// Padding on the side carrying the Y axis line, or a Y title
    pub second_axis_side: f64,
    /// Padding below the X tick labels
    pub x_max_offset: f64,
    /// Extra room below the X tick labels for the X title
    pub additional_x_max_offset: f64,
    /// How far the first and last X labels may hang past the plot edges
    pub max_label_overflow: f64,
    /// Let X tick labels that do not fit wrap onto several lines
    pub word_break_labels: bool,

    pub default_radius: f64,
    pub min_size_area: f64,
    pub max_size_area: f64,
    /// Area of the chart the size-area bounds are tuned for (300 x 300)
    pub reference_area: f64,

    /// Magnitudes allowed for forced axis bounds
    pub translate_envelope: (f64, f64),
    /// Axis domain used when there are no points
    pub default_domain: (f64, f64),

    pub crosshair_text_offset: f64,
    pub crosshair_precision: f64,
    pub crosshair_decimals: i32,

    /// Gap between a bubble and its category label
    pub label_margin: f64,
    pub label_offset_divisors: (f64, f64),
    pub default_opacity: f64,
    pub dimmed_opacity: f64,

    pub axis_font: FontSpec,
    pub axis_title_offset: f64,

    /// Transition length in milliseconds for markers that persist between passes
    pub animation_duration: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            default_margin: Margin::new(8.0, 0.0, 25.0, 0.0),
            default_left_margin: 1.0,
            max_margin_factor: 0.25,
            max_iterations: 2,
            axis_side: 10.0,
            second_axis_side: 20.0,
            x_max_offset: 12.0,
            additional_x_max_offset: 18.0,
            max_label_overflow: 35.0,
            word_break_labels: true,
            default_radius: 6.0,
            min_size_area: 200.0,
            max_size_area: 3000.0,
            reference_area: 90_000.0,
            translate_envelope: (1e-25, 1e25),
            default_domain: (0.0, 10.0),
            crosshair_text_offset: 5.0,
            crosshair_precision: 1e-5,
            crosshair_decimals: 2,
            label_margin: 8.0,
            label_offset_divisors: (2.0, 1.8),
            default_opacity: 0.85,
            dimmed_opacity: 0.4,
            axis_font: FontSpec {
                family: DEFAULT_FONT_FAMILY.to_string(),
                size: 11.0,
                weight: FontWeight::default(),
                style: FontStyle::default(),
            },
            axis_title_offset: 2.0,
            animation_duration: 0.0,
        }
    }
}

impl ChartConfig {
    pub fn with_animation_duration(mut self, duration: f64) -> Self {
        self.animation_duration = duration.max(0.0);
        self
    }

    pub fn with_axis_font(mut self, font: FontSpec) -> Self {
        self.axis_font = font;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }
}

/// User-facing chart settings.
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScatterSettings {
    pub data_point: DataPointSettings,
    pub fill_point: FillPointSettings,
    pub outline: OutlineSettings,
    pub crosshair: CrosshairSettings,
    pub category_labels: CategoryLabelsSettings,
    pub backdrop: BackdropSettings,
    pub legend: LegendSettings,
    pub category_axis: AxisSettings,
    pub value_axis: AxisSettings,
}

impl ScatterSettings {
    pub fn from_json(json: &str) -> Result<Self, BubblesChartError> {
        serde_json::from_str(json).map_err(|e| BubblesChartError::InvalidSettings(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataPointSettings {
    pub default_color: String,
    pub stroke_width: f64,
}

impl Default for DataPointSettings {
    fn default() -> Self {
        Self {
            default_color: "#01b8aa".to_string(),
            stroke_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FillPointSettings {
    pub show: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutlineSettings {
    pub show: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrosshairSettings {
    pub show: bool,
    pub color: String,
}

impl Default for CrosshairSettings {
    fn default() -> Self {
        Self {
            show: false,
            color: "#000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryLabelsSettings {
    pub show: bool,
    pub color: String,
    /// Font size in points
    pub font_size: f32,
}

impl CategoryLabelsSettings {
    pub fn font_size_px(&self) -> f32 {
        self.font_size * 4.0 / 3.0
    }
}

impl Default for CategoryLabelsSettings {
    fn default() -> Self {
        Self {
            show: false,
            color: "#777777".to_string(),
            font_size: 9.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackdropSettings {
    pub show: bool,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegendSettings {
    pub show: bool,
    pub show_title: bool,
    pub title_text: Option<String>,
}

impl Default for LegendSettings {
    fn default() -> Self {
        Self {
            show: true,
            show_title: true,
            title_text: None,
        }
    }
}

/// Side of the plot the Y axis is drawn on
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AxisPosition {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisSettings {
    pub show: bool,
    pub show_axis_title: bool,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub display_units: DisplayUnits,
    /// Only consulted for the value (Y) axis
    pub position: AxisPosition,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            show: true,
            show_axis_title: true,
            start: None,
            end: None,
            display_units: DisplayUnits::Auto,
            position: AxisPosition::Left,
        }
    }
}
