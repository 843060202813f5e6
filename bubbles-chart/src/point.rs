use std::collections::HashMap;
use std::fmt;

use bubbles_common::shape::{ShapeSelector, SymbolShape};
use bubbles_common::types::ValueRange;
use bubbles_scales::format::TickFormatter;
use serde::Serialize;

use crate::color::{darken, normalize, ColorPalette};
use crate::config::ScatterSettings;
use crate::data::{Categorical, CellValue, ColumnMetadata, DataView, RoleIndices, SeriesGroup};

/// Label used for a null category or series name
pub const BLANK_LABEL: &str = "(Blank)";

/// Identity of a point, stable across updates with the same input
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PointKey {
    pub category: String,
    pub series: String,
    /// Disambiguates repeated category/series pairs
    pub occurrence: usize,
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.category, self.series)?;
        if self.occurrence > 0 {
            write!(f, "#{}", self.occurrence)?;
        }
        Ok(())
    }
}

/// Per-row axis bound overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RangeOverrides {
    pub x_start: Option<f64>,
    pub x_end: Option<f64>,
    pub y_start: Option<f64>,
    pub y_end: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub key: PointKey,
    pub category_index: usize,
    /// Raw category value, formatted only when a label is drawn
    pub category: CellValue,
    pub x: f64,
    pub y: f64,
    /// Raw size value, only meaningful against `ScatterData::size_range`
    pub size: Option<f64>,
    /// `None` draws an outline only
    pub fill: Option<String>,
    pub stroke: String,
    pub stroke_width: f64,
    pub shape: SymbolShape,
    pub rotation: f64,
    pub image_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub overrides: RangeOverrides,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub label: String,
    pub color: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LegendData {
    pub title: Option<String>,
    pub items: Vec<LegendItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AxisLabels {
    pub x: Option<String>,
    pub y: Option<String>,
}

/// Everything a render pass needs from one data update
#[derive(Debug, Clone, Default)]
pub struct ScatterData {
    pub points: Vec<ScatterPoint>,
    /// Observed size range. `None` when no size column is bound.
    pub size_range: Option<ValueRange>,
    pub x_column: Option<ColumnMetadata>,
    pub y_column: Option<ColumnMetadata>,
    /// Main category column. `None` when there is none.
    pub category_column: Option<ColumnMetadata>,
    pub axis_labels: AxisLabels,
    pub legend: LegendData,
    pub has_dynamic_series: bool,
    /// Settings with the first point's overrides applied
    pub settings: ScatterSettings,
}

impl ScatterData {
    /// Mark the points whose key is in `keys` as selected and all others as not
    pub fn apply_selection(&mut self, keys: &[PointKey]) {
        for point in self.points.iter_mut() {
            point.selected = keys.contains(&point.key);
        }
    }

    pub fn has_selection(&self) -> bool {
        self.points.iter().any(|p| p.selected)
    }

    /// Category label for a point, or `None` when there is no category column
    pub fn category_label(&self, point: &ScatterPoint) -> Option<String> {
        let column = self.category_column.as_ref()?;
        Some(format_cell(&point.category, column.is_date_time))
    }
}

fn format_cell(value: &CellValue, is_date_time: bool) -> String {
    match value {
        CellValue::Null => BLANK_LABEL.to_string(),
        CellValue::Number(n) if is_date_time => TickFormatter::Date
            .format(*n)
            .unwrap_or_else(|_| n.to_string()),
        CellValue::Text(s) if s.is_empty() => BLANK_LABEL.to_string(),
        other => other.key(),
    }
}

/// Turn a data view into points, legend data and effective settings.
///
/// Missing metadata or columns produce an empty point list, never an error.
pub fn extract(
    view: &DataView,
    settings: &ScatterSettings,
    palette: &mut dyn ColorPalette,
) -> ScatterData {
    let mut data = ScatterData {
        settings: settings.clone(),
        ..Default::default()
    };
    let (Some(_), Some(categorical)) = (&view.metadata, &view.categorical) else {
        return data;
    };

    let roles = RoleIndices::resolve(categorical);
    let first_group = categorical.groups.first();
    let measure_source =
        |index: Option<usize>| first_group.and_then(|g| g.column(index)).map(|c| c.source.clone());
    data.x_column = measure_source(roles.x);
    data.y_column = measure_source(roles.y);
    data.has_dynamic_series = categorical.series_source.is_some();

    let main_category = roles
        .category
        .and_then(|i| categorical.categories.get(i))
        .filter(|c| c.values.is_some());
    data.category_column = main_category.map(|c| c.source.clone());

    if roles.size.is_some() {
        data.size_range = Some(ValueRange::from_values(
            categorical
                .groups
                .iter()
                .filter_map(|g| g.column(roles.size))
                .flat_map(|c| c.values.iter().flatten())
                .filter_map(CellValue::as_number),
        ));
    }

    let has_min_size = data
        .size_range
        .and_then(|r| r.min)
        .is_some_and(|min| min != 0.0);

    data.points = extract_points(categorical, &roles, settings, has_min_size, palette);

    data.legend = legend_data(categorical, &roles, settings, palette);
    data.axis_labels = AxisLabels {
        x: data
            .x_column
            .as_ref()
            .filter(|_| settings.category_axis.show_axis_title)
            .map(|c| c.display_name.clone()),
        y: data
            .y_column
            .as_ref()
            .filter(|_| settings.value_axis.show_axis_title)
            .map(|c| c.display_name.clone()),
    };

    // only the first point's overrides apply, and they apply chart-wide
    if let Some(first) = data.points.first() {
        if let Some(url) = &first.backdrop_url {
            data.settings.backdrop.show = true;
            data.settings.backdrop.url = Some(url.clone());
        }
        let overrides = first.overrides;
        let x_axis = &mut data.settings.category_axis;
        x_axis.start = overrides.x_start.or(x_axis.start);
        x_axis.end = overrides.x_end.or(x_axis.end);
        let y_axis = &mut data.settings.value_axis;
        y_axis.start = overrides.y_start.or(y_axis.start);
        y_axis.end = overrides.y_end.or(y_axis.end);
    }

    data
}

fn extract_points(
    categorical: &Categorical,
    roles: &RoleIndices,
    settings: &ScatterSettings,
    has_min_size: bool,
    palette: &mut dyn ColorPalette,
) -> Vec<ScatterPoint> {
    let category_column = roles.category.and_then(|i| categorical.categories.get(i));
    let category_values: Vec<CellValue> = category_column
        .and_then(|c| c.values.clone())
        .unwrap_or_else(|| vec![CellValue::Null]);
    let category_cell = |role: Option<usize>, index: usize| {
        role.and_then(|r| categorical.categories.get(r))
            .and_then(|c| c.value(index))
    };
    let dynamic = categorical.series_source.is_some();

    let mut points = Vec::new();
    let mut occurrences: HashMap<(String, String), usize> = HashMap::new();
    let mut dropped = 0usize;

    for (category_index, category) in category_values.iter().enumerate() {
        for group in categorical.groups.iter() {
            let number = |role: Option<usize>| {
                group
                    .column(role)
                    .and_then(|c| c.number(category_index))
            };
            let (Some(x), Some(y)) = (number(roles.x), number(roles.y)) else {
                dropped += 1;
                continue;
            };

            let series = group.name.key();
            let base_color = if dynamic {
                series_color(group, palette)
            } else {
                category_column
                    .and_then(|c| c.row_objects(category_index))
                    .and_then(|o| o.fill.clone())
                    .unwrap_or_else(|| settings.data_point.default_color.clone())
            };
            let color = match category_cell(roles.color_fill, category_index).and_then(|v| v.as_text()) {
                Some(raw) => normalize(raw).unwrap_or_else(|| {
                    tracing::warn!(value = raw, "ignoring unparsable color fill");
                    base_color.clone()
                }),
                None => base_color,
            };
            let stroke = if settings.outline.show {
                darken(&color)
            } else {
                color.clone()
            };
            let size = number(roles.size);
            // a size range above zero fills the points that carry a size
            let fill =
                (settings.fill_point.show || (has_min_size && size.is_some())).then_some(color);

            let shape_selector = group
                .column(roles.shape)
                .and_then(|c| c.value(category_index))
                .and_then(|v| match v {
                    CellValue::Number(n) => Some(ShapeSelector::Index(*n)),
                    CellValue::Text(s) => Some(ShapeSelector::Name(s.clone())),
                    _ => None,
                });

            let category_key = category.key();
            let occurrence = occurrences
                .entry((category_key.clone(), series.clone()))
                .or_insert(0);
            let key = PointKey {
                category: category_key,
                series,
                occurrence: *occurrence,
            };
            *occurrence += 1;

            points.push(ScatterPoint {
                key,
                category_index,
                category: category.clone(),
                x,
                y,
                size,
                fill,
                stroke,
                stroke_width: settings.data_point.stroke_width,
                shape: SymbolShape::resolve(shape_selector.as_ref()),
                rotation: number(roles.rotation).unwrap_or(0.0),
                image_url: category_cell(roles.image, category_index)
                    .and_then(|v| v.as_text())
                    .map(str::to_string),
                backdrop_url: category_cell(roles.backdrop, category_index)
                    .and_then(|v| v.as_text())
                    .map(str::to_string),
                overrides: RangeOverrides {
                    x_start: number(roles.x_start),
                    x_end: number(roles.x_end),
                    y_start: number(roles.y_start),
                    y_end: number(roles.y_end),
                },
                selected: false,
            });
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, kept = points.len(), "dropped rows without x or y");
    }
    points
}

fn series_color(group: &SeriesGroup, palette: &mut dyn ColorPalette) -> String {
    group
        .fill
        .clone()
        .unwrap_or_else(|| palette.color_for_series(&group.name.key()))
}

fn legend_data(
    categorical: &Categorical,
    roles: &RoleIndices,
    settings: &ScatterSettings,
    palette: &mut dyn ColorPalette,
) -> LegendData {
    let items = match &categorical.series_source {
        Some(_) => categorical
            .groups
            .iter()
            .map(|group| LegendItem {
                label: format_cell(&group.name, false),
                color: series_color(group, palette),
                key: group.name.key(),
            })
            .collect(),
        None => Vec::new(),
    };

    let fallback_title = categorical
        .series_source
        .as_ref()
        .map(|s| s.display_name.clone())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            roles
                .category
                .and_then(|i| categorical.categories.get(i))
                .map(|c| c.source.display_name.clone())
        });
    let title = settings
        .legend
        .title_text
        .clone()
        .filter(|t| !t.is_empty())
        .or(fallback_title)
        .filter(|_| settings.legend.show_title);

    LegendData { title, items }
}
