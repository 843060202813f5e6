//! Role-annotated tabular input.
//!
//! Category-type roles live in `Categorical::categories`, one value per
//! category row. Measure roles live in each `SeriesGroup`, one column per
//! role with one value per category row.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, VariantNames};

use crate::error::BubblesChartError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    Category,
    Series,
    X,
    Y,
    Size,
    Gradient,
    ColorFill,
    Shape,
    Image,
    Rotation,
    Backdrop,
    XStart,
    XEnd,
    YStart,
    YEnd,
}

/// One table cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Numeric reading of the cell. Null, non-finite and non-numeric values
    /// are absent.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Null => return None,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Non-empty text content of the cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Stable string used to build point and series keys
    pub fn key(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub display_name: String,
    pub query_name: Option<String>,
    pub roles: Vec<Role>,
    /// Values are milliseconds since the Unix epoch
    pub is_date_time: bool,
}

impl ColumnMetadata {
    pub fn new(display_name: impl Into<String>, role: Role) -> Self {
        Self {
            display_name: display_name.into(),
            roles: vec![role],
            ..Default::default()
        }
    }

    pub fn with_date_time(mut self, is_date_time: bool) -> Self {
        self.is_date_time = is_date_time;
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Per-row formatting overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RowObjects {
    pub fill: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryColumn {
    pub source: ColumnMetadata,
    pub values: Option<Vec<CellValue>>,
    pub objects: Option<Vec<Option<RowObjects>>>,
}

impl CategoryColumn {
    pub fn new(source: ColumnMetadata, values: Vec<CellValue>) -> Self {
        Self {
            source,
            values: Some(values),
            objects: None,
        }
    }

    pub fn value(&self, index: usize) -> Option<&CellValue> {
        self.values.as_ref().and_then(|values| values.get(index))
    }

    pub fn row_objects(&self, index: usize) -> Option<&RowObjects> {
        self.objects
            .as_ref()
            .and_then(|objects| objects.get(index))
            .and_then(|o| o.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueColumn {
    pub source: ColumnMetadata,
    pub values: Option<Vec<CellValue>>,
}

impl ValueColumn {
    pub fn new(source: ColumnMetadata, values: Vec<CellValue>) -> Self {
        Self {
            source,
            values: Some(values),
        }
    }

    pub fn value(&self, index: usize) -> Option<&CellValue> {
        self.values.as_ref().and_then(|values| values.get(index))
    }

    pub fn number(&self, index: usize) -> Option<f64> {
        self.value(index).and_then(CellValue::as_number)
    }
}

/// Measure columns for one series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesGroup {
    pub name: CellValue,
    /// Fill color chosen for this series by the user
    pub fill: Option<String>,
    pub values: Vec<ValueColumn>,
}

impl SeriesGroup {
    pub fn new(values: Vec<ValueColumn>) -> Self {
        Self {
            values,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: CellValue) -> Self {
        self.name = name;
        self
    }

    pub fn column(&self, index: Option<usize>) -> Option<&ValueColumn> {
        index.and_then(|i| self.values.get(i))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Categorical {
    pub categories: Vec<CategoryColumn>,
    /// Present exactly when series are dynamic
    pub series_source: Option<ColumnMetadata>,
    pub groups: Vec<SeriesGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataViewMetadata {
    pub columns: Vec<ColumnMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataView {
    pub metadata: Option<DataViewMetadata>,
    pub categorical: Option<Categorical>,
}

impl DataView {
    pub fn from_json(json: &str) -> Result<Self, BubblesChartError> {
        serde_json::from_str(json).map_err(|e| BubblesChartError::InvalidData(e.to_string()))
    }

    /// Build a data view from columns, filling in the metadata from their sources
    pub fn from_categorical(categorical: Categorical) -> Self {
        let mut columns: Vec<ColumnMetadata> = categorical
            .categories
            .iter()
            .map(|c| c.source.clone())
            .collect();
        if let Some(series) = &categorical.series_source {
            columns.push(series.clone());
        }
        if let Some(group) = categorical.groups.first() {
            columns.extend(group.values.iter().map(|v| v.source.clone()));
        }
        Self {
            metadata: Some(DataViewMetadata { columns }),
            categorical: Some(categorical),
        }
    }
}

/// Position of each role's column, `None` when the role is unbound.
///
/// Category-type roles index `Categorical::categories`. Measure roles index
/// the columns of the first series group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleIndices {
    pub category: Option<usize>,
    pub color_fill: Option<usize>,
    pub image: Option<usize>,
    pub backdrop: Option<usize>,
    pub x: Option<usize>,
    pub y: Option<usize>,
    pub size: Option<usize>,
    pub gradient: Option<usize>,
    pub shape: Option<usize>,
    pub rotation: Option<usize>,
    pub x_start: Option<usize>,
    pub x_end: Option<usize>,
    pub y_start: Option<usize>,
    pub y_end: Option<usize>,
}

impl RoleIndices {
    pub fn resolve(categorical: &Categorical) -> Self {
        let category_index = |role: Role| {
            categorical
                .categories
                .iter()
                .position(|c| c.source.has_role(role))
        };
        let measure_index = |role: Role| {
            categorical
                .groups
                .first()
                .and_then(|g| g.values.iter().position(|v| v.source.has_role(role)))
        };

        Self {
            category: category_index(Role::Category),
            color_fill: category_index(Role::ColorFill),
            image: category_index(Role::Image),
            backdrop: category_index(Role::Backdrop),
            x: measure_index(Role::X),
            y: measure_index(Role::Y),
            size: measure_index(Role::Size),
            gradient: measure_index(Role::Gradient),
            shape: measure_index(Role::Shape),
            rotation: measure_index(Role::Rotation),
            x_start: measure_index(Role::XStart),
            x_end: measure_index(Role::XEnd),
            y_start: measure_index(Role::YStart),
            y_end: measure_index(Role::YEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CellValue::Number(2.5), Some(2.5))]
    #[case(CellValue::Number(f64::NAN), None)]
    #[case(CellValue::Number(f64::INFINITY), None)]
    #[case(CellValue::Text("inf".to_string()), None)]
    #[case(CellValue::Text("-Infinity".to_string()), None)]
    #[case(CellValue::Null, None)]
    #[case(CellValue::Text(" 7 ".to_string()), Some(7.0))]
    #[case(CellValue::Text("seven".to_string()), None)]
    #[case(CellValue::Bool(true), Some(1.0))]
    fn test_cell_as_number(#[case] cell: CellValue, #[case] expected: Option<f64>) {
        assert_eq!(cell.as_number(), expected);
    }

    #[test]
    fn test_data_view_json() {
        let view = DataView::from_json(
            r#"{
                "metadata": {"columns": []},
                "categorical": {
                    "categories": [
                        {"source": {"displayName": "City", "roles": ["category"]},
                         "values": ["Oslo", null, 3]}
                    ],
                    "groups": [{
                        "name": null,
                        "values": [
                            {"source": {"displayName": "GDP", "roles": ["x"]}, "values": [1, 2, 3]},
                            {"source": {"displayName": "Pop", "roles": ["y"]}, "values": [4, null, 6]},
                            {"source": {"displayName": "Area", "roles": ["size"]}}
                        ]
                    }]
                }
            }"#,
        )
        .unwrap();

        let categorical = view.categorical.unwrap();
        let categories = &categorical.categories[0];
        assert_eq!(categories.value(0), Some(&CellValue::Text("Oslo".to_string())));
        assert_eq!(categories.value(1), Some(&CellValue::Null));
        assert_eq!(categories.value(2), Some(&CellValue::Number(3.0)));

        let group = &categorical.groups[0];
        assert_eq!(group.values[1].number(1), None);
        assert!(group.values[2].values.is_none());
        assert_eq!(group.values[2].number(0), None);
    }

    #[test]
    fn test_resolve_roles() {
        let categorical = Categorical {
            categories: vec![
                CategoryColumn::new(ColumnMetadata::new("Color", Role::ColorFill), vec![]),
                CategoryColumn::new(ColumnMetadata::new("City", Role::Category), vec![]),
            ],
            series_source: None,
            groups: vec![SeriesGroup::new(vec![
                ValueColumn::new(ColumnMetadata::new("Y", Role::Y), vec![]),
                ValueColumn::new(ColumnMetadata::new("X", Role::X), vec![]),
            ])],
        };
        let indices = RoleIndices::resolve(&categorical);
        assert_eq!(indices.category, Some(1));
        assert_eq!(indices.color_fill, Some(0));
        assert_eq!(indices.x, Some(1));
        assert_eq!(indices.y, Some(0));
        assert_eq!(indices.size, None);
        assert_eq!(indices.image, None);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            DataView::from_json("{\"categorical\": 3}"),
            Err(BubblesChartError::InvalidData(_))
        ));
    }
}
