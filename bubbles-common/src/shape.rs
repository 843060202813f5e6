use lyon_path::geom::{point, vector, Angle, ArcFlags};
use lyon_path::builder::SvgPathBuilder;
use lyon_path::Path;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::str::FromStr;
use strum::{AsRefStr, EnumCount, EnumIter, EnumString, IntoEnumIterator, VariantNames};

use crate::lyon::path_to_svg;

/// Marker shapes, in catalog order.
///
/// Every shape is generated from a target *area* in square pixels (not a
/// radius) and centered on the origin.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    EnumCount,
    AsRefStr,
    VariantNames,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SymbolShape {
    #[default]
    Circle,
    Cross,
    Diamond,
    Square,
    TriangleUp,
    TriangleDown,
    Star,
    Hexagon,
    X,
    #[cfg_attr(feature = "serde", serde(rename = "uparrow", alias = "up-arrow"))]
    #[strum(to_string = "uparrow", serialize = "up-arrow")]
    UpArrow,
    #[cfg_attr(feature = "serde", serde(rename = "downarrow", alias = "down-arrow"))]
    #[strum(to_string = "downarrow", serialize = "down-arrow")]
    DownArrow,
}

/// Per-point shape request: either a shape name or a position in the catalog
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeSelector {
    Index(f64),
    Name(String),
}

impl SymbolShape {
    /// Resolve an optional selector to a shape, falling back to the default
    /// shape for anything that is absent, unknown or out of range
    pub fn resolve(selector: Option<&ShapeSelector>) -> Self {
        match selector {
            None => Self::default(),
            Some(ShapeSelector::Name(name)) => Self::from_str(name.trim()).unwrap_or_default(),
            Some(ShapeSelector::Index(index)) => Self::from_index(*index),
        }
    }

    /// Catalog lookup by `floor(index)`
    pub fn from_index(index: f64) -> Self {
        let index = index.floor();
        if !(index >= 0.0 && index < Self::COUNT as f64) {
            return Self::default();
        }
        Self::iter().nth(index as usize).unwrap_or_default()
    }

    /// Build the outline of this shape enclosing approximately `area` square pixels
    pub fn build_path(&self, area: f32) -> Path {
        let size = if area.is_finite() { area.max(0.0) } else { 0.0 };
        let sqrt3 = 3.0f32.sqrt();
        let tan30 = (PI / 6.0).tan();

        match self {
            SymbolShape::Circle => {
                let r = (size / PI).sqrt();
                let radii = vector(r, r);
                let flags = ArcFlags {
                    large_arc: true,
                    sweep: true,
                };
                let mut builder = Path::builder().with_svg();
                builder.move_to(point(0.0, r));
                builder.arc_to(radii, Angle::zero(), flags, point(0.0, -r));
                builder.arc_to(radii, Angle::zero(), flags, point(0.0, r));
                builder.close();
                builder.build()
            }
            SymbolShape::Cross => {
                let r = (size / 5.0).sqrt() / 2.0;
                polygon(&[
                    (-3.0 * r, -r),
                    (-r, -r),
                    (-r, -3.0 * r),
                    (r, -3.0 * r),
                    (r, -r),
                    (3.0 * r, -r),
                    (3.0 * r, r),
                    (r, r),
                    (r, 3.0 * r),
                    (-r, 3.0 * r),
                    (-r, r),
                    (-3.0 * r, r),
                ])
            }
            SymbolShape::Diamond => {
                let ry = (size / (2.0 * tan30)).sqrt();
                let rx = ry * tan30;
                polygon(&[(0.0, -ry), (rx, 0.0), (0.0, ry), (-rx, 0.0)])
            }
            SymbolShape::Square => {
                let r = size.sqrt() / 2.0;
                polygon(&[(-r, -r), (r, -r), (r, r), (-r, r)])
            }
            SymbolShape::TriangleUp => {
                let rx = (size / sqrt3).sqrt();
                let ry = rx * sqrt3 / 2.0;
                polygon(&[(0.0, -ry), (rx, ry), (-rx, ry)])
            }
            SymbolShape::TriangleDown => {
                let rx = (size / sqrt3).sqrt();
                let ry = rx * sqrt3 / 2.0;
                polygon(&[(0.0, ry), (rx, -ry), (-rx, -ry)])
            }
            SymbolShape::Star => {
                // ten triangles of area outer * inner * sin(36°) / 2, inner = outer / √5
                let angle = PI / 5.0;
                let sqrt5 = 5f32.sqrt();
                let outer = (size / (sqrt5 * angle.sin())).sqrt();
                let inner = outer / sqrt5;
                let points = (0..10)
                    .map(|i| {
                        let r = if i % 2 == 0 { outer } else { inner };
                        let theta = i as f32 * angle;
                        (theta.cos() * r, theta.sin() * r)
                    })
                    .collect::<Vec<_>>();
                polygon(&points)
            }
            SymbolShape::Hexagon => {
                let r = (size / (6.0 * sqrt3)).sqrt();
                let r2 = (size / (2.0 * sqrt3)).sqrt();
                polygon(&[
                    (0.0, 2.0 * r),
                    (-r2, r),
                    (-r2, -r),
                    (0.0, -2.0 * r),
                    (r2, -r),
                    (r2, r),
                ])
            }
            SymbolShape::X => {
                let r = (size / 10.0).sqrt();
                polygon(&[
                    (0.0, r),
                    (-r, 2.0 * r),
                    (-2.0 * r, r),
                    (-r, 0.0),
                    (-2.0 * r, -r),
                    (-r, -2.0 * r),
                    (0.0, -r),
                    (r, -2.0 * r),
                    (2.0 * r, -r),
                    (r, 0.0),
                    (2.0 * r, r),
                    (r, 2.0 * r),
                ])
            }
            SymbolShape::UpArrow => {
                let r = (size / 12.0).sqrt();
                polygon(&[
                    (r, 3.0 * r),
                    (-r, 3.0 * r),
                    (-r, -r),
                    (-2.0 * r, -r),
                    (0.0, -3.0 * r),
                    (2.0 * r, -r),
                    (r, -r),
                ])
            }
            SymbolShape::DownArrow => {
                let r = (size / 12.0).sqrt();
                polygon(&[
                    (0.0, 3.0 * r),
                    (-2.0 * r, r),
                    (-r, r),
                    (-r, -3.0 * r),
                    (r, -3.0 * r),
                    (r, r),
                    (2.0 * r, r),
                ])
            }
        }
    }

    /// SVG path data for this shape at the given area
    pub fn svg_path(&self, area: f32) -> String {
        path_to_svg(&self.build_path(area))
    }
}

fn polygon(points: &[(f32, f32)]) -> Path {
    let mut builder = Path::builder().with_svg();
    let mut iter = points.iter();
    if let Some((x, y)) = iter.next() {
        builder.move_to(point(*x, *y));
        for (x, y) in iter {
            builder.line_to(point(*x, *y));
        }
        builder.close();
    }
    builder.build()
}
