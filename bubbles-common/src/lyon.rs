use lyon_path::iterator::PathIterator;
use lyon_path::math::Point;
use lyon_path::{Path, PathEvent};
use std::fmt::Write;

const AREA_TOLERANCE: f32 = 0.01;

/// Serialize a path as an SVG path-data string using absolute commands
pub fn path_to_svg(path: &Path) -> String {
    let mut out = String::new();
    for evt in path.iter() {
        // Writing into a String can't fail
        let _ = match evt {
            PathEvent::Begin { at } => write!(out, "M{},{}", at.x, at.y),
            PathEvent::Line { to, .. } => write!(out, "L{},{}", to.x, to.y),
            PathEvent::Quadratic { ctrl, to, .. } => {
                write!(out, "Q{},{} {},{}", ctrl.x, ctrl.y, to.x, to.y)
            }
            PathEvent::Cubic {
                ctrl1, ctrl2, to, ..
            } => write!(
                out,
                "C{},{} {},{} {},{}",
                ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
            ),
            PathEvent::End { close: true, .. } => write!(out, "Z"),
            PathEvent::End { close: false, .. } => Ok(()),
        };
    }
    out
}

/// Enclosed area of a path, summed over its sub-paths.
///
/// Curves are flattened first. Each sub-path is treated as closed.
pub fn path_area(path: &Path) -> f32 {
    let mut total = 0.0;
    let mut subpath = 0.0;
    for evt in path.iter().flattened(AREA_TOLERANCE) {
        match evt {
            PathEvent::Begin { .. } => subpath = 0.0,
            PathEvent::Line { from, to } => subpath += cross(from, to),
            PathEvent::End { last, first, .. } => {
                subpath += cross(last, first);
                total += (subpath / 2.0).abs();
            }
            // flattening only emits lines
            PathEvent::Quadratic { .. } | PathEvent::Cubic { .. } => {}
        }
    }
    total
}

fn cross(a: Point, b: Point) -> f32 {
    a.x * b.y - b.x * a.y
}
