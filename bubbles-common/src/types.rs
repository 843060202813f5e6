use ordered_float::OrderedFloat;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Width and height of a drawing surface in pixels
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either side has no extent, in which case nothing can be drawn
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Shrink by another size, never going below zero
    pub fn shrink(&self, width: f64, height: f64) -> Self {
        Self {
            width: (self.width - width).max(0.0),
            height: (self.height - height).max(0.0),
        }
    }
}

impl Hash for Viewport {
    fn hash<H: Hasher>(&self, state: &mut H) {
        OrderedFloat(self.width).hash(state);
        OrderedFloat(self.height).hash(state);
    }
}

/// Space reserved around the plotting area for axes and titles
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

impl Hash for Margin {
    fn hash<H: Hasher>(&self, state: &mut H) {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .for_each(|v| OrderedFloat(*v).hash(state));
    }
}

/// Outer viewport, margin and the inner plotting viewport they imply.
///
/// The inner viewport is derived state. Every constructor and `with_*` method
/// recomputes it from the viewport and margin.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Hash)]
pub struct ChartLayout {
    viewport: Viewport,
    margin: Margin,
    inner: Viewport,
}

impl ChartLayout {
    pub fn new(viewport: Viewport, margin: Margin) -> Self {
        let inner = viewport.shrink(margin.horizontal(), margin.vertical());
        Self {
            viewport,
            margin,
            inner,
        }
    }

    pub fn with_margin(self, margin: Margin) -> Self {
        Self::new(self.viewport, margin)
    }

    pub fn with_viewport(self, viewport: Viewport) -> Self {
        Self::new(viewport, self.margin)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    /// Plotting area: the viewport minus the margin, clamped at zero
    pub fn inner(&self) -> Viewport {
        self.inner
    }
}

/// Closed numeric interval whose bounds may be unknown
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Min and max over the finite values of an iterator
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(Self::default(), |acc, v| Self {
                min: Some(acc.min.map_or(v, |m| m.min(v))),
                max: Some(acc.max.map_or(v, |m| m.max(v))),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() || self.max.is_none()
    }
}
