//! Pointer readout over the plotting area.
//!
//! Pointer positions arrive in client pixels. When the surface is drawn at a
//! different size than its intrinsic size the position is scaled back first,
//! then both axis scales are inverted to produce the `(x, y)` readout.

use bubbles_common::types::Viewport;
use bubbles_scales::linear::{ContinuousScale, LinearScale};
use serde::Serialize;

use crate::config::ChartConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Enter,
    Leave,
    Move {
        /// Pointer position relative to the plotting area, in client pixels
        position: (f64, f64),
        /// Size the plotting surface is displayed at
        client_size: Viewport,
        /// Size the plotting surface is laid out at
        intrinsic_size: Viewport,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Line {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrosshairView {
    pub visible: bool,
    pub horizontal: Line,
    pub vertical: Line,
    pub label_position: (f64, f64),
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Crosshair {
    enabled: bool,
    inner: Viewport,
    x_scale: LinearScale,
    y_scale: LinearScale,
    text_offset: f64,
    precision: f64,
    decimals: i32,
    view: CrosshairView,
}

impl Crosshair {
    pub fn new(
        enabled: bool,
        inner: Viewport,
        x_scale: LinearScale,
        y_scale: LinearScale,
        config: &ChartConfig,
    ) -> Self {
        Self {
            enabled,
            inner,
            x_scale,
            y_scale,
            text_offset: config.crosshair_text_offset,
            precision: config.crosshair_precision,
            decimals: config.crosshair_decimals,
            view: CrosshairView::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn view(&self) -> &CrosshairView {
        &self.view
    }

    /// Update the view for one pointer event. A disabled crosshair ignores
    /// every event and stays hidden.
    pub fn handle(&mut self, event: &PointerEvent) -> &CrosshairView {
        if !self.enabled {
            return &self.view;
        }
        match *event {
            PointerEvent::Enter => self.view.visible = true,
            PointerEvent::Leave => self.view.visible = false,
            PointerEvent::Move {
                position,
                client_size,
                intrinsic_size,
            } => {
                let (x, y) = self.to_local(position, client_size, intrinsic_size);
                self.view.horizontal = Line {
                    start: (0.0, y),
                    end: (self.inner.width, y),
                };
                self.view.vertical = Line {
                    start: (x, 0.0),
                    end: (x, self.inner.height),
                };
                self.view.label_position = (x + self.text_offset, y - self.text_offset);
                self.view.text = self.readout((x, y));
            }
        }
        &self.view
    }

    /// Divide out the display scale on each axis where it differs from 1
    pub fn to_local(&self, position: (f64, f64), client: Viewport, intrinsic: Viewport) -> (f64, f64) {
        let unscale = |value: f64, client: f64, intrinsic: f64| {
            if intrinsic <= 0.0 {
                return value;
            }
            let ratio = client / intrinsic;
            if ratio > 0.0 && (ratio - 1.0).abs() > self.precision {
                value / ratio
            } else {
                value
            }
        };
        (
            unscale(position.0, client.width, intrinsic.width),
            unscale(position.1, client.height, intrinsic.height),
        )
    }

    /// Data-space coordinates under a local position, rounded for display
    pub fn invert(&self, local: (f64, f64)) -> (f64, f64) {
        (
            round_to(self.x_scale.invert(local.0), self.decimals),
            round_to(self.y_scale.invert(local.1), self.decimals),
        )
    }

    pub fn readout(&self, local: (f64, f64)) -> String {
        let (x, y) = self.invert(local);
        format!("({x}, {y})")
    }
}

/// Round half up, the way the readout has always been rounded
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor + 0.5).floor() / factor;
    // avoid printing "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
