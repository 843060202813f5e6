use css_color_parser::Color;
use indexmap::IndexMap;

/// Source of per-series colors
pub trait ColorPalette {
    /// Color for a series, stable for the lifetime of the palette
    fn color_for_series(&mut self, key: &str) -> String;
}

pub const DEFAULT_COLORS: [&str; 8] = [
    "#01b8aa", "#374649", "#fd625e", "#f2c80f", "#5f6b6d", "#8ad4eb", "#fe9666", "#a66999",
];

/// Cycles through a fixed color list in order of first request
#[derive(Debug, Clone)]
pub struct DefaultPalette {
    colors: Vec<String>,
    assigned: IndexMap<String, String>,
}

impl Default for DefaultPalette {
    fn default() -> Self {
        Self::new(DEFAULT_COLORS.iter().map(|c| c.to_string()).collect())
    }
}

impl DefaultPalette {
    pub fn new(colors: Vec<String>) -> Self {
        Self {
            colors,
            assigned: IndexMap::new(),
        }
    }
}

impl ColorPalette for DefaultPalette {
    fn color_for_series(&mut self, key: &str) -> String {
        if let Some(color) = self.assigned.get(key) {
            return color.clone();
        }
        let color = match self.colors.len() {
            0 => DEFAULT_COLORS[0].to_string(),
            n => self.colors[self.assigned.len() % n].clone(),
        };
        self.assigned.insert(key.to_string(), color.clone());
        color
    }
}

/// Parse any CSS color and re-emit it as `#rrggbb`
pub fn normalize(color: &str) -> Option<String> {
    color
        .trim()
        .parse::<Color>()
        .ok()
        .map(|c| to_hex(c.r, c.g, c.b))
}

/// A darker shade of `color`, scaling each channel by 0.7.
///
/// Unparsable colors are returned unchanged.
pub fn darken(color: &str) -> String {
    match color.trim().parse::<Color>() {
        Ok(c) => {
            let scale = |v: u8| (v as f64 * 0.7).round().clamp(0.0, 255.0) as u8;
            to_hex(scale(c.r), scale(c.g), scale(c.b))
        }
        Err(_) => color.to_string(),
    }
}

fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}
