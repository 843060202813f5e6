use cosmic_text::{fontdb::Database, Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use std::{collections::HashSet, sync::Mutex};

use super::{TextBounds, TextMeasurementConfig, TextMeasurer};
use crate::types::{FontStyle, FontWeight, FontWeightNameSpec};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref FONT_SYSTEM: Mutex<FontSystem> = Mutex::new(build_font_system());
}

fn build_font_system() -> FontSystem {
    let mut font_system = FontSystem::new();
    setup_default_fonts(font_system.db_mut());
    font_system
}

/// Point the generic families at the first installed candidate
fn setup_default_fonts(fontdb: &mut Database) {
    let installed: HashSet<String> = fontdb
        .faces()
        .flat_map(|face| face.families.iter().map(|(fam, _)| fam.clone()))
        .collect();
    let pick = |candidates: &[&str]| {
        candidates
            .iter()
            .find(|f| installed.contains(**f))
            .map(|f| f.to_string())
    };

    if let Some(family) = pick(&["Helvetica", "Arial", "Liberation Sans"]) {
        fontdb.set_sans_serif_family(family);
    }
    if let Some(family) = pick(&["Times New Roman", "Times", "Liberation Serif"]) {
        fontdb.set_serif_family(family);
    }
    if let Some(family) = pick(&["Courier New", "Courier", "Liberation Mono"]) {
        fontdb.set_monospace_family(family);
    }
}

/// Measures text by shaping it with cosmic-text against system fonts
#[derive(Debug, Default)]
pub struct CosmicTextMeasurer {}

impl CosmicTextMeasurer {
    pub fn new() -> Self {
        Self {}
    }
}

impl TextMeasurer for CosmicTextMeasurer {
    fn measure_text_bounds(&self, config: &TextMeasurementConfig) -> TextBounds {
        let mut font_system = FONT_SYSTEM
            .lock()
            .expect("Failed to acquire lock on FONT_SYSTEM");

        let buffer = shape_single_line(config, &mut font_system);
        bounds_of(&buffer)
    }
}

fn bounds_of(buffer: &Buffer) -> TextBounds {
    let mut runs = buffer.layout_runs().peekable();
    if runs.peek().is_none() {
        return TextBounds::empty();
    }

    let (mut ascent, mut descent, mut line_height) = (0.0f32, 0.0f32, 0.0f32);
    let (mut min_x, mut max_x) = (f32::MAX, f32::MIN);
    for run in runs {
        let run_ascent = run.line_y - run.line_top;
        ascent = ascent.max(run_ascent);
        descent = descent.max(run.line_height - run_ascent);
        line_height = line_height.max(run.line_height);
        for glyph in run.glyphs {
            min_x = min_x.min(glyph.x);
            max_x = max_x.max(glyph.x + glyph.w);
        }
    }

    TextBounds {
        width: if min_x == f32::MAX { 0.0 } else { max_x - min_x },
        height: ascent + descent,
        ascent,
        descent,
        line_height,
    }
}

fn shape_single_line(config: &TextMeasurementConfig, font_system: &mut FontSystem) -> Buffer {
    let primary = config
        .font
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
        .find(|f| !f.is_empty())
        .unwrap_or("sans-serif");

    let mut attrs = Attrs::new();
    attrs.family = match primary.to_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans serif" | "sans-serif" | "helvetica" | "arial" => Family::SansSerif,
        "monospace" => Family::Monospace,
        _ => Family::Name(primary),
    };
    attrs.weight = match config.font_weight {
        FontWeight::Name(FontWeightNameSpec::Bold) => cosmic_text::Weight::BOLD,
        FontWeight::Name(FontWeightNameSpec::Normal) => cosmic_text::Weight::NORMAL,
        FontWeight::Number(w) => cosmic_text::Weight(*w as u16),
    };
    attrs.style = match config.font_style {
        FontStyle::Normal => cosmic_text::Style::Normal,
        FontStyle::Italic => cosmic_text::Style::Italic,
    };

    let metrics = Metrics::new(config.font_size, config.font_size * 1.2);
    let mut buffer = Buffer::new(font_system, metrics);
    buffer.set_text(font_system, config.text, attrs, Shaping::Advanced);
    // wide enough that axis labels never wrap
    buffer.set_size(font_system, Some(4096.0), Some(512.0));
    buffer.shape_until_scroll(font_system, false);
    buffer
}
