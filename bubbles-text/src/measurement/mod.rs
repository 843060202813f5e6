use unicode_segmentation::UnicodeSegmentation;

use crate::types::{FontSpec, FontStyle, FontWeight};

pub mod approximate;

#[cfg(feature = "cosmic-text")]
extern crate lazy_static;

#[cfg(feature = "cosmic-text")]
pub mod cosmic;

pub const ELLIPSIS: &str = "...";

/// Core trait for text measurement functionality
pub trait TextMeasurer: Send + Sync {
    /// Measures the bounding dimensions for a text string with given configuration
    fn measure_text_bounds(&self, config: &TextMeasurementConfig) -> TextBounds;

    fn measure_width(&self, config: &TextMeasurementConfig) -> f32 {
        self.measure_text_bounds(config).width
    }

    fn measure_height(&self, config: &TextMeasurementConfig) -> f32 {
        self.measure_text_bounds(config).height
    }

    /// Height of a single line in this font, independent of the text content
    fn estimate_height(&self, config: &TextMeasurementConfig) -> f32 {
        self.measure_text_bounds(&config.with_text("Mg")).line_height
    }

    /// Truncate `config.text` at a grapheme boundary so that it, plus an
    /// ellipsis, fits in `max_width`
    fn ellipsize(&self, config: &TextMeasurementConfig, max_width: f32) -> String {
        if self.measure_width(config) <= max_width {
            return config.text.to_string();
        }

        let graphemes = config.text.graphemes(true).collect::<Vec<_>>();
        let fits = |n: usize| {
            let candidate = format!("{}{ELLIPSIS}", graphemes[..n].concat());
            self.measure_width(&config.with_text(&candidate)) <= max_width
        };

        // largest prefix length that still fits
        let (mut lo, mut hi) = (0, graphemes.len());
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            if fits(mid) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        format!("{}{ELLIPSIS}", graphemes[..lo].concat())
    }

    /// Greedy word wrap into at most `max_lines` lines of `max_width`.
    ///
    /// Overflow is folded into the last line and ellipsized.
    fn split_by_width(
        &self,
        config: &TextMeasurementConfig,
        max_width: f32,
        max_lines: usize,
    ) -> Vec<String> {
        let max_lines = max_lines.max(1);
        let mut lines: Vec<String> = Vec::new();
        let mut current = String::new();

        for word in config.text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if current.is_empty()
                || self.measure_width(&config.with_text(&candidate)) <= max_width
                || lines.len() + 1 == max_lines
            {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }

        lines
            .into_iter()
            .map(|line| self.ellipsize(&config.with_text(&line), max_width))
            .collect()
    }
}

/// Configuration needed for text measurement
#[derive(Debug, Clone)]
pub struct TextMeasurementConfig<'a> {
    /// The text string to measure
    pub text: &'a str,
    /// Font family name, or a comma separated fallback list
    pub font: &'a str,
    /// Font size in pixels
    pub font_size: f32,
    pub font_weight: &'a FontWeight,
    pub font_style: &'a FontStyle,
}

impl<'a> TextMeasurementConfig<'a> {
    pub fn new(text: &'a str, font: &'a FontSpec) -> Self {
        Self {
            text,
            font: &font.family,
            font_size: font.size,
            font_weight: &font.weight,
            font_style: &font.style,
        }
    }

    /// Same font, different text
    pub fn with_text<'b>(&self, text: &'b str) -> TextMeasurementConfig<'b>
    where
        'a: 'b,
    {
        TextMeasurementConfig {
            text,
            font: self.font,
            font_size: self.font_size,
            font_weight: self.font_weight,
            font_style: self.font_style,
        }
    }
}

/// Results from text measurement
#[derive(Debug, Clone, PartialEq)]
pub struct TextBounds {
    /// Total width of the text
    pub width: f32,
    /// Total height from top to bottom
    pub height: f32,
    /// Distance from top to baseline
    pub ascent: f32,
    /// Distance from bottom to baseline
    pub descent: f32,
    /// Distance from top to where the top of the next line would be
    pub line_height: f32,
}

impl TextBounds {
    pub fn empty() -> Self {
        TextBounds {
            width: 0.0,
            height: 10.0,
            ascent: 10.0 * 0.8,
            descent: 10.0 * 0.2,
            line_height: 10.0 * 1.2,
        }
    }
}

#[cfg(all(feature = "cosmic-text", not(target_arch = "wasm32")))]
pub fn default_text_measurer() -> impl TextMeasurer {
    crate::measurement::cosmic::CosmicTextMeasurer::new()
}

#[cfg(not(feature = "cosmic-text"))]
pub fn default_text_measurer() -> impl TextMeasurer {
    crate::measurement::approximate::ApproximateTextMeasurer::new()
}

#[cfg(test)]
mod tests {
    use super::approximate::ApproximateTextMeasurer;
    use super::*;
    use crate::types::FontSpec;

    fn font() -> FontSpec {
        FontSpec::try_new("helvetica, arial, sans-serif", 10.0).unwrap()
    }

    #[test]
    fn test_ellipsize_fits_unchanged() {
        let font = font();
        let measurer = ApproximateTextMeasurer::new();
        let config = TextMeasurementConfig::new("Seattle", &font);
        assert_eq!(measurer.ellipsize(&config, 500.0), "Seattle");
    }

    #[test]
    fn test_ellipsize_truncates() {
        let font = font();
        let measurer = ApproximateTextMeasurer::new();
        let config = TextMeasurementConfig::new("Washington State", &font);
        let max_width = measurer.measure_width(&config) / 2.0;
        let out = measurer.ellipsize(&config, max_width);

        assert!(out.ends_with(ELLIPSIS));
        assert!(out.len() < "Washington State".len() + ELLIPSIS.len());
        assert!(measurer.measure_width(&config.with_text(&out)) <= max_width);
    }

    #[test]
    fn test_ellipsize_too_narrow() {
        let font = font();
        let measurer = ApproximateTextMeasurer::new();
        let config = TextMeasurementConfig::new("Seattle", &font);
        assert_eq!(measurer.ellipsize(&config, 1.0), ELLIPSIS);
    }

    #[test]
    fn test_split_by_width() {
        let font = font();
        let measurer = ApproximateTextMeasurer::new();
        let config = TextMeasurementConfig::new("North America East", &font);
        let one_word = measurer.measure_width(&config.with_text("America")) + 1.0;

        let lines = measurer.split_by_width(&config, one_word, 5);
        assert_eq!(lines, vec!["North", "America", "East"]);

        let lines = measurer.split_by_width(&config, one_word, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "North");
        assert!(lines[1].ends_with(ELLIPSIS));
    }

    #[test]
    fn test_split_empty_text() {
        let font = font();
        let measurer = ApproximateTextMeasurer::new();
        let config = TextMeasurementConfig::new("", &font);
        assert_eq!(measurer.split_by_width(&config, 20.0, 3), vec![String::new()]);
    }
}
