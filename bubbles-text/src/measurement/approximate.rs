use unicode_segmentation::UnicodeSegmentation;

use super::{TextBounds, TextMeasurementConfig, TextMeasurer};
use crate::types::{FontWeight, FontWeightNameSpec};

const NARROW: &str = "ilIjtfr!|.,:;'` ";
const WIDE: &str = "mwMW@%";

/// Font-independent text measurer based on per-character width classes.
///
/// Deterministic across platforms. Used for layout tests and headless rendering.
#[derive(Debug, Clone, Default)]
pub struct ApproximateTextMeasurer {}

impl ApproximateTextMeasurer {
    pub fn new() -> Self {
        Self {}
    }

    fn em_width(grapheme: &str) -> f32 {
        let Some(c) = grapheme.chars().next() else {
            return 0.0;
        };
        if NARROW.contains(c) {
            0.3
        } else if WIDE.contains(c) {
            0.85
        } else if c.is_ascii_digit() {
            0.56
        } else if c.is_uppercase() {
            0.65
        } else {
            0.55
        }
    }
}

impl TextMeasurer for ApproximateTextMeasurer {
    fn measure_text_bounds(&self, config: &TextMeasurementConfig) -> TextBounds {
        let size = config.font_size;
        let bold = match config.font_weight {
            FontWeight::Name(FontWeightNameSpec::Bold) => true,
            FontWeight::Number(w) => *w >= 600.0,
            FontWeight::Name(FontWeightNameSpec::Normal) => false,
        };
        let em: f32 = config.text.graphemes(true).map(Self::em_width).sum();
        let width = em * size * if bold { 1.1 } else { 1.0 };

        TextBounds {
            width,
            height: size * 1.2,
            ascent: size * 0.9,
            descent: size * 0.3,
            line_height: size * 1.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FontSpec;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_widths_scale_with_font_size() {
        let measurer = ApproximateTextMeasurer::new();
        let small = FontSpec::try_new("arial", 10.0).unwrap();
        let large = FontSpec::try_new("arial", 20.0).unwrap();

        let w_small = measurer.measure_width(&TextMeasurementConfig::new("100", &small));
        let w_large = measurer.measure_width(&TextMeasurementConfig::new("100", &large));
        assert_approx_eq!(f32, w_small, 16.8, epsilon = 1e-4);
        assert_approx_eq!(f32, w_large, 2.0 * w_small, epsilon = 1e-4);
    }

    #[test]
    fn test_empty_text() {
        let measurer = ApproximateTextMeasurer::new();
        let font = FontSpec::try_new("arial", 11.0).unwrap();
        let bounds = measurer.measure_text_bounds(&TextMeasurementConfig::new("", &font));
        assert_approx_eq!(f32, bounds.width, 0.0);
        assert_approx_eq!(f32, bounds.height, 13.2, epsilon = 1e-4);
        assert_approx_eq!(
            f32,
            measurer.estimate_height(&TextMeasurementConfig::new("", &font)),
            13.2,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_bold_is_wider() {
        let measurer = ApproximateTextMeasurer::new();
        let regular = FontSpec::try_new("arial", 11.0).unwrap();
        let bold = regular.clone().with_weight(FontWeight::Name(FontWeightNameSpec::Bold));
        let text = "Revenue";
        assert!(
            measurer.measure_width(&TextMeasurementConfig::new(text, &bold))
                > measurer.measure_width(&TextMeasurementConfig::new(text, &regular))
        );
    }
}
