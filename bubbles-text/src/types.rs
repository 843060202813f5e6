use ordered_float::OrderedFloat;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::VariantNames;

use crate::error::BubblesTextError;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, VariantNames)]
#[cfg_attr(feature = "serde", serde(untagged))]
#[strum(serialize_all = "snake_case")]
pub enum FontWeight {
    Name(FontWeightNameSpec),
    Number(f32),
}

impl std::hash::Hash for FontWeight {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Name(spec) => spec.hash(state),
            Self::Number(num) => OrderedFloat::from(*num).hash(state),
        }
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::Name(FontWeightNameSpec::Normal)
    }
}

impl FromStr for FontWeight {
    type Err = BubblesTextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Name(FontWeightNameSpec::Normal)),
            "bold" => Ok(Self::Name(FontWeightNameSpec::Bold)),
            other => other
                .parse::<f32>()
                .map(Self::Number)
                .map_err(|_| BubblesTextError::UnknownFontWeight(s.to_string())),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, Clone, Copy, PartialEq, Hash, VariantNames)]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "snake_case")]
pub enum FontWeightNameSpec {
    #[default]
    Normal,
    Bold,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, Clone, Copy, PartialEq, Hash, VariantNames)]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Owned font description. `family` may be a CSS-style fallback list.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl FontSpec {
    pub fn try_new(family: impl Into<String>, size: f32) -> Result<Self, BubblesTextError> {
        if !(size > 0.0 && size.is_finite()) {
            return Err(BubblesTextError::InvalidFontSize(size));
        }
        Ok(Self {
            family: family.into(),
            size,
            weight: FontWeight::default(),
            style: FontStyle::default(),
        })
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_weight_parse() {
        assert_eq!(
            "Bold".parse::<FontWeight>().unwrap(),
            FontWeight::Name(FontWeightNameSpec::Bold)
        );
        assert_eq!("600".parse::<FontWeight>().unwrap(), FontWeight::Number(600.0));
        assert!("heavy-ish".parse::<FontWeight>().is_err());
    }

    #[test]
    fn test_font_spec() {
        let font = FontSpec::try_new("\"Segoe UI\", helvetica, sans-serif", 11.0).unwrap();
        assert_eq!(font.family, "\"Segoe UI\", helvetica, sans-serif");
        assert_eq!(
            FontSpec::try_new("arial", 0.0).unwrap_err(),
            BubblesTextError::InvalidFontSize(0.0)
        );
        assert_eq!(
            font.with_weight(FontWeight::Number(700.0)).weight,
            FontWeight::Number(700.0)
        );
    }
}
