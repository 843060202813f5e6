use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BubblesTextError {
    #[error("Invalid font size: {0}")]
    InvalidFontSize(f32),

    #[error("Unknown font weight: `{0}`")]
    UnknownFontWeight(String),
}
