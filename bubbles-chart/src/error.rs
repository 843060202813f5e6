use bubbles_scales::error::BubblesScaleError;
use bubbles_text::error::BubblesTextError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BubblesChartError {
    #[error("Invalid settings: `{0}`")]
    InvalidSettings(String),

    #[error("Invalid data: `{0}`")]
    InvalidData(String),

    #[error("Scale error: `{0}`")]
    ScaleError(#[from] BubblesScaleError),

    #[error("Text error: `{0}`")]
    TextError(#[from] BubblesTextError),
}
