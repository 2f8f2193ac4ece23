use calibration_core::CalibrationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Render error: {0}")]
    Render(String),
}

pub(crate) fn render_err<E: std::fmt::Display>(err: E) -> PlotError {
    PlotError::Render(err.to_string())
}
