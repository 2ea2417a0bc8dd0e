use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown chart type: {0}")]
    UnknownChartType(String),
}
