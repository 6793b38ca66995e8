use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Report computation was cancelled before completion")]
    Cancelled,

    #[error("Date arithmetic left the representable calendar range: {0}")]
    DateOutOfRange(String),
}
