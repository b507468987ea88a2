use std::path::PathBuf;

use thiserror::Error;

/// The planner's only failure mode: the caller handed it something it cannot
/// plan a spin for. Always detected before any arithmetic happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("no labels to choose from")]
    EmptyLabels,
    #[error("a wheel needs at least one slice")]
    NoSlices,
    #[error("winner index {index} is out of range for {count} slices")]
    WinnerOutOfRange { index: usize, count: usize },
    #[error("spin duration must be positive, got {0}")]
    NonPositiveDuration(f64),
    #[error("reference angle must be finite, got {0}")]
    NonFiniteAngle(f64),
}

/// Application-level errors surfaced by `main`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error("labels file {} not found; create it with one name per line", .0.display())]
    LabelsMissing(PathBuf),

    #[error("{} is empty; add one name per line and re-run", .0.display())]
    LabelsEmpty(PathBuf),

    #[error("config file {} already exists", .0.display())]
    ConfigExists(PathBuf),

    #[error("no config directory on this platform")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_labels_message_tells_user_what_to_do() {
        let err = Error::LabelsEmpty(PathBuf::from("usernames.txt"));
        assert_eq!(
            err.to_string(),
            "usernames.txt is empty; add one name per line and re-run"
        );
    }

    #[test]
    fn test_invalid_input_converts_into_app_error() {
        let err: Error = InvalidInputError::WinnerOutOfRange { index: 7, count: 3 }.into();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(err.to_string(), "winner index 7 is out of range for 3 slices");
    }
}
