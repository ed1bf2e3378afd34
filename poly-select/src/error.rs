use crate::SelectionState;

/// Misuse of the selection model by a collaborator.
///
/// Both kinds are programming errors of the caller; the model is left unchanged
/// when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("{operation} is not permitted in state {state}")]
    InvalidState {
        operation: &'static str,
        state: SelectionState,
    },
    #[error("{operation} requires a non-empty selection path")]
    EmptyPath { operation: &'static str },
    #[error("segment index {index} out of range 0..{len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("a polyline needs at least 2 points, got {0}")]
    TooFewPoints(usize),
}

impl SelectionError {
    /// Whether the error is about the model's state (rather than an argument).
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. } | Self::EmptyPath { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        !self.is_invalid_state()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("selection is not finished (state {0})")]
    NotSelected(SelectionState),
    #[error("no image to extract from")]
    NoImage,
    #[error("selection lies outside the image")]
    OutsideImage,
    #[error(transparent)]
    Image(#[from] image::ImageError),
}
