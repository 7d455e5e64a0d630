use thiserror::Error;

/// Why the media element refused a play request.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlayError {
    #[error("The play request was interrupted by a new load")]
    Aborted,
    #[error("Playback was not allowed without a user gesture")]
    NotAllowed,
    #[error("The media source is not supported")]
    NotSupported,
    #[error("{0}")]
    Other(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FailureClass {
    Superseded,
    AutoplayBlocked,
    Generic,
}

impl PlayError {
    pub(crate) fn classify(&self) -> FailureClass {
        match self {
            PlayError::Aborted => FailureClass::Superseded,
            PlayError::NotAllowed | PlayError::NotSupported => FailureClass::AutoplayBlocked,
            PlayError::Other(_) => FailureClass::Generic,
        }
    }
}
