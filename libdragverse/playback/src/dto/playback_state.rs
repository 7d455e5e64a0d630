use strum::Display;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Ended,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub(crate) enum Transition {
    Load,
    PlayStarted,
    PlayBlocked,
    PlayFailed,
    Pause,
    TrackEnded,
    Stop,
}

impl PlaybackState {
    /// Returns the state reached by `transition`, or `None` if the transition
    /// is not valid from this state.
    pub(crate) fn apply(self, transition: Transition) -> Option<PlaybackState> {
        use PlaybackState::*;
        use Transition::*;

        match (self, transition) {
            (_, Load) => Some(Loading),
            (_, Stop) => Some(Idle),
            (Idle, _) => None,
            (_, PlayStarted) => Some(Playing),
            (_, PlayBlocked) => Some(Paused),
            (_, PlayFailed) => Some(Error),
            (Loading | Playing | Paused, Pause) => Some(Paused),
            (Loading | Playing, TrackEnded) => Some(Ended),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        *self == PlaybackState::Playing
    }

    /// Whether a track is loaded into the element (anything but `Idle`).
    pub fn is_loaded(&self) -> bool {
        *self != PlaybackState::Idle
    }
}
