use std::time::Duration;

use super::generation::Generation;
use super::play_error::PlayError;
use super::player_state::PlayerState;
use super::track::Track;
use crate::media::{MediaEvent, StreamingEvent};

#[derive(Clone, Debug)]
pub(crate) enum Command {
    PlayTrack {
        track: Track,
        playlist: Option<Vec<Track>>,
    },
    Pause,
    Resume,
    TogglePlayPause,
    Stop,
    Next,
    Previous,
    Seek(Duration),
    SetVolume(f32),
    GetCurrentStatus,
    Media(Generation, MediaEvent),
    Streaming(Generation, StreamingEvent),
    PlayResolved {
        generation: Generation,
        request: u64,
        origin: PlayOrigin,
        result: Result<(), PlayError>,
    },
    Shutdown,
}

/// What issued a play request, which decides how its failure is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayOrigin {
    Load,
    Resume,
    Fallback,
}

#[derive(Clone, Debug)]
pub(crate) enum PlayerResponse {
    StatusResponse(PlayerState),
}
