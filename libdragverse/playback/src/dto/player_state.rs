use std::time::Duration;

use super::playback_state::PlaybackState;
use super::track::Track;

#[derive(Clone, Debug, PartialEq)]
pub struct TransportState {
    pub is_playing: bool,
    pub current_time: Duration,
    /// Unknown until the media metadata loads.
    pub duration: Option<Duration>,
    pub volume: f32,
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: Duration::ZERO,
            duration: None,
            volume: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerState {
    pub playback: PlaybackState,
    pub transport: TransportState,
    pub queue: Vec<Track>,
    pub queue_position: Option<usize>,
}

impl PlayerState {
    pub fn current_track(&self) -> Option<&Track> {
        self.queue_position.and_then(|i| self.queue.get(i))
    }
}
