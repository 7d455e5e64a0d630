use std::time::Duration;

use strum::Display;

use super::player_state::PlayerState;

#[derive(Clone, Debug, Display)]
pub enum PlayerEvent {
    StartQueue(PlayerState),
    TrackChanged(PlayerState),
    Playing(PlayerState),
    Pause(PlayerState),
    Stop(PlayerState),
    Next(PlayerState),
    Previous(PlayerState),
    SetVolume(PlayerState),
    Seek(PlayerState, Duration),
    Ended(PlayerState),
    QueueEnded(PlayerState),
    Fallback(PlayerState, String),
    PlaybackFailed(PlayerState),
    DurationChanged(PlayerState),
    Position(Duration),
}
