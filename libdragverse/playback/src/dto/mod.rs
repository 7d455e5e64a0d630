pub(crate) mod command;
pub(crate) mod generation;
pub mod notice;
pub mod play_error;
pub mod playback_state;
pub mod player_event;
pub mod player_state;
pub mod track;
