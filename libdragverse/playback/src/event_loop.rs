use tracing::{debug, error, info, trace};

use crate::dto::command::{Command, PlayerResponse};
use crate::media::{MediaBackend, MediaEvent};
use crate::player::Player;
use crate::request_channel::RequestReceiver;

pub(crate) async fn main_loop<B: MediaBackend>(
    mut receiver: RequestReceiver<Command, PlayerResponse>,
    mut player: Player<B>,
) {
    while let Ok(next_command) = receiver.recv_async().await {
        match &next_command {
            Command::Media(_, MediaEvent::TimeUpdate(_)) => trace!("Got command {next_command:?}"),
            Command::Media(..) | Command::Streaming(..) | Command::PlayResolved { .. } => {
                debug!("Got command {next_command:?}")
            }
            _ => info!("Got command {next_command:?}"),
        }

        match next_command {
            Command::PlayTrack { track, playlist } => {
                player.play_track(track, playlist);
            }
            Command::Pause => {
                player.pause();
            }
            Command::Resume => {
                player.resume();
            }
            Command::TogglePlayPause => {
                player.toggle_play_pause();
            }
            Command::Stop => {
                player.stop();
            }
            Command::Next => {
                player.go_next();
            }
            Command::Previous => {
                player.go_previous();
            }
            Command::Seek(position) => {
                player.seek(position);
            }
            Command::SetVolume(volume) => {
                player.set_volume(volume);
            }
            Command::GetCurrentStatus => {
                let current_status = player.get_current_status();
                if let Err(e) = receiver.respond(PlayerResponse::StatusResponse(current_status)) {
                    error!("Error sending player status: {e:?}");
                }
            }
            Command::Media(generation, event) => {
                player.on_media_event(generation, event);
            }
            Command::Streaming(generation, event) => {
                player.on_streaming_event(generation, event);
            }
            Command::PlayResolved {
                generation,
                request,
                origin,
                result,
            } => {
                player.on_play_resolved(generation, request, origin, result);
            }
            Command::Shutdown => {
                player.shutdown();
                break;
            }
        }
        player.sync_effects();
    }
    info!("Request loop completed");
}
