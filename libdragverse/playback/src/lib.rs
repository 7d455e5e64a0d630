mod dto;
mod event_loop;
pub mod media;
#[cfg(test)]
mod mock_backend;
mod notice_board;
mod player;
mod request_channel;
mod settings;
pub mod source;

pub mod dragverse_player {
    use std::sync::Arc;
    use std::time::Duration;

    use tap::TapFallible;
    use thiserror::Error;
    use tokio::sync::{broadcast, watch};
    use tokio::task::JoinHandle;
    use tokio_util::sync::CancellationToken;
    use tracing::{info, warn};

    use crate::dto::command::{Command, PlayerResponse};
    pub use crate::dto::notice::{Notice, NoticeKind};
    pub use crate::dto::play_error::PlayError;
    pub use crate::dto::playback_state::PlaybackState;
    pub use crate::dto::player_event::PlayerEvent;
    pub use crate::dto::player_state::{PlayerState, TransportState};
    pub use crate::dto::track::{SourceKind, Track};
    use crate::event_loop::main_loop;
    use crate::media::MediaBackend;
    use crate::notice_board::NoticeBoard;
    use crate::player::{Player, PlayerChannels};
    use crate::request_channel::{RequestSender, request_channel};
    pub use crate::settings::Settings;
    use crate::source::{AssetPathFallback, FallbackResolver};

    #[derive(Debug, Clone, Error)]
    #[error("{0}")]
    pub struct PlayerError(String);

    /// The "now playing" controller. Create one per application session and
    /// share it by reference; call [`PlaybackController::dispose`] when the
    /// session ends.
    ///
    /// Transport methods only enqueue work. Their outcome (playing, blocked by
    /// autoplay policy, failed) is observed through [`Self::state`],
    /// [`Self::subscribe`] and [`Self::notices`]; an `Err` means the
    /// controller has already shut down.
    #[derive(Debug)]
    pub struct PlaybackController {
        cmd_sender: RequestSender<Command, PlayerResponse>,
        event_tx: broadcast::Sender<PlayerEvent>,
        notice_tx: broadcast::Sender<Notice>,
        state_rx: watch::Receiver<PlayerState>,
        cancel: CancellationToken,
        loop_handle: Option<JoinHandle<()>>,
    }

    impl PlaybackController {
        /// Must be called from within a tokio runtime.
        pub fn new<B: MediaBackend>(backend: B, settings: Settings) -> Self {
            let fallback = Arc::new(AssetPathFallback::new(
                settings.fallback_url_template.clone(),
            ));
            Self::with_fallback(backend, settings, fallback)
        }

        pub fn with_fallback<B: MediaBackend>(
            backend: B,
            settings: Settings,
            fallback: Arc<dyn FallbackResolver>,
        ) -> Self {
            let (event_tx, _) = broadcast::channel(32);
            let (notice_tx, _) = broadcast::channel(8);
            let (cmd_tx, cmd_rx) = request_channel();
            let cancel = CancellationToken::new();

            let initial_state = PlayerState {
                transport: TransportState {
                    volume: settings.initial_volume.clamp(0.0, 1.0),
                    ..Default::default()
                },
                ..Default::default()
            };
            let (state_tx, state_rx) = watch::channel(initial_state);

            let channels = PlayerChannels {
                cmd_tx: cmd_tx.clone(),
                event_tx: event_tx.clone(),
                state_tx,
                notices: NoticeBoard::new(notice_tx.clone(), settings.notice_coalesce_window),
            };
            let player = Player::new(backend, channels, &settings, fallback, cancel.clone());
            let loop_handle = tokio::spawn(main_loop(cmd_rx, player));

            Self {
                cmd_sender: cmd_tx,
                event_tx,
                notice_tx,
                state_rx,
                cancel,
                loop_handle: Some(loop_handle),
            }
        }

        pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
            self.event_tx.subscribe()
        }

        pub fn notices(&self) -> broadcast::Receiver<Notice> {
            self.notice_tx.subscribe()
        }

        /// Reactive view of the latest [`PlayerState`].
        pub fn state(&self) -> watch::Receiver<PlayerState> {
            self.state_rx.clone()
        }

        async fn send(&self, command: Command) -> Result<(), PlayerError> {
            self.cmd_sender
                .send_async(command)
                .await
                .map_err(|e| PlayerError(format!("{e:?}")))
        }

        /// Makes `track` current. When `playlist` is given it replaces the
        /// queue, otherwise a queue holding only `track` is installed.
        pub async fn play_track(
            &self,
            track: Track,
            playlist: Option<Vec<Track>>,
        ) -> Result<(), PlayerError> {
            self.send(Command::PlayTrack { track, playlist }).await
        }

        pub async fn pause(&self) -> Result<(), PlayerError> {
            self.send(Command::Pause).await
        }

        pub async fn resume(&self) -> Result<(), PlayerError> {
            self.send(Command::Resume).await
        }

        pub async fn toggle_play_pause(&self) -> Result<(), PlayerError> {
            self.send(Command::TogglePlayPause).await
        }

        pub async fn stop(&self) -> Result<(), PlayerError> {
            self.send(Command::Stop).await
        }

        pub async fn next(&self) -> Result<(), PlayerError> {
            self.send(Command::Next).await
        }

        pub async fn previous(&self) -> Result<(), PlayerError> {
            self.send(Command::Previous).await
        }

        pub async fn seek(&self, time: Duration) -> Result<(), PlayerError> {
            self.send(Command::Seek(time)).await
        }

        pub async fn set_volume(&self, volume: f32) -> Result<(), PlayerError> {
            self.send(Command::SetVolume(volume)).await
        }

        pub async fn get_current_status(&self) -> Result<PlayerState, PlayerError> {
            match self.cmd_sender.request(Command::GetCurrentStatus).await {
                Ok(PlayerResponse::StatusResponse(state)) => Ok(state),
                Err(e) => Err(PlayerError(e)),
            }
        }

        /// Tears down the streaming session, releases element listeners and
        /// waits for the controller loop to exit.
        pub async fn dispose(mut self) -> Result<(), PlayerError> {
            info!("Disposing playback controller");
            self.send(Command::Shutdown).await?;
            if let Some(handle) = self.loop_handle.take() {
                handle
                    .await
                    .map_err(|e| PlayerError(format!("Controller loop panicked: {e:?}")))?;
            }
            Ok(())
        }
    }

    impl Drop for PlaybackController {
        fn drop(&mut self) {
            if self.loop_handle.is_some() && !self.cmd_sender.is_disconnected() {
                info!("dispose() not called, requesting shutdown");
                self.cmd_sender
                    .send(Command::Shutdown)
                    .tap_err(|e| warn!("Error sending shutdown command: {e:?}"))
                    .ok();
                self.cancel.cancel();
            }
        }
    }
}
