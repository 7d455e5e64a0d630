use std::sync::Arc;
use std::time::Duration;

use tap::TapFallible;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dto::command::{Command, PlayOrigin, PlayerResponse};
use crate::dto::generation::Generation;
use crate::dto::notice::NoticeKind;
use crate::dto::play_error::{FailureClass, PlayError};
use crate::dto::playback_state::{PlaybackState, Transition};
use crate::dto::player_event::PlayerEvent;
use crate::dto::player_state::{PlayerState, TransportState};
use crate::dto::track::Track;
use crate::media::{
    MediaBackend, MediaElement, MediaEvent, MediaEventSender, StreamingEngine, StreamingError,
    StreamingErrorKind, StreamingEvent, StreamingEventSender, StreamingSession,
};
use crate::notice_board::NoticeBoard;
use crate::request_channel::RequestSender;
use crate::settings::Settings;
use crate::source::{FallbackResolver, SourcePlan};

pub(crate) struct PlayerChannels {
    pub(crate) cmd_tx: RequestSender<Command, PlayerResponse>,
    pub(crate) event_tx: broadcast::Sender<PlayerEvent>,
    pub(crate) state_tx: watch::Sender<PlayerState>,
    pub(crate) notices: NoticeBoard,
}

/// Bookkeeping for the load identified by `Player::generation`.
#[derive(Debug, Default)]
struct LoadAttempt {
    manifest_url: Option<String>,
    fallback_attempted: bool,
    recoveries: u32,
}

pub(crate) struct Player<B: MediaBackend> {
    element: B::Element,
    engine: Option<B::Engine>,
    session: Option<<B::Engine as StreamingEngine>::Session>,
    fallback: Arc<dyn FallbackResolver>,
    channels: PlayerChannels,
    cancel: CancellationToken,
    max_stream_recoveries: u32,
    playback: PlaybackState,
    transport: TransportState,
    queue: Vec<Track>,
    queue_position: Option<usize>,
    generation: Generation,
    load: LoadAttempt,
    // Bumped by every play request and every pause so only the latest
    // transport intent is honored
    play_request: u64,
    play_pending: bool,
    applied_volume: Option<f32>,
}

impl<B: MediaBackend> Player<B> {
    pub(crate) fn new(
        backend: B,
        channels: PlayerChannels,
        settings: &Settings,
        fallback: Arc<dyn FallbackResolver>,
        cancel: CancellationToken,
    ) -> Self {
        let engine = backend.streaming_engine();
        if engine.is_none() {
            info!("No streaming engine available, manifests will be played natively");
        }

        Self {
            element: backend.create_element(),
            engine,
            session: None,
            fallback,
            channels,
            cancel,
            max_stream_recoveries: settings.max_stream_recoveries,
            playback: PlaybackState::Idle,
            transport: TransportState {
                volume: settings.initial_volume.clamp(0.0, 1.0),
                ..Default::default()
            },
            queue: vec![],
            queue_position: None,
            generation: Generation::default(),
            load: LoadAttempt::default(),
            play_request: 0,
            play_pending: false,
            applied_volume: None,
        }
    }

    pub(crate) fn get_current_status(&self) -> PlayerState {
        PlayerState {
            playback: self.playback,
            transport: self.transport.clone(),
            queue: self.queue.clone(),
            queue_position: self.queue_position,
        }
    }

    fn current_track(&self) -> Option<&Track> {
        self.queue_position.and_then(|i| self.queue.get(i))
    }

    fn emit(&self, event: PlayerEvent) {
        self.channels.event_tx.send(event).unwrap_or_default();
    }

    fn transition(&mut self, transition: Transition) -> bool {
        match self.playback.apply(transition) {
            Some(next) => {
                if next != self.playback {
                    debug!("Playback state {} -> {next} ({transition})", self.playback);
                }
                self.playback = next;
                self.transport.is_playing = next.is_playing();
                true
            }
            None => {
                debug!("Ignoring {transition} while {}", self.playback);
                false
            }
        }
    }

    pub(crate) fn play_track(&mut self, track: Track, playlist: Option<Vec<Track>>) {
        let (queue, position) = match playlist {
            Some(playlist) if !playlist.is_empty() => {
                let position = playlist.iter().position(|t| t.id == track.id);
                if position.is_none() {
                    warn!("Track {} is not part of the playlist, starting from the top", track.id);
                }
                (playlist, position.unwrap_or(0))
            }
            _ => (vec![track], 0),
        };

        info!("Starting queue of {} track(s) at position {position}", queue.len());
        self.queue = queue;
        self.queue_position = Some(position);
        self.emit(PlayerEvent::StartQueue(self.get_current_status()));
        self.load_current();
    }

    fn load_current(&mut self) {
        let Some(track) = self.current_track() else {
            return;
        };

        let Some(uri) = track.playable_uri().map(str::to_owned) else {
            if track.is_external_only() {
                info!("Track {} is only available externally, not loading it", track.id);
            } else {
                warn!("Track {} has no media url, not loading it", track.id);
            }
            let known_duration = track.duration;
            self.unload(known_duration);
            self.emit(PlayerEvent::TrackChanged(self.get_current_status()));
            return;
        };
        let known_duration = track.duration;

        self.begin_load(known_duration);
        self.emit(PlayerEvent::TrackChanged(self.get_current_status()));

        match SourcePlan::select(
            &uri,
            self.engine.is_some(),
            self.element.can_play_manifest(),
        ) {
            SourcePlan::Streaming(manifest_url) => self.start_streaming(manifest_url),
            SourcePlan::NativeManifest(url) | SourcePlan::Direct(url) => {
                info!("Loading {url}");
                self.element.set_source(&url);
                self.request_play(PlayOrigin::Load);
            }
        }
    }

    /// Invalidates whatever was loaded before and points element callbacks at
    /// a fresh generation.
    fn begin_load(&mut self, known_duration: Option<Duration>) {
        self.teardown_session();
        self.generation = self.generation.next();
        self.load = LoadAttempt::default();
        self.play_pending = false;
        self.transition(Transition::Load);
        self.transport.current_time = Duration::ZERO;
        self.transport.duration = known_duration;
        self.element.bind(MediaEventSender::new(
            self.generation,
            self.channels.cmd_tx.clone(),
        ));
        debug!("Began load {}", self.generation);
    }

    fn start_streaming(&mut self, manifest_url: String) {
        let Some(engine) = &self.engine else {
            error!("Streaming source selected without a streaming engine");
            return;
        };

        info!("Loading manifest {manifest_url}");
        let mut session = engine.create_session(StreamingEventSender::new(
            self.generation,
            self.channels.cmd_tx.clone(),
        ));
        session.attach(&mut self.element);
        session.load_manifest(&manifest_url);
        self.session = Some(session);
        self.load.manifest_url = Some(manifest_url);
    }

    /// Silences whatever was loaded so the current track can be one that
    /// never reaches the element.
    fn unload(&mut self, known_duration: Option<Duration>) {
        if self.playback.is_loaded() {
            info!("Releasing previous source");
            self.release_source();
            self.transition(Transition::Stop);
        }
        self.transport.current_time = Duration::ZERO;
        self.transport.duration = known_duration;
    }

    /// Stops the element and invalidates every callback of the current load.
    fn release_source(&mut self) {
        self.element.pause();
        self.element.clear_source();
        self.teardown_session();
        self.generation = self.generation.next();
        self.load = LoadAttempt::default();
        self.play_pending = false;
    }

    fn teardown_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            info!("Destroying streaming session");
            session.destroy();
        }
    }

    fn request_play(&mut self, origin: PlayOrigin) {
        self.play_request += 1;
        self.play_pending = true;
        let play = self.element.play();
        let request = self.play_request;
        let generation = self.generation;
        let cmd_tx = self.channels.cmd_tx.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Controller shut down before play request {generation} settled");
                }
                result = play => {
                    cmd_tx
                        .send(Command::PlayResolved { generation, request, origin, result })
                        .tap_err(|e| error!("Error sending play result: {e:?}"))
                        .ok();
                }
            }
        });
    }

    pub(crate) fn on_play_resolved(
        &mut self,
        generation: Generation,
        request: u64,
        origin: PlayOrigin,
        result: Result<(), PlayError>,
    ) {
        if generation != self.generation {
            debug!(
                "Discarding play result of superseded load {generation} (current {}): {result:?}",
                self.generation
            );
            return;
        }

        if request != self.play_request {
            debug!(
                "Discarding play result of outdated request {request} (latest {}): {result:?}",
                self.play_request
            );
            // The element started after a pause that nothing has overridden
            if result.is_ok() && !self.play_pending && self.playback == PlaybackState::Paused {
                info!("Play finished after pause was requested, staying paused");
                self.element.pause();
            }
            return;
        }

        self.play_pending = false;
        match result {
            Ok(()) => {
                if self.transition(Transition::PlayStarted) {
                    self.channels.notices.playback_started();
                    self.emit(PlayerEvent::Playing(self.get_current_status()));
                }
            }
            Err(e) => self.on_play_failed(origin, e),
        }
    }

    fn on_play_failed(&mut self, origin: PlayOrigin, error: PlayError) {
        match (origin, error.classify()) {
            (_, FailureClass::Superseded) => {
                debug!("Play request aborted: {error}");
                self.transition(Transition::PlayBlocked);
            }
            (PlayOrigin::Fallback, _) => {
                warn!("Direct playback after manifest failure failed: {error}");
                self.fail_playback();
            }
            (_, FailureClass::AutoplayBlocked) => {
                warn!("Playback blocked: {error}");
                if self.transition(Transition::PlayBlocked) {
                    self.channels.notices.post(NoticeKind::PlaybackBlocked);
                    self.emit(PlayerEvent::Pause(self.get_current_status()));
                }
            }
            (_, FailureClass::Generic) => {
                error!("Playback failed: {error}");
                self.fail_playback();
            }
        }
    }

    fn fail_playback(&mut self) {
        self.teardown_session();
        if self.transition(Transition::PlayFailed) {
            self.channels.notices.post(NoticeKind::PlaybackFailed);
            self.emit(PlayerEvent::PlaybackFailed(self.get_current_status()));
        }
    }

    pub(crate) fn on_streaming_event(&mut self, generation: Generation, event: StreamingEvent) {
        if generation != self.generation || self.session.is_none() {
            debug!("Ignoring streaming event from stale session {generation}: {event:?}");
            return;
        }

        match event {
            StreamingEvent::ManifestParsed => {
                info!("Manifest parsed");
                self.request_play(PlayOrigin::Load);
            }
            StreamingEvent::Error(error) => self.on_streaming_error(error),
        }
    }

    fn on_streaming_error(&mut self, error: StreamingError) {
        if !error.fatal {
            debug!("Streaming engine recovering from {error:?}");
            return;
        }

        if error.is_manifest_failure() {
            self.fallback_to_direct();
            return;
        }

        if self.load.recoveries >= self.max_stream_recoveries {
            error!(
                "Giving up on stream after {} recovery attempts: {error:?}",
                self.load.recoveries
            );
            self.fail_playback();
            return;
        }

        let Some(session) = &mut self.session else {
            return;
        };
        match error.kind {
            StreamingErrorKind::Network => {
                self.load.recoveries += 1;
                warn!("Fatal network error, reloading stream: {error:?}");
                session.start_load();
            }
            StreamingErrorKind::Media => {
                self.load.recoveries += 1;
                warn!("Fatal media error, recovering: {error:?}");
                session.recover_media_error();
            }
            StreamingErrorKind::Other => {
                error!("Unrecoverable streaming error: {error:?}");
                self.fail_playback();
            }
        }
    }

    fn fallback_to_direct(&mut self) {
        let Some(manifest_url) = self.load.manifest_url.clone() else {
            self.fail_playback();
            return;
        };
        if self.load.fallback_attempted {
            self.fail_playback();
            return;
        }

        let direct_url = match self.fallback.direct_url(&manifest_url) {
            Ok(direct_url) => direct_url,
            Err(e) => {
                warn!("Unable to derive a direct url: {e}");
                self.fail_playback();
                return;
            }
        };

        info!("Manifest unavailable, falling back to {direct_url}");
        let known_duration = self.transport.duration;
        self.begin_load(known_duration);
        self.load.fallback_attempted = true;
        self.element.set_source(&direct_url);
        self.request_play(PlayOrigin::Fallback);
        self.emit(PlayerEvent::Fallback(self.get_current_status(), direct_url));
    }

    pub(crate) fn on_media_event(&mut self, generation: Generation, event: MediaEvent) {
        if generation != self.generation {
            debug!("Ignoring media event from replaced source {generation}: {event:?}");
            return;
        }

        match event {
            MediaEvent::Ended => self.on_ended(),
            MediaEvent::TimeUpdate(position) => {
                self.transport.current_time = position;
                self.emit(PlayerEvent::Position(position));
            }
            MediaEvent::DurationChange(duration) => {
                self.transport.duration = duration;
                self.emit(PlayerEvent::DurationChanged(self.get_current_status()));
            }
            MediaEvent::Error(message) => {
                if self.playback.is_loaded() {
                    error!("Media element error: {message}");
                    self.fail_playback();
                }
            }
        }
    }

    fn on_ended(&mut self) {
        if !self.playback.is_loaded() {
            return;
        }

        info!("Received ended event");
        self.emit(PlayerEvent::Ended(self.get_current_status()));
        if self.has_next() {
            self.go_next();
        } else {
            self.transition(Transition::TrackEnded);
            self.emit(PlayerEvent::QueueEnded(self.get_current_status()));
        }
    }

    fn has_next(&self) -> bool {
        matches!(self.queue_position, Some(i) if i + 1 < self.queue.len())
    }

    pub(crate) fn go_next(&mut self) {
        match self.queue_position {
            Some(position) if self.has_next() => {
                info!("Current position: {position}, going to next track");
                self.queue_position = Some(position + 1);
                self.emit(PlayerEvent::Next(self.get_current_status()));
                self.load_current();
            }
            _ => info!("Already at the end of the queue, not going to next track"),
        }
    }

    pub(crate) fn go_previous(&mut self) {
        match self.queue_position {
            Some(position) if position > 0 => {
                info!("Current position: {position}, going to previous track");
                self.queue_position = Some(position - 1);
                self.emit(PlayerEvent::Previous(self.get_current_status()));
                self.load_current();
            }
            Some(_) => {
                info!("Already at the start of the queue, restarting track");
                self.seek(Duration::ZERO);
            }
            None => info!("Queue is empty, not going to previous track"),
        }
    }

    pub(crate) fn pause(&mut self) {
        if !self.playback.is_loaded() {
            info!("Nothing loaded, ignoring pause");
            return;
        }
        self.element.pause();
        // Any play request still in flight predates this pause
        self.play_request += 1;
        self.play_pending = false;
        if self.transition(Transition::Pause) {
            self.emit(PlayerEvent::Pause(self.get_current_status()));
        }
    }

    pub(crate) fn resume(&mut self) {
        if !self.playback.is_loaded() {
            info!("Nothing loaded, ignoring resume");
            return;
        }
        self.request_play(PlayOrigin::Resume);
    }

    pub(crate) fn toggle_play_pause(&mut self) {
        if self.transport.is_playing {
            self.pause();
        } else {
            self.resume();
        }
    }

    pub(crate) fn seek(&mut self, position: Duration) {
        self.element.seek(position);
        self.transport.current_time = position;
        self.emit(PlayerEvent::Seek(self.get_current_status(), position));
    }

    pub(crate) fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            warn!("Ignoring NaN volume");
            return;
        }
        self.transport.volume = volume.clamp(0.0, 1.0);
        self.emit(PlayerEvent::SetVolume(self.get_current_status()));
    }

    pub(crate) fn stop(&mut self) {
        self.element.seek(Duration::ZERO);
        // Anything still in flight belongs to the old queue
        self.release_source();
        self.queue.clear();
        self.queue_position = None;
        self.transport.current_time = Duration::ZERO;
        self.transport.duration = None;
        self.transition(Transition::Stop);
        self.emit(PlayerEvent::Stop(self.get_current_status()));
    }

    /// Applies derived state to the element and publishes the latest snapshot
    /// to state observers. Runs after every command.
    pub(crate) fn sync_effects(&mut self) {
        if self.applied_volume != Some(self.transport.volume) {
            self.element.set_volume(self.transport.volume);
            self.applied_volume = Some(self.transport.volume);
        }

        let current = self.get_current_status();
        self.channels.state_tx.send_if_modified(|state| {
            if *state == current {
                false
            } else {
                *state = current;
                true
            }
        });
    }

    pub(crate) fn shutdown(&mut self) {
        info!("Shutting down playback controller");
        self.teardown_session();
        self.element.pause();
        self.element.detach();
        self.cancel.cancel();
    }
}
