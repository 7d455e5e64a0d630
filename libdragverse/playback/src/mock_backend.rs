use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::media::{
    MediaBackend, MediaElement, MediaEventSender, PlayError, PlayRequest, StreamingEngine,
    StreamingError, StreamingEventSender, StreamingSession,
};

pub(crate) enum PlayOutcome {
    Resolve(Result<(), PlayError>),
    Deferred(oneshot::Receiver<Result<(), PlayError>>),
}

pub(crate) enum ManifestOutcome {
    Parsed,
    Fail(StreamingError),
    Hold,
}

/// Everything the mock element and engine were asked to do.
#[derive(Default)]
pub(crate) struct MockShared {
    pub(crate) sources: Vec<String>,
    pub(crate) cleared_sources: usize,
    pub(crate) play_requests: usize,
    pub(crate) pauses: usize,
    pub(crate) seeks: Vec<Duration>,
    pub(crate) volumes: Vec<f32>,
    pub(crate) detached: bool,
    pub(crate) manifests: Vec<String>,
    pub(crate) sessions_created: usize,
    pub(crate) sessions_destroyed: usize,
    pub(crate) max_live_sessions: usize,
    pub(crate) attached_sessions: usize,
    pub(crate) network_recoveries: usize,
    pub(crate) media_recoveries: usize,
    play_outcomes: VecDeque<PlayOutcome>,
    manifest_outcomes: VecDeque<ManifestOutcome>,
    media_events: Option<MediaEventSender>,
    streaming_events: Option<StreamingEventSender>,
}

impl MockShared {
    pub(crate) fn live_sessions(&self) -> usize {
        self.sessions_created - self.sessions_destroyed
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockBackend {
    shared: Arc<Mutex<MockShared>>,
    engine_available: bool,
    native_manifest: bool,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_streaming_engine(mut self) -> Self {
        self.engine_available = true;
        self
    }

    pub(crate) fn with_native_manifest(mut self) -> Self {
        self.native_manifest = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockShared> {
        self.shared.lock().unwrap()
    }

    pub(crate) fn inspect<R>(&self, f: impl FnOnce(&MockShared) -> R) -> R {
        f(&self.lock())
    }

    pub(crate) fn queue_play(&self, result: Result<(), PlayError>) {
        self.lock()
            .play_outcomes
            .push_back(PlayOutcome::Resolve(result));
    }

    /// The next play request stays pending until the returned sender fires.
    pub(crate) fn defer_play(&self) -> oneshot::Sender<Result<(), PlayError>> {
        let (tx, rx) = oneshot::channel();
        self.lock().play_outcomes.push_back(PlayOutcome::Deferred(rx));
        tx
    }

    pub(crate) fn queue_manifest(&self, outcome: ManifestOutcome) {
        self.lock().manifest_outcomes.push_back(outcome);
    }

    /// Listener bound by the most recent load.
    pub(crate) fn media_events(&self) -> MediaEventSender {
        self.lock()
            .media_events
            .clone()
            .expect("no media listener bound")
    }

    pub(crate) fn streaming_events(&self) -> StreamingEventSender {
        self.lock()
            .streaming_events
            .clone()
            .expect("no streaming session created")
    }
}

impl MediaBackend for MockBackend {
    type Element = MockElement;
    type Engine = MockEngine;

    fn create_element(&self) -> Self::Element {
        MockElement {
            shared: self.shared.clone(),
            native_manifest: self.native_manifest,
        }
    }

    fn streaming_engine(&self) -> Option<Self::Engine> {
        self.engine_available.then(|| MockEngine {
            shared: self.shared.clone(),
        })
    }
}

pub(crate) struct MockElement {
    shared: Arc<Mutex<MockShared>>,
    native_manifest: bool,
}

impl MediaElement for MockElement {
    fn bind(&mut self, events: MediaEventSender) {
        self.shared.lock().unwrap().media_events = Some(events);
    }

    fn set_source(&mut self, uri: &str) {
        self.shared.lock().unwrap().sources.push(uri.to_owned());
    }

    fn clear_source(&mut self) {
        self.shared.lock().unwrap().cleared_sources += 1;
    }

    fn play(&mut self) -> PlayRequest {
        let mut shared = self.shared.lock().unwrap();
        shared.play_requests += 1;
        match shared.play_outcomes.pop_front() {
            Some(PlayOutcome::Resolve(result)) => Box::pin(async move { result }),
            Some(PlayOutcome::Deferred(rx)) => {
                Box::pin(async move { rx.await.unwrap_or(Err(PlayError::Aborted)) })
            }
            None => Box::pin(async { Ok(()) }),
        }
    }

    fn pause(&mut self) {
        self.shared.lock().unwrap().pauses += 1;
    }

    fn seek(&mut self, position: Duration) {
        self.shared.lock().unwrap().seeks.push(position);
    }

    fn set_volume(&mut self, volume: f32) {
        self.shared.lock().unwrap().volumes.push(volume);
    }

    fn can_play_manifest(&self) -> bool {
        self.native_manifest
    }

    fn detach(&mut self) {
        let mut shared = self.shared.lock().unwrap();
        shared.media_events = None;
        shared.detached = true;
    }
}

pub(crate) struct MockEngine {
    shared: Arc<Mutex<MockShared>>,
}

impl StreamingEngine for MockEngine {
    type Session = MockSession;

    fn create_session(&self, events: StreamingEventSender) -> Self::Session {
        let mut shared = self.shared.lock().unwrap();
        shared.sessions_created += 1;
        shared.max_live_sessions = shared.max_live_sessions.max(shared.live_sessions());
        shared.streaming_events = Some(events.clone());
        MockSession {
            shared: self.shared.clone(),
            events,
            destroyed: false,
        }
    }
}

pub(crate) struct MockSession {
    shared: Arc<Mutex<MockShared>>,
    events: StreamingEventSender,
    destroyed: bool,
}

impl StreamingSession for MockSession {
    fn attach(&mut self, _element: &mut dyn MediaElement) {
        self.shared.lock().unwrap().attached_sessions += 1;
    }

    fn load_manifest(&mut self, uri: &str) {
        let outcome = {
            let mut shared = self.shared.lock().unwrap();
            shared.manifests.push(uri.to_owned());
            shared.manifest_outcomes.pop_front()
        };

        match outcome.unwrap_or(ManifestOutcome::Parsed) {
            ManifestOutcome::Parsed => self.events.manifest_parsed(),
            ManifestOutcome::Fail(error) => self.events.error(error),
            ManifestOutcome::Hold => {}
        }
    }

    fn start_load(&mut self) {
        self.shared.lock().unwrap().network_recoveries += 1;
    }

    fn recover_media_error(&mut self) {
        self.shared.lock().unwrap().media_recoveries += 1;
    }

    fn destroy(&mut self) {
        assert!(!self.destroyed, "session destroyed twice");
        self.destroyed = true;
        self.shared.lock().unwrap().sessions_destroyed += 1;
    }
}
