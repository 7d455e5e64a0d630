mod events;

use std::time::Duration;

pub use events::{MediaEventSender, StreamingEventSender};
use futures_util::future::BoxFuture;

pub use crate::dto::play_error::PlayError;

/// Resolves once the element has either started playing or refused to.
pub type PlayRequest = BoxFuture<'static, Result<(), PlayError>>;

/// Native notifications raised by the media element.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaEvent {
    Ended,
    TimeUpdate(Duration),
    DurationChange(Option<Duration>),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamingErrorKind {
    Network,
    Media,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamingErrorDetail {
    ManifestParse,
    ManifestLoad,
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamingError {
    pub fatal: bool,
    pub kind: StreamingErrorKind,
    pub detail: StreamingErrorDetail,
}

impl StreamingError {
    /// The source has no usable manifest even though its URI looked like one.
    pub fn is_manifest_failure(&self) -> bool {
        matches!(
            self.detail,
            StreamingErrorDetail::ManifestParse | StreamingErrorDetail::ManifestLoad
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StreamingEvent {
    ManifestParsed,
    Error(StreamingError),
}

/// The single native audio/video element owned by the controller.
pub trait MediaElement: Send + 'static {
    /// Routes element notifications for the current load to `events`,
    /// replacing any previous listener.
    fn bind(&mut self, events: MediaEventSender);
    fn set_source(&mut self, uri: &str);
    fn clear_source(&mut self);
    fn play(&mut self) -> PlayRequest;
    fn pause(&mut self);
    fn seek(&mut self, position: Duration);
    fn set_volume(&mut self, volume: f32);
    /// Whether the element can play adaptive-streaming manifests on its own.
    fn can_play_manifest(&self) -> bool;
    /// Releases every listener registered through `bind`.
    fn detach(&mut self);
}

/// A software adaptive-streaming engine.
pub trait StreamingEngine: Send + 'static {
    type Session: StreamingSession;

    fn create_session(&self, events: StreamingEventSender) -> Self::Session;
}

/// One engine instance bound to the media element.
pub trait StreamingSession: Send + 'static {
    fn attach(&mut self, element: &mut dyn MediaElement);
    fn load_manifest(&mut self, uri: &str);
    /// Network recovery: restart segment/manifest loading.
    fn start_load(&mut self);
    fn recover_media_error(&mut self);
    /// Releases network connections and detaches from the element.
    fn destroy(&mut self);
}

/// Creates the platform media primitives.
pub trait MediaBackend: Send + 'static {
    type Element: MediaElement;
    type Engine: StreamingEngine;

    fn create_element(&self) -> Self::Element;
    /// `None` when the runtime has no software streaming engine.
    fn streaming_engine(&self) -> Option<Self::Engine>;
}
