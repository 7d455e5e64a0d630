use std::time::Duration;

use tap::TapFallible;
use tracing::{debug, warn};

use super::{MediaEvent, StreamingError, StreamingEvent};
use crate::dto::command::{Command, PlayerResponse};
use crate::dto::generation::Generation;
use crate::request_channel::RequestSender;

/// Handed to the media element on every load. Events sent through it are
/// tagged with that load, so notifications from a replaced source are
/// ignored by the controller.
#[derive(Clone, Debug)]
pub struct MediaEventSender {
    generation: Generation,
    cmd_tx: RequestSender<Command, PlayerResponse>,
}

impl MediaEventSender {
    pub(crate) fn new(
        generation: Generation,
        cmd_tx: RequestSender<Command, PlayerResponse>,
    ) -> Self {
        Self { generation, cmd_tx }
    }

    pub fn send(&self, event: MediaEvent) {
        self.cmd_tx
            .send(Command::Media(self.generation, event))
            .tap_err(|_| debug!("Controller stopped, dropping media event"))
            .ok();
    }

    pub fn ended(&self) {
        self.send(MediaEvent::Ended);
    }

    pub fn time_update(&self, position: Duration) {
        self.send(MediaEvent::TimeUpdate(position));
    }

    pub fn duration_change(&self, duration: Option<Duration>) {
        self.send(MediaEvent::DurationChange(duration));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(MediaEvent::Error(message.into()));
    }
}

#[derive(Clone, Debug)]
pub struct StreamingEventSender {
    generation: Generation,
    cmd_tx: RequestSender<Command, PlayerResponse>,
}

impl StreamingEventSender {
    pub(crate) fn new(
        generation: Generation,
        cmd_tx: RequestSender<Command, PlayerResponse>,
    ) -> Self {
        Self { generation, cmd_tx }
    }

    pub fn send(&self, event: StreamingEvent) {
        self.cmd_tx
            .send(Command::Streaming(self.generation, event))
            .tap_err(|_| warn!("Controller stopped, dropping streaming event"))
            .ok();
    }

    pub fn manifest_parsed(&self) {
        self.send(StreamingEvent::ManifestParsed);
    }

    pub fn error(&self, error: StreamingError) {
        self.send(StreamingEvent::Error(error));
    }
}
