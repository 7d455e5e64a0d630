use strum::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum NoticeKind {
    PlaybackBlocked,
    PlaybackFailed,
}

impl NoticeKind {
    pub fn message(&self) -> &'static str {
        match self {
            NoticeKind::PlaybackBlocked => "Playback blocked - tap play to start",
            NoticeKind::PlaybackFailed => "Failed to play audio, please try again",
        }
    }
}

/// A transient, user-facing message (rendered as a toast by the UI).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl From<NoticeKind> for Notice {
    fn from(kind: NoticeKind) -> Self {
        Self {
            kind,
            message: kind.message().to_owned(),
        }
    }
}
