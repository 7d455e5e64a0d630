use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::dto::notice::{Notice, NoticeKind};

/// Publishes user-facing notices, coalescing repeats so the UI never stacks
/// identical toasts.
#[derive(Debug)]
pub(crate) struct NoticeBoard {
    tx: broadcast::Sender<Notice>,
    window: Duration,
    last_shown: HashMap<NoticeKind, Instant>,
    // The autoplay notice stays suppressed until playback starts once
    blocked_shown: bool,
}

impl NoticeBoard {
    pub(crate) fn new(tx: broadcast::Sender<Notice>, window: Duration) -> Self {
        Self {
            tx,
            window,
            last_shown: HashMap::new(),
            blocked_shown: false,
        }
    }

    /// Returns whether the notice was published.
    pub(crate) fn post(&mut self, kind: NoticeKind) -> bool {
        if kind == NoticeKind::PlaybackBlocked && self.blocked_shown {
            debug!("Suppressing repeated {kind} notice");
            return false;
        }

        let now = Instant::now();
        if let Some(shown) = self.last_shown.get(&kind)
            && now.duration_since(*shown) < self.window
        {
            debug!("Coalescing {kind} notice");
            return false;
        }

        info!("Showing notice {kind}");
        self.last_shown.insert(kind, now);
        if kind == NoticeKind::PlaybackBlocked {
            self.blocked_shown = true;
        }
        // No subscribers is fine, nobody is looking
        let _ = self.tx.send(kind.into());
        true
    }

    pub(crate) fn playback_started(&mut self) {
        self.blocked_shown = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(window: Duration) -> (NoticeBoard, broadcast::Receiver<Notice>) {
        let (tx, rx) = broadcast::channel(8);
        (NoticeBoard::new(tx, window), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn coalesces_within_window() {
        let (mut board, mut rx) = board(Duration::from_secs(4));

        assert!(board.post(NoticeKind::PlaybackFailed));
        assert!(!board.post(NoticeKind::PlaybackFailed));
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(board.post(NoticeKind::PlaybackFailed));

        assert_eq!(rx.try_recv().unwrap().kind, NoticeKind::PlaybackFailed);
        assert_eq!(rx.try_recv().unwrap().kind, NoticeKind::PlaybackFailed);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn blocked_notice_waits_for_playback() {
        let (mut board, mut rx) = board(Duration::from_secs(4));

        assert!(board.post(NoticeKind::PlaybackBlocked));
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(!board.post(NoticeKind::PlaybackBlocked));

        board.playback_started();
        assert!(board.post(NoticeKind::PlaybackBlocked));

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.message, NoticeKind::PlaybackBlocked.message());
    }

    #[tokio::test(start_paused = true)]
    async fn kinds_are_independent() {
        let (mut board, _rx) = board(Duration::from_secs(4));

        assert!(board.post(NoticeKind::PlaybackBlocked));
        assert!(board.post(NoticeKind::PlaybackFailed));
    }
}
