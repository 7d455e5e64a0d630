use std::time::Duration;

use crate::source::AssetPathFallback;

#[derive(Clone, Debug)]
pub struct Settings {
    /// Volume applied to the element before the first `set_volume`.
    pub initial_volume: f32,
    /// Identical notices raised within this window are shown once.
    pub notice_coalesce_window: Duration,
    /// How many times a load may ask the streaming engine to recover from a
    /// fatal network or media error before playback is abandoned.
    pub max_stream_recoveries: u32,
    /// Template used by the default manifest fallback, see [`AssetPathFallback`].
    pub fallback_url_template: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            // Matches how long a toast stays on screen
            notice_coalesce_window: Duration::from_secs(4),
            max_stream_recoveries: 3,
            fallback_url_template: AssetPathFallback::DEFAULT_TEMPLATE.to_owned(),
        }
    }
}
