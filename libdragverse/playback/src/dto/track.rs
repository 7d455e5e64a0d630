use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Directly playable file or stream.
    #[default]
    Hosted,
    /// Lives on another platform, only reachable through `external_id`.
    ExternalReference,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default, with = "seconds")]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub source_kind: SourceKind,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl Track {
    /// The URI the media element should load, if this track has one.
    pub fn playable_uri(&self) -> Option<&str> {
        self.media_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn is_external_only(&self) -> bool {
        self.source_kind == SourceKind::ExternalReference && self.playable_uri().is_none()
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Feeds report unknown durations as 0 or negative values
        let seconds = Option::<f64>::deserialize(deserializer)?;
        Ok(seconds
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(Duration::from_secs_f64))
    }
}
