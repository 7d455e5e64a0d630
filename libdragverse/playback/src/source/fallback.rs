use std::fmt::Debug;

use lazy_regex::regex_captures;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FallbackError {
    #[error("No asset id found in manifest url {0}")]
    NoAssetId(String),
}

/// Maps a manifest URI that failed to load onto a directly playable file.
///
/// The mapping depends on how the hosting provider lays out its URLs, so it
/// is supplied to the controller rather than built in.
pub trait FallbackResolver: Debug + Send + Sync + 'static {
    fn direct_url(&self, manifest_url: &str) -> Result<String, FallbackError>;
}

/// Resolves `<origin>/.../hls/<asset_id>/<file>.m3u8` by substituting the
/// origin and asset id into a template.
///
/// The template may contain the `{origin}` and `{asset_id}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPathFallback {
    template: String,
}

impl AssetPathFallback {
    pub const DEFAULT_TEMPLATE: &'static str = "{origin}/asset/{asset_id}/video";

    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for AssetPathFallback {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TEMPLATE)
    }
}

impl FallbackResolver for AssetPathFallback {
    fn direct_url(&self, manifest_url: &str) -> Result<String, FallbackError> {
        let (_, origin, asset_id) = regex_captures!(
            r"^([a-zA-Z][a-zA-Z0-9+.-]*://[^/?#]+)/(?:[^?#]*/)?hls/([^/?#]+)/",
            manifest_url
        )
        .ok_or_else(|| FallbackError::NoAssetId(manifest_url.to_owned()))?;

        Ok(self
            .template
            .replace("{origin}", origin)
            .replace("{asset_id}", asset_id))
    }
}
