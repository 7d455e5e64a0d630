mod fallback;

pub use fallback::{AssetPathFallback, FallbackError, FallbackResolver};

/// Decides whether `uri` points at an adaptive-streaming manifest.
///
/// This only looks at the URI: the path, with any query or fragment removed,
/// must end in `.m3u8`.
pub fn is_manifest_uri(uri: &str) -> bool {
    let path = uri.split(['?', '#']).next().unwrap_or_default();
    path.to_ascii_lowercase().ends_with(".m3u8")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourcePlan {
    /// Load the manifest through the software streaming engine.
    Streaming(String),
    /// Hand the manifest straight to the element.
    NativeManifest(String),
    /// Plain file or progressive stream.
    Direct(String),
}

impl SourcePlan {
    pub(crate) fn select(uri: &str, engine_available: bool, native_manifest: bool) -> Self {
        if !is_manifest_uri(uri) {
            return SourcePlan::Direct(uri.to_owned());
        }

        if engine_available {
            SourcePlan::Streaming(uri.to_owned())
        } else if native_manifest {
            SourcePlan::NativeManifest(uri.to_owned())
        } else {
            // Nothing can parse the manifest; let the element reject it
            SourcePlan::Direct(uri.to_owned())
        }
    }
}
