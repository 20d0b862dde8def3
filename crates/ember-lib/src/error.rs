use std::path::PathBuf;

/// Errors raised while turning an installed version profile into a launch command.
///
/// Fatal conditions abort the pipeline; missing individual dependency archives
/// are not errors and are surfaced through [`crate::launch::ClasspathResolution`]
/// instead.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("profile document not found for {id}: {path:?}")]
    ProfileNotFound { id: String, path: PathBuf },

    #[error("failed to parse profile document for {id}")]
    ProfileParse {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cyclic inheritance while resolving {id} (chain: {chain})")]
    CyclicInheritance { id: String, chain: String },

    #[error("failed to resolve parent {parent} of {child}")]
    ParentResolution {
        child: String,
        parent: String,
        #[source]
        source: Box<LaunchError>,
    },

    #[error("main archive not found for {version}, probed {probed:?}")]
    MainArchiveNotFound { version: String, probed: Vec<PathBuf> },

    #[error("no native libraries were extracted into {dir:?}")]
    NoNativesExtracted { dir: PathBuf },

    #[error("unsupported platform: {os}")]
    UnsupportedPlatform { os: String },

    #[error("launch preparation was cancelled")]
    Cancelled,

    #[error("i/o error during launch preparation")]
    Io(#[from] std::io::Error),
}
