/// Core types for launch preparation
use std::path::{Path, PathBuf};

/// Placeholder player name used for unauthenticated launches.
pub const DEFAULT_PLAYER_NAME: &str = "Player";
/// Sentinel access token denoting unauthenticated use.
pub const OFFLINE_ACCESS_TOKEN: &str = "0";
/// All-zero UUID sentinel.
pub const NIL_UUID: &str = "00000000-0000-0000-0000-000000000000";
/// Default maximum heap size.
pub const DEFAULT_MAX_MEMORY: &str = "2G";
/// Default minimum heap size.
pub const DEFAULT_MIN_MEMORY: &str = "512M";

/// Operating system identity used for rule matching and native selection.
///
/// The three desktop families are a closed set; anything else carries the raw
/// `std::env::consts::OS` string and only ever matches rules by exact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Osx,
    Other(String),
}

impl Platform {
    /// Detect the platform the process is running on.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "macos" => Platform::Osx,
            other => Platform::Other(other.to_string()),
        }
    }

    /// Name used in profile rule documents.
    pub fn name(&self) -> &str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Osx => "osx",
            Platform::Other(name) => name,
        }
    }

    /// Filename tag identifying a native archive for this platform.
    /// `None` when no native bundles exist for the host.
    pub fn native_classifier(&self) -> Option<&'static str> {
        match self {
            Platform::Windows => Some("natives-windows"),
            Platform::Linux => Some("natives-linux"),
            Platform::Osx => Some("natives-osx"),
            Platform::Other(_) => None,
        }
    }

    /// Separator used when joining classpath entries into one string.
    pub fn classpath_separator(&self) -> &'static str {
        match self {
            Platform::Windows => ";",
            _ => ":",
        }
    }
}

/// Caller-supplied parameters for one launch preparation.
///
/// Read-only input to the pipeline; optional fields fall back to documented
/// defaults through the accessor methods instead of being filled in place.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Version identifier to prepare (e.g. "1.20.1" or a loader id).
    pub version_id: String,

    /// Installation root holding `versions/`, `libraries/` and `assets/`.
    pub data_dir: PathBuf,

    /// Player username.
    pub username: Option<String>,

    /// Access token; absent means unauthenticated.
    pub access_token: Option<String>,

    /// Player UUID.
    pub uuid: Option<String>,

    /// Java executable override.
    pub java_path: Option<PathBuf>,

    /// Maximum heap size (e.g. "4G").
    pub max_memory: Option<String>,

    /// Minimum heap size (e.g. "1G").
    pub min_memory: Option<String>,

    /// Window width, when a custom resolution is requested.
    pub window_width: Option<u32>,

    /// Window height, when a custom resolution is requested.
    pub window_height: Option<u32>,

    /// Extra game arguments appended after the substituted ones.
    pub game_args: Vec<String>,
}

impl LaunchSpec {
    /// A spec for `version_id` under `data_dir` with every override unset.
    pub fn new(version_id: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            version_id: version_id.into(),
            data_dir: data_dir.into(),
            username: None,
            access_token: None,
            uuid: None,
            java_path: None,
            max_memory: None,
            min_memory: None,
            window_width: None,
            window_height: None,
            game_args: Vec::new(),
        }
    }

    /// Effective player name.
    pub fn player_name(&self) -> &str {
        match self.username.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_PLAYER_NAME,
        }
    }

    /// Effective access token.
    pub fn token(&self) -> &str {
        match self.access_token.as_deref() {
            Some(token) if !token.is_empty() => token,
            _ => OFFLINE_ACCESS_TOKEN,
        }
    }

    /// Effective player UUID.
    pub fn player_uuid(&self) -> &str {
        match self.uuid.as_deref() {
            Some(uuid) if !uuid.is_empty() => uuid,
            _ => NIL_UUID,
        }
    }

    /// Effective Java executable path.
    pub fn java_executable(&self) -> PathBuf {
        self.java_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("java"))
    }

    /// Effective maximum heap size.
    pub fn heap_max(&self) -> &str {
        self.max_memory.as_deref().unwrap_or(DEFAULT_MAX_MEMORY)
    }

    /// Effective minimum heap size.
    pub fn heap_min(&self) -> &str {
        self.min_memory.as_deref().unwrap_or(DEFAULT_MIN_MEMORY)
    }

    /// Shared dependency archive root.
    pub fn libraries_dir(&self) -> PathBuf {
        self.data_dir.join("libraries")
    }

    /// Asset storage root.
    pub fn assets_dir(&self) -> PathBuf {
        self.data_dir.join("assets")
    }

    /// Root of all installed versions.
    pub fn versions_dir(&self) -> PathBuf {
        self.data_dir.join("versions")
    }

    /// Directory of the version being prepared.
    pub fn version_dir(&self) -> PathBuf {
        self.versions_dir().join(&self.version_id)
    }

    /// The version's own main archive path.
    pub fn version_jar(&self) -> PathBuf {
        self.version_dir().join(format!("{}.jar", self.version_id))
    }

    /// Flat staging directory for extracted native binaries.
    pub fn natives_dir(&self) -> PathBuf {
        self.version_dir().join("natives")
    }
}

/// A runnable process invocation: executable plus ordered argument vector.
///
/// Pure data; spawning, I/O wiring and waiting are the caller's concern.
#[derive(Debug, Clone)]
pub struct LaunchCommand {
    pub executable: PathBuf,
    pub args: Vec<String>,
}

/// Result of a full launch preparation, with non-fatal diagnostics attached.
#[derive(Debug)]
pub struct PreparedLaunch {
    /// The assembled invocation.
    pub command: LaunchCommand,

    /// Coordinates of declared libraries that could not be located on disk.
    pub missing_libraries: Vec<String>,

    /// Number of native files present in the staging directory.
    pub natives_extracted: usize,
}

/// Render a path as an absolute argument string, falling back to the raw
/// path when canonicalization fails (e.g. the directory does not exist yet).
pub(crate) fn display_path(path: &Path) -> String {
    dunce::canonicalize(path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string_lossy().to_string())
}
