/// Diagnostic event channel for launch preparation
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Progress and diagnostic events emitted while a launch command is prepared.
///
/// Events are informational only and never drive control flow; a caller that
/// ignores them observes identical pipeline behaviour.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LaunchEvent {
    /// A child profile was merged with its resolved parent.
    ProfilesMerged { child: String, parent: String },

    /// The version's own jar is absent; the parent's jar is used instead.
    UsingParentJar { parent: String },

    /// A declared library could not be located on disk.
    LibraryMissing { name: String },

    /// A library without a primary artifact path was located by coordinate probing.
    LibraryFoundByProbe { name: String, path: PathBuf },

    /// The staging directory already holds native files; extraction was skipped.
    NativesAlreadyExtracted { dir: PathBuf, count: usize },

    /// A candidate native archive is being scanned.
    NativeArchiveProcessing { name: String },

    /// One native binary was written into the staging directory.
    NativeExtracted { file: String },

    /// Native extraction finished with the given number of staged files.
    NativesExtracted { count: usize },

    /// Classpath resolution finished.
    ClasspathBuilt { entries: usize, missing: usize },

    /// The full launch command was assembled.
    PreparationComplete { version: String, main_class: String },
}

/// Callback invoked synchronously for every emitted event.
pub type EventCallback = Arc<dyn Fn(&LaunchEvent) + Send + Sync + 'static>;

/// Per-invocation sink for [`LaunchEvent`]s.
///
/// Each pipeline invocation receives its own sink, so concurrent launches do
/// not share listener state. The default sink discards everything.
#[derive(Clone, Default)]
pub struct EventSink {
    callback: Option<EventCallback>,
}

impl EventSink {
    /// Create a sink delivering events to `callback`.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&LaunchEvent) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    /// A sink that drops all events.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Deliver an event to the registered callback, if any.
    pub fn emit(&self, event: LaunchEvent) {
        log::debug!("launch event: {:?}", event);
        if let Some(ref callback) = self.callback {
            callback(&event);
        }
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("attached", &self.callback.is_some())
            .finish()
    }
}
