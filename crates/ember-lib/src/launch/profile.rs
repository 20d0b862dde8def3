/// Version profile model, storage and inheritance resolution
use crate::error::LaunchError;
use crate::events::{EventSink, LaunchEvent};
use crate::launch::rules::Rule;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Resolved launch description for one version identifier.
///
/// Loaded from `versions/<id>/<id>.json`; after [`resolve_profile`] the
/// parent chain has been merged in and the value is treated as immutable.
/// `inherits_from` is retained so the one-level parent-jar fallback can
/// consult it after resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionProfile {
    /// Version identifier (e.g. "1.20.1" or "fabric-loader-0.14.9-1.19.2").
    pub id: String,

    /// Fully-qualified entry point class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,

    /// Parent version this profile inherits from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherits_from: Option<String>,

    /// Legacy flat argument template with `${token}` placeholders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minecraft_arguments: Option<String>,

    /// Structured, rule-conditioned argument lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Arguments>,

    /// Asset index identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<String>,

    /// Ordered dependency declarations; order is significant and preserved
    /// through merges.
    #[serde(default)]
    pub libraries: Vec<Library>,
}

/// Game- and process-side argument lists of the structured protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<Argument>,

    #[serde(default)]
    pub jvm: Vec<Argument>,
}

/// One entry of a structured argument list: either a literal token or a
/// rule-conditioned value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Literal(String),

    Conditional {
        rules: Vec<Rule>,
        value: ArgumentValue,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Single(String),
    Multiple(Vec<String>),
}

/// One dependency declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    /// `group:artifact:version` coordinate.
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads: Option<LibraryDownloads>,

    /// Rules for conditional inclusion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryDownloads {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifiers: Option<HashMap<String, Artifact>>,
}

/// On-disk descriptor of one artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Read-only source of profile documents by version identifier.
pub trait ProfileStore {
    /// Raw bytes of the profile document for `id`.
    fn load(&self, id: &str) -> std::io::Result<Vec<u8>>;

    /// Location the document is (or would be) loaded from, for diagnostics.
    fn location(&self, id: &str) -> PathBuf;
}

/// [`ProfileStore`] reading `<versions_dir>/<id>/<id>.json`.
#[derive(Debug, Clone)]
pub struct DirProfileStore {
    versions_dir: PathBuf,
}

impl DirProfileStore {
    pub fn new(versions_dir: impl Into<PathBuf>) -> Self {
        Self {
            versions_dir: versions_dir.into(),
        }
    }
}

impl ProfileStore for DirProfileStore {
    fn load(&self, id: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.location(id))
    }

    fn location(&self, id: &str) -> PathBuf {
        self.versions_dir.join(id).join(format!("{}.json", id))
    }
}

/// Load the profile for `id` and merge in its full parent chain.
///
/// Inheritance is resolved recursively, parent first; a repeated identifier
/// in the chain fails with [`LaunchError::CyclicInheritance`] instead of
/// recursing forever.
pub fn resolve_profile(
    store: &dyn ProfileStore,
    id: &str,
    events: &EventSink,
) -> Result<VersionProfile, LaunchError> {
    let mut chain = Vec::new();
    resolve_inner(store, id, &mut chain, events)
}

fn resolve_inner(
    store: &dyn ProfileStore,
    id: &str,
    chain: &mut Vec<String>,
    events: &EventSink,
) -> Result<VersionProfile, LaunchError> {
    if chain.iter().any(|seen| seen == id) {
        chain.push(id.to_string());
        return Err(LaunchError::CyclicInheritance {
            id: id.to_string(),
            chain: chain.join(" -> "),
        });
    }
    chain.push(id.to_string());

    let bytes = store.load(id).map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            LaunchError::ProfileNotFound {
                id: id.to_string(),
                path: store.location(id),
            }
        } else {
            LaunchError::Io(err)
        }
    })?;

    let mut profile: VersionProfile =
        serde_json::from_slice(&bytes).map_err(|source| LaunchError::ProfileParse {
            id: id.to_string(),
            source,
        })?;

    if let Some(parent_id) = profile.inherits_from.clone() {
        log::debug!("profile {} inherits from {}", id, parent_id);
        let parent = resolve_inner(store, &parent_id, chain, events).map_err(|source| {
            LaunchError::ParentResolution {
                child: id.to_string(),
                parent: parent_id.clone(),
                source: Box::new(source),
            }
        })?;
        profile = merge_profiles(parent, profile);
        events.emit(LaunchEvent::ProfilesMerged {
            child: id.to_string(),
            parent: parent_id,
        });
    }

    Ok(profile)
}

/// Merge a resolved parent into its child.
///
/// Scalars keep the child's value when non-empty, otherwise inherit the
/// parent's; libraries concatenate parent-first with no deduplication.
pub(crate) fn merge_profiles(parent: VersionProfile, mut child: VersionProfile) -> VersionProfile {
    fn inherit(child: Option<String>, parent: Option<String>) -> Option<String> {
        match child {
            Some(value) if !value.is_empty() => Some(value),
            _ => parent,
        }
    }

    child.main_class = inherit(child.main_class, parent.main_class);
    child.minecraft_arguments = inherit(child.minecraft_arguments, parent.minecraft_arguments);
    child.assets = inherit(child.assets, parent.assets);

    if child.arguments.is_none() {
        child.arguments = parent.arguments;
    }

    let mut libraries = parent.libraries;
    libraries.append(&mut child.libraries);
    child.libraries = libraries;

    child
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::events::LaunchEvent;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// In-memory store for resolver tests.
    pub(crate) struct MapProfileStore {
        documents: HashMap<String, Vec<u8>>,
    }

    impl MapProfileStore {
        pub(crate) fn new() -> Self {
            Self {
                documents: HashMap::new(),
            }
        }

        pub(crate) fn insert(&mut self, id: &str, json: &str) {
            self.documents.insert(id.to_string(), json.as_bytes().to_vec());
        }
    }

    impl ProfileStore for MapProfileStore {
        fn load(&self, id: &str) -> std::io::Result<Vec<u8>> {
            self.documents
                .get(id)
                .cloned()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }

        fn location(&self, id: &str) -> PathBuf {
            PathBuf::from(format!("mem://{}.json", id))
        }
    }

    fn library_json(name: &str) -> String {
        format!(r#"{{"name": "{}"}}"#, name)
    }

    #[test]
    fn resolve_without_parent_passes_through() {
        let mut store = MapProfileStore::new();
        store.insert(
            "1.20.1",
            r#"{"id": "1.20.1", "mainClass": "net.minecraft.client.main.Main", "assets": "5"}"#,
        );

        let profile = resolve_profile(&store, "1.20.1", &EventSink::disabled()).unwrap();
        assert_eq!(profile.id, "1.20.1");
        assert_eq!(profile.main_class.as_deref(), Some("net.minecraft.client.main.Main"));
        assert!(profile.inherits_from.is_none());
    }

    #[test]
    fn three_level_chain_concatenates_libraries_parent_first() {
        let mut store = MapProfileStore::new();
        store.insert(
            "a",
            &format!(
                r#"{{"id": "a", "mainClass": "M", "libraries": [{}]}}"#,
                library_json("g:la:1")
            ),
        );
        store.insert(
            "b",
            &format!(
                r#"{{"id": "b", "inheritsFrom": "a", "libraries": [{}]}}"#,
                library_json("g:lb:1")
            ),
        );
        store.insert(
            "c",
            &format!(
                r#"{{"id": "c", "inheritsFrom": "b", "libraries": [{}]}}"#,
                library_json("g:lc:1")
            ),
        );

        let profile = resolve_profile(&store, "c", &EventSink::disabled()).unwrap();

        let names: Vec<&str> = profile.libraries.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["g:la:1", "g:lb:1", "g:lc:1"]);
        // Scalars walk child -> root and keep the first non-empty value.
        assert_eq!(profile.main_class.as_deref(), Some("M"));
        assert_eq!(profile.id, "c");
    }

    #[test]
    fn duplicate_coordinates_are_retained() {
        let mut store = MapProfileStore::new();
        store.insert(
            "parent",
            &format!(
                r#"{{"id": "parent", "mainClass": "M", "libraries": [{}]}}"#,
                library_json("g:dup:1")
            ),
        );
        store.insert(
            "child",
            &format!(
                r#"{{"id": "child", "inheritsFrom": "parent", "libraries": [{}]}}"#,
                library_json("g:dup:1")
            ),
        );

        let profile = resolve_profile(&store, "child", &EventSink::disabled()).unwrap();
        assert_eq!(profile.libraries.len(), 2);
    }

    #[test]
    fn child_scalars_win_when_non_empty() {
        let mut store = MapProfileStore::new();
        store.insert(
            "base",
            r#"{"id": "base", "mainClass": "Parent", "assets": "5", "minecraftArguments": "--old"}"#,
        );
        store.insert(
            "mod",
            r#"{"id": "mod", "inheritsFrom": "base", "mainClass": "Child"}"#,
        );

        let profile = resolve_profile(&store, "mod", &EventSink::disabled()).unwrap();
        assert_eq!(profile.main_class.as_deref(), Some("Child"));
        assert_eq!(profile.assets.as_deref(), Some("5"));
        assert_eq!(profile.minecraft_arguments.as_deref(), Some("--old"));
        // Kept so the parent-jar fallback can consult it.
        assert_eq!(profile.inherits_from.as_deref(), Some("base"));
    }

    #[test]
    fn missing_profile_reports_not_found() {
        let store = MapProfileStore::new();
        let err = resolve_profile(&store, "ghost", &EventSink::disabled()).unwrap_err();
        assert!(matches!(err, LaunchError::ProfileNotFound { ref id, .. } if id == "ghost"));
    }

    #[test]
    fn malformed_document_reports_parse_error() {
        let mut store = MapProfileStore::new();
        store.insert("broken", "{not json");
        let err = resolve_profile(&store, "broken", &EventSink::disabled()).unwrap_err();
        assert!(matches!(err, LaunchError::ProfileParse { ref id, .. } if id == "broken"));
    }

    #[test]
    fn missing_parent_wraps_cause() {
        let mut store = MapProfileStore::new();
        store.insert("orphan", r#"{"id": "orphan", "inheritsFrom": "ghost"}"#);

        let err = resolve_profile(&store, "orphan", &EventSink::disabled()).unwrap_err();
        match err {
            LaunchError::ParentResolution { child, parent, source } => {
                assert_eq!(child, "orphan");
                assert_eq!(parent, "ghost");
                assert!(matches!(*source, LaunchError::ProfileNotFound { .. }));
            }
            other => panic!("expected ParentResolution, got {:?}", other),
        }
    }

    #[test]
    fn inheritance_cycle_fails_fast() {
        let mut store = MapProfileStore::new();
        store.insert("x", r#"{"id": "x", "inheritsFrom": "y"}"#);
        store.insert("y", r#"{"id": "y", "inheritsFrom": "x"}"#);

        let err = resolve_profile(&store, "x", &EventSink::disabled()).unwrap_err();
        // The cycle surfaces wrapped in the parent-resolution chain.
        let mut cause: &LaunchError = &err;
        while let LaunchError::ParentResolution { source, .. } = cause {
            cause = source;
        }
        assert!(matches!(cause, LaunchError::CyclicInheritance { .. }));
    }

    #[test]
    fn merge_emits_diagnostic_event() {
        let mut store = MapProfileStore::new();
        store.insert("p", r#"{"id": "p", "mainClass": "M"}"#);
        store.insert("c", r#"{"id": "c", "inheritsFrom": "p"}"#);

        let merges: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let merges_clone = merges.clone();
        let sink = EventSink::new(move |event| {
            if let LaunchEvent::ProfilesMerged { child, parent } = event {
                merges_clone.lock().unwrap().push((child.clone(), parent.clone()));
            }
        });

        resolve_profile(&store, "c", &sink).unwrap();
        assert_eq!(
            *merges.lock().unwrap(),
            vec![("c".to_string(), "p".to_string())]
        );
    }

    #[test]
    fn structured_arguments_inherited_when_child_has_none() {
        let mut store = MapProfileStore::new();
        store.insert(
            "base",
            r#"{"id": "base", "mainClass": "M", "arguments": {"game": ["--demo"]}}"#,
        );
        store.insert("mod", r#"{"id": "mod", "inheritsFrom": "base"}"#);

        let profile = resolve_profile(&store, "mod", &EventSink::disabled()).unwrap();
        let arguments = profile.arguments.expect("inherited arguments");
        assert_eq!(arguments.game.len(), 1);
    }
}
