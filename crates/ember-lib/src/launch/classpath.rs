/// Classpath resolution with multi-strategy path probing
use crate::error::LaunchError;
use crate::events::{EventSink, LaunchEvent};
use crate::launch::profile::VersionProfile;
use crate::launch::rules::{rules_allow, FeatureContext};
use crate::launch::types::{LaunchSpec, Platform};
use std::path::{Path, PathBuf};

/// Ordered classpath entries plus the coordinates that could not be located.
///
/// Built fresh per invocation; a missing dependency is never fatal here, the
/// caller decides whether the unresolved set is acceptable.
#[derive(Debug)]
pub struct ClasspathResolution {
    pub entries: Vec<PathBuf>,
    pub missing: Vec<String>,
}

/// Locate the version's main archive, falling back to the parent's jar
/// (one level only) when the version's own jar is absent.
pub fn resolve_main_archive(
    spec: &LaunchSpec,
    profile: &VersionProfile,
    events: &EventSink,
) -> Result<PathBuf, LaunchError> {
    let own = spec.version_jar();
    if own.is_file() {
        return Ok(own);
    }

    if let Some(parent) = profile.inherits_from.as_deref() {
        let parent_jar = spec
            .versions_dir()
            .join(parent)
            .join(format!("{}.jar", parent));
        if parent_jar.is_file() {
            events.emit(LaunchEvent::UsingParentJar {
                parent: parent.to_string(),
            });
            return Ok(parent_jar);
        }
        return Err(LaunchError::MainArchiveNotFound {
            version: spec.version_id.clone(),
            probed: vec![own, parent_jar],
        });
    }

    Err(LaunchError::MainArchiveNotFound {
        version: spec.version_id.clone(),
        probed: vec![own],
    })
}

/// Locate every applicable dependency archive on disk, in declaration order,
/// and append the already-resolved main archive last.
///
/// Per library, the primary artifact path under the shared dependency root is
/// tried first; on a miss the coordinate is probed against the version
/// directory and both dependency-root layouts. Unlocatable coordinates are
/// collected, not fatal.
pub fn build_classpath(
    profile: &VersionProfile,
    spec: &LaunchSpec,
    main_jar: &Path,
    platform: &Platform,
    features: &FeatureContext,
    events: &EventSink,
) -> ClasspathResolution {
    let libraries_dir = spec.libraries_dir();
    let version_dir = spec.version_dir();

    let mut entries = Vec::new();
    let mut missing = Vec::new();

    for library in &profile.libraries {
        if let Some(ref rules) = library.rules {
            if !rules_allow(rules, platform, features) {
                continue;
            }
        }

        if let Some(relative) = library
            .downloads
            .as_ref()
            .and_then(|d| d.artifact.as_ref())
            .and_then(|a| a.path.as_deref())
        {
            let full = libraries_dir.join(relative);
            if full.is_file() {
                entries.push(full);
                continue;
            }
            log::debug!(
                "declared artifact path missing for {}, probing coordinate: {:?}",
                library.name,
                full
            );
        }

        match probe_coordinate(&library.name, &libraries_dir, &version_dir) {
            Some(found) => {
                events.emit(LaunchEvent::LibraryFoundByProbe {
                    name: library.name.clone(),
                    path: found.clone(),
                });
                entries.push(found);
            }
            None => {
                log::warn!("library not found on disk: {}", library.name);
                events.emit(LaunchEvent::LibraryMissing {
                    name: library.name.clone(),
                });
                missing.push(library.name.clone());
            }
        }
    }

    entries.push(main_jar.to_path_buf());
    events.emit(LaunchEvent::ClasspathBuilt {
        entries: entries.len(),
        missing: missing.len(),
    });

    ClasspathResolution { entries, missing }
}

/// Probe the known on-disk layouts for a `group:artifact:version` coordinate.
/// Candidates are tried in strict priority order; first hit wins.
fn probe_coordinate(coordinate: &str, libraries_dir: &Path, version_dir: &Path) -> Option<PathBuf> {
    let mut parts = coordinate.split(':');
    let group = parts.next()?;
    let artifact = parts.next()?;
    let version = parts.next()?;
    if group.is_empty() || artifact.is_empty() || version.is_empty() {
        return None;
    }

    let group_path: PathBuf = group.split('.').collect();
    let jar_name = format!("{}-{}.jar", artifact, version);

    let candidates = [
        version_dir.join(&jar_name),
        libraries_dir
            .join(&group_path)
            .join(artifact)
            .join(version)
            .join(&jar_name),
        libraries_dir.join(&group_path).join(artifact).join(&jar_name),
        version_dir.join(format!("{}.jar", coordinate)),
    ];

    candidates.into_iter().find(|candidate| candidate.is_file())
}

/// Join resolved entries into one platform-delimited classpath string.
pub fn join_classpath(entries: &[PathBuf], platform: &Platform) -> String {
    entries
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(platform.classpath_separator())
}
