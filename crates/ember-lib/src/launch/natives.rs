/// Idempotent native library extraction into a flat staging directory
use crate::error::LaunchError;
use crate::events::{EventSink, LaunchEvent};
use crate::launch::types::Platform;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

const NATIVE_SUFFIXES: [&str; 4] = [".dll", ".so", ".dylib", ".jnilib"];

/// Advisory locks keyed by staging directory, so two concurrent first-time
/// extractions for the same version cannot interleave partial writes.
static STAGING_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>> =
    Lazy::new(Default::default);

fn staging_lock(dir: &Path) -> Arc<tokio::sync::Mutex<()>> {
    let mut locks = STAGING_LOCKS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    locks.entry(dir.to_path_buf()).or_default().clone()
}

fn is_native_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    NATIVE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

fn count_native_files(dir: &Path) -> std::io::Result<usize> {
    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if is_native_file(&entry.file_name().to_string_lossy()) {
            count += 1;
        }
    }
    Ok(count)
}

/// Scan the dependency tree for platform-specific native archives and extract
/// their native binaries flat into `natives_dir`.
///
/// Idempotent: when the staging directory already holds at least one native
/// file the scan is skipped entirely and the existing count is returned.
/// A corrupt or unreadable archive is logged and skipped; ending up with an
/// empty staging directory is fatal because the target process cannot start
/// without its natives.
pub async fn extract_natives(
    libraries_dir: &Path,
    natives_dir: &Path,
    platform: &Platform,
    events: &EventSink,
    cancel: &CancellationToken,
) -> Result<usize, LaunchError> {
    let tag = platform
        .native_classifier()
        .ok_or_else(|| LaunchError::UnsupportedPlatform {
            os: platform.name().to_string(),
        })?;

    let lock = staging_lock(natives_dir);
    let _guard = lock.lock().await;

    tokio::fs::create_dir_all(natives_dir).await?;

    let existing = count_native_files(natives_dir)?;
    if existing > 0 {
        events.emit(LaunchEvent::NativesAlreadyExtracted {
            dir: natives_dir.to_path_buf(),
            count: existing,
        });
        return Ok(existing);
    }

    log::debug!(
        "scanning {:?} for native archives (tag: {})",
        libraries_dir,
        tag
    );

    for entry in WalkDir::new(libraries_dir).into_iter().filter_map(|e| e.ok()) {
        if cancel.is_cancelled() {
            return Err(LaunchError::Cancelled);
        }
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        let lower = file_name.to_lowercase();
        if !lower.ends_with(".jar") {
            continue;
        }
        if !lower.contains(tag) && !lower.contains("natives") {
            continue;
        }

        events.emit(LaunchEvent::NativeArchiveProcessing {
            name: file_name.into_owned(),
        });
        extract_archive(entry.path(), natives_dir, events, cancel)?;
    }

    let count = count_native_files(natives_dir)?;
    if count == 0 {
        return Err(LaunchError::NoNativesExtracted {
            dir: natives_dir.to_path_buf(),
        });
    }

    events.emit(LaunchEvent::NativesExtracted { count });
    Ok(count)
}

/// Extract the native-suffixed entries of one archive, flattened to their
/// base filename. Archive-level corruption is not fatal to the scan.
fn extract_archive(
    archive_path: &Path,
    natives_dir: &Path,
    events: &EventSink,
    cancel: &CancellationToken,
) -> Result<(), LaunchError> {
    let file = match std::fs::File::open(archive_path) {
        Ok(file) => file,
        Err(err) => {
            log::warn!("skipping unreadable native archive {:?}: {}", archive_path, err);
            return Ok(());
        }
    };
    let mut archive = match zip::ZipArchive::new(file) {
        Ok(archive) => archive,
        Err(err) => {
            log::warn!("skipping corrupt native archive {:?}: {}", archive_path, err);
            return Ok(());
        }
    };

    for index in 0..archive.len() {
        if cancel.is_cancelled() {
            return Err(LaunchError::Cancelled);
        }

        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable entry in {:?}: {}", archive_path, err);
                continue;
            }
        };

        if entry.is_dir() || entry.name().starts_with("META-INF/") {
            continue;
        }
        if !is_native_file(entry.name()) {
            continue;
        }

        // Flatten any internal directory structure.
        let base_name = match Path::new(entry.name()).file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        let target = natives_dir.join(&base_name);
        if target.exists() {
            continue;
        }

        let mut output = match std::fs::File::create(&target) {
            Ok(output) => output,
            Err(err) => {
                log::warn!("failed to create native file {:?}: {}", target, err);
                continue;
            }
        };
        match std::io::copy(&mut entry, &mut output) {
            Ok(_) => events.emit(LaunchEvent::NativeExtracted { file: base_name }),
            Err(err) => log::warn!("failed to extract {:?} from {:?}: {}", base_name, archive_path, err),
        }
    }

    Ok(())
}
