/// Launch command orchestration
use crate::error::LaunchError;
use crate::events::{EventSink, LaunchEvent};
use crate::launch::arguments::{build_game_arguments, build_jvm_arguments};
use crate::launch::classpath::{build_classpath, join_classpath, resolve_main_archive};
use crate::launch::natives::extract_natives;
use crate::launch::profile::{resolve_profile, DirProfileStore, ProfileStore};
use crate::launch::rules::FeatureContext;
use crate::launch::types::{LaunchCommand, LaunchSpec, Platform, PreparedLaunch};
use tokio_util::sync::CancellationToken;

/// Entry point class used when no profile in the chain declares one.
const DEFAULT_MAIN_CLASS: &str = "net.minecraft.client.main.Main";

/// Prepare the full launch invocation for the host platform.
///
/// Profiles are read from `<data_dir>/versions`. The returned value is pure
/// data; nothing is spawned.
pub async fn prepare_command(
    spec: &LaunchSpec,
    events: &EventSink,
    cancel: &CancellationToken,
) -> Result<PreparedLaunch, LaunchError> {
    let store = DirProfileStore::new(spec.versions_dir());
    prepare_command_with(spec, &Platform::current(), &store, events, cancel).await
}

/// [`prepare_command`] with an injected platform and profile store.
///
/// Stages run strictly in order; a fatal stage aborts everything after it,
/// so a natives failure means no argument building happens at all.
pub async fn prepare_command_with(
    spec: &LaunchSpec,
    platform: &Platform,
    store: &dyn ProfileStore,
    events: &EventSink,
    cancel: &CancellationToken,
) -> Result<PreparedLaunch, LaunchError> {
    log::info!("preparing launch command for {}", spec.version_id);

    let profile = resolve_profile(store, &spec.version_id, events)?;

    let main_jar = resolve_main_archive(spec, &profile, events)?;

    let natives_dir = spec.natives_dir();
    let natives_extracted = extract_natives(
        &spec.libraries_dir(),
        &natives_dir,
        platform,
        events,
        cancel,
    )
    .await?;

    let features = FeatureContext::from_spec(spec);
    let resolution = build_classpath(&profile, spec, &main_jar, platform, &features, events);
    let classpath = join_classpath(&resolution.entries, platform);

    let mut args = build_jvm_arguments(spec, &natives_dir, &classpath);

    let main_class = profile
        .main_class
        .clone()
        .filter(|class| !class.is_empty())
        .unwrap_or_else(|| DEFAULT_MAIN_CLASS.to_string());
    args.push(main_class.clone());

    args.extend(build_game_arguments(spec, &profile, platform));

    events.emit(LaunchEvent::PreparationComplete {
        version: spec.version_id.clone(),
        main_class,
    });

    Ok(PreparedLaunch {
        command: LaunchCommand {
            executable: spec.java_executable(),
            args,
        },
        missing_libraries: resolution.missing,
        natives_extracted,
    })
}
