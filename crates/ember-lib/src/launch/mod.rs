pub mod arguments;
pub mod classpath;
pub mod command;
pub mod natives;
pub mod profile;
pub mod rules;
/// Launch preparation pipeline: profile resolution through command assembly
pub mod types;

// Re-export commonly used items
pub use arguments::{build_game_arguments, build_jvm_arguments, substitute_variables};
pub use classpath::{build_classpath, join_classpath, resolve_main_archive, ClasspathResolution};
pub use command::{prepare_command, prepare_command_with};
pub use natives::extract_natives;
pub use profile::{
    resolve_profile, Argument, ArgumentValue, Arguments, Artifact, DirProfileStore, Library,
    LibraryDownloads, ProfileStore, VersionProfile,
};
pub use rules::{rules_allow, FeatureContext, OsRule, Rule, RuleAction};
pub use types::{LaunchCommand, LaunchSpec, Platform, PreparedLaunch};
