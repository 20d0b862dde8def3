/// Argument substitution for both template protocols
use crate::launch::profile::{Argument, ArgumentValue, VersionProfile};
use crate::launch::rules::{rules_allow, FeatureContext};
use crate::launch::types::{display_path, LaunchSpec, Platform};
use std::collections::HashMap;
use std::path::Path;

/// Fixed account-type tag used for all substituted arguments.
const USER_TYPE: &str = "legacy";

/// Assemble the process-side (JVM) flags: heap bounds, the native library
/// path property and the classpath.
pub fn build_jvm_arguments(spec: &LaunchSpec, natives_dir: &Path, classpath: &str) -> Vec<String> {
    vec![
        format!("-Xmx{}", spec.heap_max()),
        format!("-Xms{}", spec.heap_min()),
        format!("-Djava.library.path={}", display_path(natives_dir)),
        "-cp".to_string(),
        classpath.to_string(),
    ]
}

/// Assemble the game-side arguments from whichever template protocol the
/// profile carries.
///
/// Structured entries are expanded with full rule evaluation; the legacy flat
/// template is substituted and whitespace-split. A profile with neither
/// protocol gets the canonical flag list. Caller-supplied extras come last.
pub fn build_game_arguments(
    spec: &LaunchSpec,
    profile: &VersionProfile,
    platform: &Platform,
) -> Vec<String> {
    let variables = game_variables(spec, profile);
    let features = FeatureContext::from_spec(spec);

    let mut args = Vec::new();
    if let Some(ref arguments) = profile.arguments {
        for argument in &arguments.game {
            args.extend(expand_argument(argument, &variables, platform, &features));
        }
    } else if let Some(ref template) = profile.minecraft_arguments {
        let substituted = substitute_variables(template, &variables);
        args.extend(substituted.split_whitespace().map(str::to_string));
    } else {
        args.extend(canonical_game_arguments(spec, &variables));
    }

    args.extend(
        spec.game_args
            .iter()
            .filter(|arg| !arg.trim().is_empty())
            .cloned(),
    );

    args
}

/// Expand one structured argument entry into zero or more tokens.
///
/// Rule-excluded entries expand to nothing. A token containing a placeholder
/// with no (or an empty) value is dropped whole, and for multi-value entries
/// the whole group is dropped, so no orphan flag is ever emitted.
fn expand_argument(
    argument: &Argument,
    variables: &HashMap<String, String>,
    platform: &Platform,
    features: &FeatureContext,
) -> Vec<String> {
    match argument {
        Argument::Literal(text) => {
            if contains_empty_placeholder(text, variables) {
                return Vec::new();
            }
            split_preserving_quotes(&substitute_variables(text, variables))
        }
        Argument::Conditional { rules, value } => {
            if !rules_allow(rules, platform, features) {
                return Vec::new();
            }
            match value {
                ArgumentValue::Single(text) => {
                    if contains_empty_placeholder(text, variables) {
                        return Vec::new();
                    }
                    split_preserving_quotes(&substitute_variables(text, variables))
                }
                ArgumentValue::Multiple(parts) => {
                    let mut out = Vec::new();
                    for part in parts {
                        if contains_empty_placeholder(part, variables) {
                            return Vec::new();
                        }
                        out.extend(split_preserving_quotes(&substitute_variables(
                            part, variables,
                        )));
                    }
                    out
                }
            }
        }
    }
}

/// The fixed flag list emitted when a profile declares no argument template.
fn canonical_game_arguments(
    spec: &LaunchSpec,
    variables: &HashMap<String, String>,
) -> Vec<String> {
    let lookup = |key: &str| variables.get(key).cloned().unwrap_or_default();
    vec![
        "--username".to_string(),
        spec.player_name().to_string(),
        "--version".to_string(),
        spec.version_id.clone(),
        "--gameDir".to_string(),
        lookup("game_directory"),
        "--assetsDir".to_string(),
        lookup("assets_root"),
        "--assetIndex".to_string(),
        lookup("assets_index_name"),
        "--uuid".to_string(),
        spec.player_uuid().to_string(),
        "--accessToken".to_string(),
        spec.token().to_string(),
        "--userType".to_string(),
        USER_TYPE.to_string(),
    ]
}

/// Replace every `${key}` occurrence with its mapped value.
pub fn substitute_variables(text: &str, variables: &HashMap<String, String>) -> String {
    let mut result = text.to_string();
    for (key, value) in variables {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

/// True when `text` holds a placeholder that is missing from `variables` or
/// maps to an empty value.
fn contains_empty_placeholder(text: &str, variables: &HashMap<String, String>) -> bool {
    let mut index = 0usize;
    while let Some(start) = text[index..].find("${") {
        let key_start = index + start + 2;
        let Some(end_offset) = text[key_start..].find('}') else {
            // No closing brace; treat as a bad placeholder.
            return true;
        };
        let key_end = key_start + end_offset;
        match variables.get(&text[key_start..key_end]) {
            Some(value) if !value.trim().is_empty() => {}
            _ => return true,
        }
        index = key_end + 1;
    }
    false
}

/// Split on whitespace while respecting single and double quotes; quotes are
/// stripped from the returned tokens.
pub(crate) fn split_preserving_quotes(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_double = false;
    let mut in_single = false;

    for c in text.chars() {
        match c {
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            c if c.is_whitespace() && !in_double && !in_single => {
                if !buf.is_empty() {
                    out.push(std::mem::take(&mut buf));
                }
            }
            c => buf.push(c),
        }
    }
    if !buf.is_empty() {
        out.push(buf);
    }

    out
}

/// Fixed key -> value map shared by both protocols.
fn game_variables(spec: &LaunchSpec, profile: &VersionProfile) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    vars.insert("auth_player_name".to_string(), spec.player_name().to_string());
    vars.insert("auth_uuid".to_string(), spec.player_uuid().to_string());
    vars.insert("auth_access_token".to_string(), spec.token().to_string());
    vars.insert("user_type".to_string(), USER_TYPE.to_string());
    vars.insert("user_properties".to_string(), "{}".to_string());

    vars.insert("version_name".to_string(), spec.version_id.clone());
    vars.insert("game_directory".to_string(), display_path(&spec.data_dir));
    vars.insert("assets_root".to_string(), display_path(&spec.assets_dir()));
    vars.insert(
        "assets_index_name".to_string(),
        profile.assets.clone().unwrap_or_default(),
    );

    if let (Some(width), Some(height)) = (spec.window_width, spec.window_height) {
        vars.insert("resolution_width".to_string(), width.to_string());
        vars.insert("resolution_height".to_string(), height.to_string());
    }

    vars
}
