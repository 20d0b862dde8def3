/// Platform and feature rule evaluation
use crate::launch::types::{LaunchSpec, Platform, DEFAULT_PLAYER_NAME, NIL_UUID, OFFLINE_ACCESS_TOKEN};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Allow/deny condition scoping a library or argument to specific hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub action: RuleAction,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<HashMap<String, bool>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Runtime feature flags consulted by feature-gated argument rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureContext {
    pub demo_user: bool,
    pub custom_resolution: bool,
}

impl FeatureContext {
    /// Derive the feature flags from the caller's parameters.
    pub fn from_spec(spec: &LaunchSpec) -> Self {
        Self {
            demo_user: spec.player_name() == DEFAULT_PLAYER_NAME
                || spec.player_uuid() == NIL_UUID
                || spec.token() == OFFLINE_ACCESS_TOKEN,
            custom_resolution: spec.window_width.is_some() && spec.window_height.is_some(),
        }
    }
}

/// Decide whether a rule set applies on the given platform.
///
/// An empty set always applies. A disallow rule matching the host (or
/// unscoped) is an absolute veto regardless of position; otherwise the
/// result is whether any allow rule matched.
pub fn rules_allow(rules: &[Rule], platform: &Platform, features: &FeatureContext) -> bool {
    if rules.is_empty() {
        return true;
    }

    let mut allowed = false;
    for rule in rules {
        if !rule_matches(rule, platform, features) {
            continue;
        }
        match rule.action {
            RuleAction::Allow => allowed = true,
            RuleAction::Disallow => return false,
        }
    }

    allowed
}

fn rule_matches(rule: &Rule, platform: &Platform, features: &FeatureContext) -> bool {
    if let Some(ref os) = rule.os {
        if let Some(ref name) = os.name {
            if name != platform.name() {
                return false;
            }
        }
    }

    if let Some(ref required) = rule.features {
        for (key, expected) in required {
            let actual = match key.as_str() {
                "is_demo_user" => features.demo_user,
                "has_custom_resolution" => features.custom_resolution,
                // Unknown feature keys never match.
                _ => return false,
            };
            if actual != *expected {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow(name: Option<&str>) -> Rule {
        Rule {
            action: RuleAction::Allow,
            os: name.map(|n| OsRule {
                name: Some(n.to_string()),
            }),
            features: None,
        }
    }

    fn disallow(name: Option<&str>) -> Rule {
        Rule {
            action: RuleAction::Disallow,
            os: name.map(|n| OsRule {
                name: Some(n.to_string()),
            }),
            features: None,
        }
    }

    #[test]
    fn empty_rules_always_apply() {
        assert!(rules_allow(&[], &Platform::Linux, &FeatureContext::default()));
    }

    #[test]
    fn matching_allow_applies() {
        let rules = [allow(Some("linux"))];
        assert!(rules_allow(&rules, &Platform::Linux, &FeatureContext::default()));
        assert!(!rules_allow(&rules, &Platform::Windows, &FeatureContext::default()));
    }

    #[test]
    fn disallow_vetoes_regardless_of_order() {
        let rules = [allow(None), disallow(Some("osx"))];
        assert!(!rules_allow(&rules, &Platform::Osx, &FeatureContext::default()));
        assert!(rules_allow(&rules, &Platform::Linux, &FeatureContext::default()));

        let reversed = [disallow(Some("osx")), allow(None)];
        assert!(!rules_allow(&reversed, &Platform::Osx, &FeatureContext::default()));
    }

    #[test]
    fn unscoped_disallow_vetoes_everywhere() {
        let rules = [allow(None), disallow(None)];
        assert!(!rules_allow(&rules, &Platform::Linux, &FeatureContext::default()));
    }

    #[test]
    fn no_matching_allow_means_excluded() {
        let rules = [allow(Some("windows"))];
        assert!(!rules_allow(&rules, &Platform::Linux, &FeatureContext::default()));
    }

    #[test]
    fn raw_platform_identifier_matches_exactly() {
        let rules = [allow(Some("haiku"))];
        assert!(rules_allow(
            &rules,
            &Platform::Other("haiku".to_string()),
            &FeatureContext::default()
        ));
        assert!(!rules_allow(&rules, &Platform::Linux, &FeatureContext::default()));
    }

    #[test]
    fn feature_rules_consult_context() {
        let mut features = HashMap::new();
        features.insert("is_demo_user".to_string(), true);
        let rule = Rule {
            action: RuleAction::Allow,
            os: None,
            features: Some(features),
        };

        let demo = FeatureContext {
            demo_user: true,
            custom_resolution: false,
        };
        let authed = FeatureContext::default();

        assert!(rules_allow(std::slice::from_ref(&rule), &Platform::Linux, &demo));
        assert!(!rules_allow(std::slice::from_ref(&rule), &Platform::Linux, &authed));
    }

    #[test]
    fn unknown_feature_key_never_matches() {
        let mut features = HashMap::new();
        features.insert("is_quick_play".to_string(), true);
        let rule = Rule {
            action: RuleAction::Allow,
            os: None,
            features: Some(features),
        };

        assert!(!rules_allow(
            std::slice::from_ref(&rule),
            &Platform::Linux,
            &FeatureContext::default()
        ));
    }

    #[test]
    fn rule_action_deserializes_lowercase() {
        let rule: Rule =
            serde_json::from_str(r#"{"action": "disallow", "os": {"name": "osx"}}"#).unwrap();
        assert_eq!(rule.action, RuleAction::Disallow);
        assert_eq!(rule.os.unwrap().name.as_deref(), Some("osx"));
    }
}
