use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{plan::DEFAULT_PROTECTED_PREFIX, SessionConductor};

/// A serializable configuration for [`SessionConductor`].
///
/// Every field is optional when deserializing.
///
/// # Example
///
/// ```
/// use poem_sessionconductor::{ConductorConfig, SessionConductor};
///
/// let config: ConductorConfig = serde_json::from_str(
///     r#"{
///         "save": ["cart"],
///         "skip": ["flash"],
///         "ensure": ["user_id"],
///         "ensure_defaults": { "locale": "en" }
///     }"#,
/// )
/// .unwrap();
/// let conductor = SessionConductor::from(config);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConductorConfig {
    /// Keys kept by a reset.
    pub save: Vec<String>,
    /// Keys removed before the endpoint runs. A non-empty list disables the
    /// reset.
    pub destroy: Vec<String>,
    /// Keys removed while the endpoint runs and restored afterwards.
    pub skip: Vec<String>,
    /// Keys that must be present in the session.
    pub ensure: Vec<String>,
    /// Keys that are filled with a default value when missing.
    pub ensure_defaults: BTreeMap<String, Value>,
    /// Key/value pairs written into the session after the endpoint runs.
    pub assign: BTreeMap<String, Value>,
    /// Keys starting with this prefix are never removed by a reset.
    pub protected_prefix: String,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            save: Vec::new(),
            destroy: Vec::new(),
            skip: Vec::new(),
            ensure: Vec::new(),
            ensure_defaults: BTreeMap::new(),
            assign: BTreeMap::new(),
            protected_prefix: DEFAULT_PROTECTED_PREFIX.to_string(),
        }
    }
}

impl From<ConductorConfig> for SessionConductor {
    fn from(config: ConductorConfig) -> Self {
        let mut conductor = SessionConductor::new()
            .save(config.save)
            .destroy(config.destroy)
            .skip(config.skip)
            .protected_prefix(config.protected_prefix);
        for key in config.ensure {
            conductor = conductor.ensure(key);
        }
        for (key, value) in config.ensure_defaults {
            conductor = conductor.ensure_or(key, value);
        }
        for (key, value) in config.assign {
            conductor = conductor.assign(key, value);
        }
        conductor
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::EnsureRule;

    #[test]
    fn defaults() {
        let config: ConductorConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, ConductorConfig::default());
        assert_eq!(config.protected_prefix, "_");
    }

    #[test]
    fn into_conductor() {
        let config: ConductorConfig = serde_json::from_value(json!({
            "save": ["a"],
            "destroy": ["b"],
            "skip": ["c"],
            "ensure": ["d"],
            "ensure_defaults": { "e": 1 },
            "assign": { "f": "x" },
            "protected_prefix": "__",
        }))
        .unwrap();
        let conductor = SessionConductor::from(config);
        let plan = conductor.plan();

        assert_eq!(plan.save, vec!["a"]);
        assert_eq!(plan.destroy, vec!["b"]);
        assert_eq!(plan.skip, vec!["c"]);
        assert!(matches!(plan.ensure.get("d"), Some(EnsureRule::Required)));
        assert!(matches!(
            plan.ensure.get("e"),
            Some(EnsureRule::Default(value)) if *value == json!(1)
        ));
        assert_eq!(plan.assign.get("f"), Some(&json!("x")));
        assert_eq!(plan.protected_prefix, "__");
        assert_eq!(conductor.keeps(), vec!["a", "c", "d", "e"]);
    }
}
