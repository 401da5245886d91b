use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use poem::session::Session;
use serde_json::Value;

/// Keys starting with this prefix are never removed by a reset.
pub const DEFAULT_PROTECTED_PREFIX: &str = "_";

/// What to do when an ensured key is missing from the session.
#[derive(Clone)]
pub enum EnsureRule {
    /// The key must be present, the request fails otherwise.
    Required,

    /// Insert this value when the key is missing.
    Default(Value),

    /// Insert the value returned by this function when the key is missing.
    With(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl Debug for EnsureRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EnsureRule::Required => f.write_str("Required"),
            EnsureRule::Default(value) => f.debug_tuple("Default").field(value).finish(),
            EnsureRule::With(_) => f.write_str("With(..)"),
        }
    }
}

impl EnsureRule {
    /// Returns the value to fill a missing key with, or `None` if the key is
    /// required.
    pub fn fill_value(&self) -> Option<Value> {
        match self {
            EnsureRule::Required => None,
            EnsureRule::Default(value) => Some(value.clone()),
            EnsureRule::With(f) => Some(f()),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ConductorPlan {
    pub(crate) save: Vec<String>,
    pub(crate) destroy: Vec<String>,
    pub(crate) skip: Vec<String>,
    pub(crate) ensure: BTreeMap<String, EnsureRule>,
    pub(crate) assign: BTreeMap<String, Value>,
    pub(crate) protected_prefix: String,
}

impl Default for ConductorPlan {
    fn default() -> Self {
        Self {
            save: Vec::new(),
            destroy: Vec::new(),
            skip: Vec::new(),
            ensure: BTreeMap::new(),
            assign: BTreeMap::new(),
            protected_prefix: DEFAULT_PROTECTED_PREFIX.to_string(),
        }
    }
}

impl ConductorPlan {
    /// Keys left in place by a reset: saved, skipped and ensured keys.
    pub(crate) fn keeps(&self) -> Vec<String> {
        let mut keeps = Vec::with_capacity(self.save.len() + self.skip.len() + self.ensure.len());
        for key in self
            .save
            .iter()
            .chain(&self.skip)
            .chain(self.ensure.keys())
        {
            if !keeps.contains(key) {
                keeps.push(key.clone());
            }
        }
        keeps
    }

    /// Removes the destroy keys, or resets the session when there are none.
    pub(crate) fn cleanup(&self, session: &Session) {
        if self.destroy.is_empty() {
            let removed = reset(session, &self.keeps(), &self.protected_prefix);
            if !removed.is_empty() {
                tracing::debug!(keys = ?removed, "session reset");
            }
        } else {
            let removed = destroy(session, &self.destroy);
            if !removed.is_empty() {
                tracing::debug!(keys = ?removed, "session keys destroyed");
            }
        }
    }

    pub(crate) fn apply_assignments(&self, session: &Session) {
        for (key, value) in &self.assign {
            session.set(key, value);
        }
    }
}

/// Resets a session.
///
/// Removes every key that is not in `keeps` and does not start with
/// `protected_prefix`. An empty prefix protects nothing. Returns the removed
/// keys.
pub fn reset(session: &Session, keeps: &[String], protected_prefix: &str) -> Vec<String> {
    let removed = session
        .entries()
        .into_keys()
        .filter(|key| !is_protected(key, protected_prefix) && !keeps.contains(key))
        .collect::<Vec<_>>();
    for key in &removed {
        session.remove(key);
    }
    removed
}

/// Removes the given keys from a session.
///
/// Keys that are not present are ignored. Returns the removed keys.
pub fn destroy(session: &Session, keys: &[String]) -> Vec<String> {
    let entries = session.entries();
    let mut removed = Vec::new();
    for key in keys {
        if entries.contains_key(key) && !removed.contains(key) {
            session.remove(key);
            removed.push(key.clone());
        }
    }
    removed
}

fn is_protected(key: &str, prefix: &str) -> bool {
    !prefix.is_empty() && key.starts_with(prefix)
}
