use poem::{session::Session, Result};

use crate::{ConductorError, EnsureRule};

/// Callbacks invoked by the [`SessionConductor`](crate::SessionConductor)
/// while it conducts a request.
///
/// Every method has a default implementation, and `()` uses all of them.
///
/// # Example
///
/// ```
/// use poem::session::Session;
/// use poem_sessionconductor::{ConductorHooks, SessionConductor};
///
/// #[derive(Clone)]
/// struct Audit;
///
/// impl ConductorHooks for Audit {
///     fn skipped_removed(&self, session: &Session) {
///         session.set("_skipping", true);
///     }
///
///     fn skipped_pre_restore(&self, session: &Session) {
///         session.remove("_skipping");
///     }
/// }
///
/// let conductor = SessionConductor::new().skip(["cart"]).with_hooks(Audit);
/// ```
pub trait ConductorHooks: Send + Sync + 'static {
    /// Called when a key declared with `ensure` is missing from the session.
    ///
    /// The default implementation fills the key if the rule provides a value
    /// and fails with [`ConductorError::MissingKey`] otherwise.
    fn missing_key(&self, session: &Session, key: &str, rule: &EnsureRule) -> Result<()> {
        match rule.fill_value() {
            Some(value) => {
                tracing::debug!(key = key, "filled missing session key");
                session.set(key, value);
                Ok(())
            }
            None => {
                tracing::warn!(key = key, "session is missing a required key");
                Err(ConductorError::MissingKey(key.to_string()).into())
            }
        }
    }

    /// Called after the skipped keys have been removed from the session,
    /// before the endpoint runs.
    fn skipped_removed(&self, _session: &Session) {}

    /// Called after the endpoint has run, before the skipped keys are
    /// restored.
    fn skipped_pre_restore(&self, _session: &Session) {}
}

impl ConductorHooks for () {}
