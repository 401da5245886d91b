use std::sync::Arc;

use poem::{session::Session, Endpoint, Middleware, Request, Result};
use serde::Serialize;
use serde_json::Value;

use crate::{
    plan::{ConductorPlan, EnsureRule},
    skipped::SkippedEntries,
    ConductorError, ConductorHooks,
};

/// Middleware that resets, destroys, saves, skips and ensures session
/// variables around an endpoint.
///
/// For each request the endpoint:
///
/// 1. Checks the keys declared with [`ensure`](Self::ensure),
///    [`ensure_or`](Self::ensure_or) or [`ensure_with`](Self::ensure_with).
/// 2. Removes the [`destroy`](Self::destroy) keys if there are any, otherwise
///    resets the session: every key that is not saved, skipped or ensured and
///    does not start with the [protected prefix](Self::protected_prefix) is
///    removed.
/// 3. Removes the [`skip`](Self::skip) keys.
/// 4. Calls the inner endpoint.
/// 5. Restores the skipped keys, even if the inner endpoint failed.
/// 6. Writes the [`assign`](Self::assign) values.
///
/// Builder methods are additive, so a base conductor can be cloned and
/// extended for each route.
///
/// The conductor needs a session, so it must be wrapped by a session
/// middleware such as [`CookieSession`](poem::session::CookieSession) or
/// [`ServerSession`](poem::session::ServerSession).
///
/// # Example
///
/// ```
/// use poem::{
///     get, handler,
///     session::{CookieConfig, CookieSession, Session},
///     EndpointExt, Route,
/// };
/// use poem_sessionconductor::SessionConductor;
///
/// #[handler]
/// fn checkout(session: &Session) -> String {
///     format!("{:?}", session.get::<Vec<u32>>("cart"))
/// }
///
/// let base = SessionConductor::new().save(["cart"]);
/// let app = Route::new()
///     .at("/checkout", get(checkout).with(base.clone().skip(["coupon"])))
///     .with(CookieSession::new(CookieConfig::default()));
/// ```
#[derive(Debug, Clone)]
pub struct SessionConductor<H = ()> {
    plan: ConductorPlan,
    hooks: H,
}

impl Default for SessionConductor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConductor {
    /// Create a `SessionConductor` that resets the session before the
    /// endpoint runs.
    pub fn new() -> Self {
        Self {
            plan: ConductorPlan::default(),
            hooks: (),
        }
    }
}

impl<H> SessionConductor<H> {
    /// Keeps these keys when the session is reset.
    ///
    /// Keys listed in [`destroy`](Self::destroy) are still removed.
    #[must_use]
    pub fn save<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.plan.save.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Removes these keys before the endpoint runs.
    ///
    /// If any destroy keys are declared, only those keys are removed and the
    /// session is not reset.
    #[must_use]
    pub fn destroy<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.plan.destroy.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Removes these keys while the endpoint runs and restores them
    /// afterwards.
    #[must_use]
    pub fn skip<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.plan.skip.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Requires this key to be present in the session.
    ///
    /// A request whose session lacks the key fails with
    /// [`ConductorError::MissingKey`], unless the hooks decide otherwise.
    #[must_use]
    pub fn ensure(self, key: impl Into<String>) -> Self {
        self.ensure_rule(key, EnsureRule::Required)
    }

    /// Fills this key with `value` when it is missing from the session.
    ///
    /// If `value` cannot be serialized the key is still ensured, but as a
    /// required key.
    #[must_use]
    pub fn ensure_or(self, key: impl Into<String>, value: impl Serialize) -> Self {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => self.ensure_rule(key, EnsureRule::Default(value)),
            Err(err) => {
                tracing::warn!(
                    key = %key,
                    error = %err,
                    "failed to serialize the default value, the key is required instead"
                );
                self.ensure_rule(key, EnsureRule::Required)
            }
        }
    }

    /// Fills this key with the value returned by `f` when it is missing from
    /// the session.
    #[must_use]
    pub fn ensure_with<F>(self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.ensure_rule(key, EnsureRule::With(Arc::new(f)))
    }

    /// Declares an ensured key with an explicit rule.
    #[must_use]
    pub fn ensure_rule(mut self, key: impl Into<String>, rule: EnsureRule) -> Self {
        self.plan.ensure.insert(key.into(), rule);
        self
    }

    /// Writes this key/value pair into the session after the endpoint runs.
    #[must_use]
    pub fn assign(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.plan.assign.insert(key, value);
            }
            Err(err) => {
                tracing::warn!(
                    key = %key,
                    error = %err,
                    "failed to serialize the assigned value, the assignment is ignored"
                );
            }
        }
        self
    }

    /// Sets the prefix of the keys that a reset never removes. Default is
    /// `_`.
    ///
    /// An empty prefix protects nothing.
    #[must_use]
    pub fn protected_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.plan.protected_prefix = prefix.into();
        self
    }

    /// Specifies the hooks called while conducting a request.
    pub fn with_hooks<T: ConductorHooks>(self, hooks: T) -> SessionConductor<T> {
        SessionConductor {
            plan: self.plan,
            hooks,
        }
    }

    /// Returns the keys that a reset leaves in place: the saved, skipped and
    /// ensured keys.
    pub fn keeps(&self) -> Vec<String> {
        self.plan.keeps()
    }

    #[cfg(test)]
    pub(crate) fn plan(&self) -> &ConductorPlan {
        &self.plan
    }
}

impl<E: Endpoint, H: ConductorHooks + Clone> Middleware<E> for SessionConductor<H> {
    type Output = SessionConductorEndpoint<E, H>;

    fn transform(&self, ep: E) -> Self::Output {
        SessionConductorEndpoint {
            inner: ep,
            plan: Arc::new(self.plan.clone()),
            hooks: Arc::new(self.hooks.clone()),
        }
    }
}

/// Endpoint for the `SessionConductor` middleware.
pub struct SessionConductorEndpoint<E, H> {
    inner: E,
    plan: Arc<ConductorPlan>,
    hooks: Arc<H>,
}

impl<E, H> SessionConductorEndpoint<E, H>
where
    H: ConductorHooks,
{
    fn ensure(&self, session: &Session) -> Result<()> {
        if self.plan.ensure.is_empty() {
            return Ok(());
        }
        let entries = session.entries();
        for (key, rule) in &self.plan.ensure {
            if !entries.contains_key(key) {
                self.hooks.missing_key(session, key, rule)?;
            }
        }
        Ok(())
    }
}

impl<E, H> Endpoint for SessionConductorEndpoint<E, H>
where
    E: Endpoint,
    H: ConductorHooks,
{
    type Output = E::Output;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let session = match req.extensions().get::<Session>() {
            Some(session) => session.clone(),
            None => {
                tracing::warn!("no session attached to the request");
                return Err(ConductorError::SessionNotFound.into());
            }
        };

        self.ensure(&session)?;
        self.plan.cleanup(&session);

        let skipped = SkippedEntries::take(&session, &self.plan.skip);
        self.hooks.skipped_removed(&session);

        let res = self.inner.call(req).await;

        self.hooks.skipped_pre_restore(&session);
        skipped.restore();
        self.plan.apply_assignments(&session);

        res
    }
}
