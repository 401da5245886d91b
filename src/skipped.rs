use poem::session::Session;
use serde_json::Value;

/// Session entries suppressed while an endpoint runs.
///
/// The entries are written back by [`SkippedEntries::restore`], or when the
/// guard is dropped, so they come back even if the request future is
/// cancelled.
pub(crate) struct SkippedEntries {
    session: Session,
    entries: Vec<(String, Value)>,
}

impl SkippedEntries {
    /// Removes the present `keys` from the session and remembers their values.
    ///
    /// Keys missing from the session are not recorded, so they stay missing
    /// after restoration.
    pub(crate) fn take(session: &Session, keys: &[String]) -> Self {
        let mut current = session.entries();
        let mut entries = Vec::new();
        for key in keys {
            if let Some(value) = current.remove(key) {
                session.remove(key);
                entries.push((key.clone(), value));
            }
        }
        if !entries.is_empty() {
            tracing::debug!(
                keys = ?entries.iter().map(|(key, _)| key).collect::<Vec<_>>(),
                "session keys skipped"
            );
        }
        Self {
            session: session.clone(),
            entries,
        }
    }

    pub(crate) fn restore(mut self) {
        self.restore_entries();
    }

    fn restore_entries(&mut self) {
        for (key, value) in self.entries.drain(..) {
            self.session.set(&key, value);
        }
    }
}

impl Drop for SkippedEntries {
    fn drop(&mut self) {
        self.restore_entries();
    }
}
