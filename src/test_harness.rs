use poem::{session::Session, Endpoint, IntoResponse, Request, Response, Result};
use serde_json::Value;

pub(crate) fn session_with(entries: &[(&str, Value)]) -> Session {
    let session = Session::default();
    for (key, value) in entries {
        session.set(key, value);
    }
    session
}

/// Calls `ep` with `session` attached to the request, the way a session
/// middleware would.
pub(crate) async fn call_with<E: Endpoint>(ep: &E, session: &Session) -> Result<Response> {
    let req = Request::builder().extension(session.clone()).finish();
    ep.call(req).await.map(IntoResponse::into_response)
}
