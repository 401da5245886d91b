use poem::{
    get, handler,
    http::{header, StatusCode},
    session::{CookieConfig, MemoryStorage, ServerSession, Session},
    test::{TestClient, TestResponse},
    Endpoint, EndpointExt, Route,
};
use poem_sessionconductor::{ConductorConfig, SessionConductor};

#[handler]
fn login(session: &Session) {
    session.set("user_id", 1);
    session.set("cart", vec![1, 2]);
    session.set("flash", "welcome");
}

#[handler]
fn show(session: &Session) -> String {
    serde_json::to_string(&session.entries()).unwrap()
}

fn session_cookie(resp: &TestResponse) -> Option<String> {
    resp.0
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(ToString::to_string)
}

async fn get_with_cookie<E: Endpoint>(
    cli: &TestClient<E>,
    uri: &str,
    cookie: &str,
) -> TestResponse {
    cli.get(uri).header(header::COOKIE, cookie).send().await
}

#[tokio::test]
async fn conduct_across_requests() {
    let base = SessionConductor::new().save(["user_id", "cart"]);
    let app = Route::new()
        .at("/login", get(login))
        .at("/browse", get(show).with(base.clone().skip(["flash"])))
        .at("/flash", get(show).with(base.clone().save(["flash"])))
        .at("/logout", get(show).with(SessionConductor::new()))
        .at("/account", get(show).with(base.ensure("user_id")))
        .with(ServerSession::new(
            CookieConfig::default(),
            MemoryStorage::new(),
        ));
    let cli = TestClient::new(app);

    let resp = cli.get("/login").send().await;
    resp.assert_status_is_ok();
    let cookie = session_cookie(&resp).expect("session cookie");

    let resp = get_with_cookie(&cli, "/browse", &cookie).await;
    resp.assert_status_is_ok();
    resp.assert_text(r#"{"cart":[1,2],"user_id":1}"#).await;

    let resp = get_with_cookie(&cli, "/flash", &cookie).await;
    resp.assert_status_is_ok();
    resp.assert_text(r#"{"cart":[1,2],"flash":"welcome","user_id":1}"#)
        .await;

    let resp = get_with_cookie(&cli, "/account", &cookie).await;
    resp.assert_status_is_ok();
    resp.assert_text(r#"{"cart":[1,2],"user_id":1}"#).await;

    let resp = get_with_cookie(&cli, "/logout", &cookie).await;
    resp.assert_status_is_ok();
    resp.assert_text("{}").await;

    let resp = get_with_cookie(&cli, "/account", &cookie).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn conductor_from_config() {
    let config: ConductorConfig = serde_json::from_str(
        r#"{
            "destroy": ["flash"],
            "ensure_defaults": { "locale": "en" },
            "assign": { "visited": true }
        }"#,
    )
    .unwrap();
    let app = Route::new()
        .at("/login", get(login))
        .at("/", get(show).with(SessionConductor::from(config)))
        .with(ServerSession::new(
            CookieConfig::default(),
            MemoryStorage::new(),
        ));
    let cli = TestClient::new(app);

    let resp = cli.get("/login").send().await;
    let cookie = session_cookie(&resp).expect("session cookie");

    let resp = get_with_cookie(&cli, "/", &cookie).await;
    resp.assert_status_is_ok();
    resp.assert_text(r#"{"cart":[1,2],"locale":"en","user_id":1}"#)
        .await;

    let resp = get_with_cookie(&cli, "/", &cookie).await;
    resp.assert_text(r#"{"cart":[1,2],"locale":"en","user_id":1,"visited":true}"#)
        .await;
}
