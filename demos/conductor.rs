//! Run with
//!
//! ```not_rust
//! cargo run --example conductor
//! ```
use poem::{
    get, handler,
    listener::TcpListener,
    session::{CookieConfig, MemoryStorage, ServerSession, Session},
    EndpointExt, Route, Server,
};
use poem_sessionconductor::SessionConductor;

#[handler]
fn login(session: &Session) -> &'static str {
    session.set("user_id", 1);
    session.set("flash", "Welcome back!");
    "logged in"
}

#[handler]
fn index(session: &Session) -> String {
    match session.get::<String>("flash") {
        Some(flash) => {
            session.remove("flash");
            format!("{flash} You have been here {} times.", visits(session))
        }
        None => format!("You have been here {} times.", visits(session)),
    }
}

#[handler]
fn logout() -> &'static str {
    "logged out"
}

fn visits(session: &Session) -> u32 {
    let visits = session.get::<u32>("visits").unwrap_or_default() + 1;
    session.set("visits", visits);
    visits
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "poem=debug,poem_sessionconductor=debug");
    }
    tracing_subscriber::fmt::init();

    let base = SessionConductor::new().save(["user_id", "visits"]);
    let app = Route::new()
        .at("/login", get(login))
        .at(
            "/",
            get(index).with(base.clone().save(["flash"]).ensure("user_id")),
        )
        .at("/quiet", get(index).with(base.skip(["flash"]).ensure("user_id")))
        .at("/logout", get(logout).with(SessionConductor::new()))
        .with(ServerSession::new(
            CookieConfig::default().secure(false),
            MemoryStorage::new(),
        ));

    Server::new(TcpListener::bind("0.0.0.0:3000"))
        .run(app)
        .await
}
