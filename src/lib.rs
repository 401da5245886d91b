//! Session variable management for Poem endpoints.
//!
//! [`SessionConductor`] is a middleware that runs around an endpoint and
//! manages the variables of the request's
//! [`Session`](poem::session::Session):
//!
//! - **reset** the session, removing every variable that is not kept,
//! - **destroy** specific variables,
//! - **save** specific variables from a reset, or **assign** values to them,
//! - **skip** variables, hiding them while the endpoint runs,
//! - **ensure** variables are present, or fill them with defaults.
//!
//! The session itself is provided by one of Poem's session middlewares, which
//! must wrap the conductor.
//!
//! # Example
//!
//! ```
//! use poem::{
//!     get, handler,
//!     session::{CookieConfig, CookieSession, Session},
//!     EndpointExt, Route,
//! };
//! use poem_sessionconductor::SessionConductor;
//!
//! #[handler]
//! fn login(session: &Session) {
//!     session.set("user_id", 1);
//! }
//!
//! #[handler]
//! fn wizard(session: &Session) -> String {
//!     format!("step {}", session.get::<u32>("step").unwrap_or(1))
//! }
//!
//! let app = Route::new()
//!     .at("/login", get(login))
//!     .at(
//!         "/wizard",
//!         get(wizard).with(
//!             SessionConductor::new()
//!                 .save(["step"])
//!                 .ensure("user_id")
//!                 .ensure_or("step", 1),
//!         ),
//!     )
//!     .with(CookieSession::new(CookieConfig::default()));
//! ```

#![doc(html_favicon_url = "https://poem.rs/assets/favicon.ico")]
#![doc(html_logo_url = "https://poem.rs/assets/logo.png")]
#![forbid(unsafe_code)]
#![deny(unreachable_pub)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

mod conductor;
mod config;
mod error;
mod hooks;
mod plan;
mod skipped;
#[cfg(test)]
mod test_harness;

pub use conductor::{SessionConductor, SessionConductorEndpoint};
pub use config::ConductorConfig;
pub use error::ConductorError;
pub use hooks::ConductorHooks;
pub use plan::{destroy, reset, EnsureRule, DEFAULT_PROTECTED_PREFIX};
