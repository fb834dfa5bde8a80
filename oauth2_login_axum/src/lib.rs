//! oauth2-login-axum - Axum integration for the oauth2-login flow
//!
//! Wires [`oauth2_login::OAuthFlow`] instances into an axum [`Router`]: one
//! `GET /{provider}` route per flow serving both the redirect and callback
//! legs, an anonymous session cookie binding the two legs together, and the
//! HTTP mapping of flow errors.
//!
//! ```no_run
//! use std::sync::Arc;
//! use oauth2_login::{GithubProvider, OAuthFlow, TracingDispatcher};
//! use oauth2_login_axum::{GuestResolver, O2L_ROUTE_PREFIX, oauth2_login_router};
//! # use oauth2_login::{FlowResponse, OAuth2Error, RegistrationSuggestions, ResponseFactory};
//! # struct MyResponses;
//! # #[async_trait::async_trait]
//! # impl ResponseFactory for MyResponses {
//! #     async fn make(&self, _: &str, _: &str, _: RegistrationSuggestions)
//! #         -> Result<FlowResponse, OAuth2Error> { unimplemented!() }
//! # }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! oauth2_login::init().await?;
//!
//! let github = OAuthFlow::new(
//!     Arc::new(GithubProvider::from_env()?),
//!     Arc::new(MyResponses),
//!     Arc::new(TracingDispatcher),
//! );
//!
//! let app = axum::Router::new().nest(
//!     O2L_ROUTE_PREFIX.as_str(),
//!     oauth2_login_router(vec![Arc::new(github)], Arc::new(GuestResolver)),
//! );
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

mod error;
mod oauth2;
mod router;
mod session;

pub use router::{oauth2_login_router, oauth2_login_router_no_trace};
pub use session::{ActorResolver, GuestResolver, O2L_SESSION_COOKIE_NAME};

// Re-export the route prefix and initialization function from oauth2-login
pub use oauth2_login::{O2L_ROUTE_PREFIX, init};
