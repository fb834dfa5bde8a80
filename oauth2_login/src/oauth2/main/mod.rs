mod flow;
mod provider;
mod session;

pub use flow::{
    AfterSuccessInterceptor, LINK_COMPLETE_HTML, OAuthFlow, ResponseFactory,
};
pub use provider::OAuth2Provider;
pub use session::OAuthSession;

pub(crate) use provider::get_client;
pub(crate) use session::{SESSION_LINK_TO, SESSION_OAUTH2_PROVIDER, SESSION_OAUTH2_STATE};
