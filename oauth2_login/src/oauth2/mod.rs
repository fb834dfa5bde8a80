mod config;
mod errors;
mod main;
pub(crate) mod providers;
mod storage;
mod types;

pub use errors::OAuth2Error;
pub use main::{
    AfterSuccessInterceptor, LINK_COMPLETE_HTML, OAuth2Provider, OAuthFlow, OAuthSession,
    ResponseFactory,
};
pub use types::{
    AccessToken, Actor, CallbackQuery, FlowRequest, FlowResponse, LoginProviderLink,
    RegistrationSuggestions, ResourceOwner,
};

pub(crate) use storage::LinkStore;
pub(crate) use types::StoredOAuthData;

pub(crate) async fn init() -> Result<(), OAuth2Error> {
    crate::storage::init()
        .await
        .map_err(|e| OAuth2Error::Storage(e.to_string()))?;

    LinkStore::init().await?;

    Ok(())
}
