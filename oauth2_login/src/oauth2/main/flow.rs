use async_trait::async_trait;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::config::{O2L_ORIGIN, O2L_ROUTE_PREFIX};
use crate::events::{AuthEvent, EventDispatcher, LinkingToProvider, OAuthLoginSuccessful};
use crate::oauth2::config::OAUTH2_DISPLAY_TYPE;
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::storage::LinkStore;
use crate::oauth2::types::{
    AccessToken, Actor, FlowRequest, FlowResponse, RegistrationSuggestions, ResourceOwner,
};
use crate::utils::gen_random_string;

use super::provider::OAuth2Provider;
use super::session::{
    OAuthSession, SESSION_LINK_TO, SESSION_OAUTH2_PROVIDER, SESSION_OAUTH2_STATE,
};

/// Body returned after a successful link. Closes the popup window and
/// notifies the opener.
pub const LINK_COMPLETE_HTML: &str =
    "<script>window.close(); window.opener.app.linkingComplete();</script>";

/// Builds the login response for the normal (non-linking) outcome.
///
/// The host application owns session issuance and user registration, so the
/// flow hands it the provider identity plus form pre-fill and lets it decide
/// whether this turns into a sign-in or a registration prompt.
#[async_trait]
pub trait ResponseFactory: Send + Sync {
    async fn make(
        &self,
        provider: &str,
        identifier: &str,
        suggestions: RegistrationSuggestions,
    ) -> Result<FlowResponse, OAuth2Error>;
}

/// Runs after the callback leg has produced a token and resource owner,
/// before the flow response is returned.
///
/// Returning `Ok(Some(response))` replaces the flow's own response, letting
/// an extension insert an extra step (two-factor prompt, terms acceptance)
/// between the provider callback and the final login. The interceptor can
/// stash the credentials with [`OAuthSession::enable_fast_track`] so the
/// flow resumes without a second provider round trip.
#[async_trait]
pub trait AfterSuccessInterceptor: Send + Sync {
    async fn handle(
        &self,
        request: &FlowRequest,
        token: &AccessToken,
        resource_owner: &ResourceOwner,
        provider: &str,
    ) -> Result<Option<FlowResponse>, OAuth2Error>;
}

/// The authorization-code login flow for one provider.
///
/// A single `handle` entry point serves both legs of the flow: a request
/// without a `code` query parameter starts the redirect leg, a request with
/// one completes the callback leg.
pub struct OAuthFlow {
    provider: Arc<dyn OAuth2Provider>,
    responses: Arc<dyn ResponseFactory>,
    events: Arc<dyn EventDispatcher>,
    interceptors: Vec<Arc<dyn AfterSuccessInterceptor>>,
}

impl OAuthFlow {
    pub fn new(
        provider: Arc<dyn OAuth2Provider>,
        responses: Arc<dyn ResponseFactory>,
        events: Arc<dyn EventDispatcher>,
    ) -> Self {
        Self {
            provider,
            responses,
            events,
            interceptors: Vec::new(),
        }
    }

    pub fn with_interceptors(
        mut self,
        interceptors: Vec<Arc<dyn AfterSuccessInterceptor>>,
    ) -> Self {
        self.interceptors = interceptors;
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// The redirect URI registered with the provider, e.g.
    /// `http://localhost:3000/auth/github`.
    pub fn callback_url(&self) -> String {
        format!(
            "{}{}/{}",
            *O2L_ORIGIN,
            *O2L_ROUTE_PREFIX,
            self.provider.name()
        )
    }

    /// Drive the flow one step for the given request.
    pub async fn handle(
        &self,
        request: FlowRequest,
        actor: &Actor,
    ) -> Result<FlowResponse, OAuth2Error> {
        let session = OAuthSession::new(request.session_id.clone());

        self.initialize_session(&request, &session).await?;

        // A prior interceptor may have stashed validated credentials so the
        // flow can resume without going back to the provider. The stash is
        // single-use.
        if session.fast_track_enabled().await? {
            let stashed = session.fast_track_data().await?;
            session.clear_fast_track().await?;
            if let Some(stashed) = stashed {
                tracing::debug!(
                    provider = self.provider.name(),
                    "resuming flow from stashed credentials"
                );
                return self
                    .handle_oauth_response(
                        &request,
                        stashed.token,
                        stashed.resource_owner,
                        &session,
                        actor,
                    )
                    .await;
            }
        }

        let Some(code) = request.query.code.as_deref() else {
            return self.redirect_to_authorization_url(&session).await;
        };

        self.validate_state(&session, request.query.state.as_deref())
            .await?;

        let token = self.provider.exchange_code(code, &self.callback_url()).await?;
        let resource_owner = self.provider.fetch_resource_owner(&token).await?;

        self.handle_oauth_response(&request, token, resource_owner, &session, actor)
            .await
    }

    async fn initialize_session(
        &self,
        request: &FlowRequest,
        session: &OAuthSession,
    ) -> Result<(), OAuth2Error> {
        session
            .put_forever(SESSION_OAUTH2_PROVIDER, self.provider.name())
            .await?;

        if let Some(link_to) = request.query.link_to.as_deref() {
            session.put(SESSION_LINK_TO, link_to).await?;
        }

        Ok(())
    }

    /// Redirect leg: mint a CSRF state nonce, remember it, and send the user
    /// agent to the provider's authorization endpoint.
    async fn redirect_to_authorization_url(
        &self,
        session: &OAuthSession,
    ) -> Result<FlowResponse, OAuth2Error> {
        let state = gen_random_string(32)?;

        session.put(SESSION_OAUTH2_STATE, &state).await?;

        let auth_url = self
            .provider
            .authorization_url(&self.callback_url(), &state)?;

        Ok(FlowResponse::Redirect(format!(
            "{auth_url}&display={OAUTH2_DISPLAY_TYPE}"
        )))
    }

    /// Callback leg CSRF check. The stored nonce is consumed atomically, so a
    /// duplicated callback cannot validate twice against the same nonce.
    async fn validate_state(
        &self,
        session: &OAuthSession,
        state: Option<&str>,
    ) -> Result<(), OAuth2Error> {
        let saved_state = session.take(SESSION_OAUTH2_STATE).await?;

        let valid = match (state, saved_state.as_deref()) {
            (Some(got), Some(saved)) => got.as_bytes().ct_eq(saved.as_bytes()).into(),
            _ => false,
        };

        if !valid {
            tracing::warn!(
                provider = self.provider.name(),
                "state mismatch on callback, aborting flow"
            );
            session.forget(SESSION_OAUTH2_STATE).await?;
            session.forget(SESSION_OAUTH2_PROVIDER).await?;
            return Err(OAuth2Error::InvalidState);
        }

        Ok(())
    }

    /// Link the acting user to the provider identity.
    async fn link(&self, user_id: i64, identifier: &str) -> Result<FlowResponse, OAuth2Error> {
        if let Some(existing) =
            LinkStore::get_by_identifier(self.provider.name(), identifier).await?
        {
            if existing.user_id != user_id {
                return Err(OAuth2Error::AlreadyLinked);
            }
        }

        self.events
            .dispatch(AuthEvent::LinkingToProvider(LinkingToProvider {
                provider: self.provider.name().to_string(),
                identifier: identifier.to_string(),
                user_id,
            }));

        LinkStore::create_or_touch(user_id, self.provider.name(), identifier).await?;

        Ok(FlowResponse::Html(LINK_COMPLETE_HTML.to_string()))
    }

    /// Post-credential dispatch: decide between the link and login outcomes,
    /// run interceptors, emit the success event, and clean up the state nonce.
    async fn handle_oauth_response(
        &self,
        request: &FlowRequest,
        token: AccessToken,
        resource_owner: ResourceOwner,
        session: &OAuthSession,
        actor: &Actor,
    ) -> Result<FlowResponse, OAuth2Error> {
        let identifier = self.provider.identifier(&resource_owner)?;

        let link_requested = session.has(SESSION_LINK_TO).await?;

        let response = match actor {
            // Don't register a new user, just link to the existing account.
            Actor::Member { id, registered } if link_requested => {
                if !registered {
                    return Err(OAuth2Error::RegistrationRequired);
                }

                let link_to = session
                    .take(SESSION_LINK_TO)
                    .await?
                    .and_then(|v| v.parse::<i64>().ok())
                    .unwrap_or(0);

                if *id != link_to || link_to == 0 {
                    return Err(OAuth2Error::AccountMismatch);
                }

                self.link(*id, &identifier).await?
            }
            _ => {
                let suggestions = self.provider.suggestions(&resource_owner, &token);
                self.responses
                    .make(self.provider.name(), &identifier, suggestions)
                    .await?
            }
        };

        // The first interceptor that returns a response replaces ours, but
        // the success event and state cleanup happen either way.
        let mut short_circuit = None;
        for interceptor in &self.interceptors {
            if let Some(result) = interceptor
                .handle(request, &token, &resource_owner, self.provider.name())
                .await?
            {
                short_circuit = Some(result);
                break;
            }
        }

        self.events
            .dispatch(AuthEvent::LoginSuccessful(OAuthLoginSuccessful {
                token,
                resource_owner,
                provider: self.provider.name().to_string(),
                identifier,
                actor: actor.clone(),
            }));

        session.forget(SESSION_OAUTH2_STATE).await?;

        Ok(short_circuit.unwrap_or(response))
    }
}
