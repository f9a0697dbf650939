use super::client::{path_segment, ApiRequest, Client};
use super::storage::TokenStorage;
use super::token;
use super::user::User;
use super::{Credentials, TokenPair};
use crate::errors::GigzError;
#[cfg(not(windows))]
use colorful::{Color, Colorful};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::watch;

/// Where the session is in its lifecycle, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Initializing,
    Authenticated,
    Anonymous,
}

/// In-memory session. The access token lives here only; the refresh token lives only in `TokenStorage`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Startup. The persisted refresh token has not been tried yet.
    Initializing,
    Anonymous,
    Authenticated { access_token: String, user: User },
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Initializing => SessionStatus::Initializing,
            SessionState::Anonymous => SessionStatus::Anonymous,
            SessionState::Authenticated { .. } => SessionStatus::Authenticated,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { access_token, .. } => Some(access_token),
            _ => None,
        }
    }
}

/// Owns the token pair and the authentication lifecycle.
///
/// Share it behind an `Arc`; the resource stores take one at construction.
pub struct SessionManager {
    pub(crate) client: Client,
    storage: Arc<dyn TokenStorage>,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    /// Creates a session manager in the `Initializing` state. Call `initialize()` before trusting `status()`.
    pub fn new(client: Client, storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            client,
            storage,
            state: watch::Sender::new(SessionState::Initializing),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token().map(str::to_string)
    }

    /// Receiver that sees every session transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Tries the persisted refresh token once and reports where that left the session.
    pub async fn initialize(&self) -> SessionStatus {
        self.silent_refresh().await;
        self.status()
    }

    /// Logs in and fetches the user the access token was issued for.
    ///
    /// Any rejection from the API is reported as `InvalidCredentials`. The session is only
    /// updated once both the token pair and the user are known.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, GigzError> {
        self.debug_line("[AUTH] Logging in...");

        let request = ApiRequest::post("/users/login").json(credentials)?;
        let tokens = match self.client.api_call::<TokenPair>(request).await {
            Ok(tokens) => tokens,
            Err(
                GigzError::Unauthorized | GigzError::NotFound | GigzError::ValidationError(_),
            ) => {
                self.debug_line("[AUTH] Login rejected.");
                return Err(GigzError::InvalidCredentials);
            }
            Err(err) => {
                self.debug_line(&format!("[AUTH] Login failed: {}", err));
                return Err(err);
            }
        };

        let user = self.establish(tokens).await?;

        self.debug_line(&format!("[AUTH] Welcome, {}.", user.username));

        Ok(user)
    }

    /// Ends the session. Never fails: the server is told on a best-effort basis,
    /// local state is always cleared.
    pub async fn logout(&self) {
        match self.storage.load() {
            Ok(Some(refresh_token)) => {
                let request = ApiRequest::post("/users/logout")
                    .json(&json!({ "refreshToken": refresh_token }));

                let result = match request {
                    Ok(request) => self.client.api_call_raw(request).await.map(|_| ()),
                    Err(err) => Err(err),
                };

                if let Err(err) = result {
                    tracing::warn!("server-side logout failed, clearing local session anyway: {}", err);
                }
            }
            Ok(None) => {}
            Err(err) => tracing::warn!("could not read stored refresh token: {}", err),
        }

        self.teardown();
        self.debug_line("[AUTH] Logged out.");
    }

    /// Exchanges the stored refresh token for a new pair and returns the new access token.
    ///
    /// Returns `None` when there is no stored token or the exchange fails. A failed exchange
    /// tears the session down exactly like `logout()`. Never returns an error.
    pub async fn silent_refresh(&self) -> Option<String> {
        let refresh_token = match self.storage.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.leave_initializing();
                return None;
            }
            Err(err) => {
                tracing::warn!("could not read stored refresh token: {}", err);
                self.leave_initializing();
                return None;
            }
        };

        match self.redeem(&refresh_token).await {
            Ok(access_token) => {
                self.debug_line("[AUTH] Session refreshed.");
                Some(access_token)
            }
            Err(err) => {
                tracing::warn!(error = %err, "{}", GigzError::SessionExpired);
                self.debug_line(&format!("[AUTH] {}", GigzError::SessionExpired));
                self.logout().await;
                None
            }
        }
    }

    /// Sends `request` with the current access token, refreshing and replaying it at most once on a 401.
    ///
    /// A replay that is rejected again is returned as `Unauthorized`; no second refresh is attempted.
    pub async fn with_auth<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, GigzError> {
        let body = self.with_auth_raw(request).await?;
        serde_json::from_value(body).or(Err(GigzError::FailedToDecode))
    }

    /// `with_auth` without decoding the body.
    pub async fn with_auth_raw(&self, request: ApiRequest) -> Result<Value, GigzError> {
        let attempt = request.clone().bearer(self.access_token());

        match self.client.api_call_raw(attempt).await {
            Err(GigzError::Unauthorized) => {}
            other => return other,
        }

        tracing::debug!(path = %request.path, "request unauthorized, trying a silent refresh");

        match self.silent_refresh().await {
            Some(access_token) => {
                self.client
                    .api_call_raw(request.bearer(Some(access_token)))
                    .await
            }
            None => Err(GigzError::Unauthorized),
        }
    }

    /// Redeems `refresh_token` and installs the resulting session.
    async fn redeem(&self, refresh_token: &str) -> Result<String, GigzError> {
        let request =
            ApiRequest::post("/users/refresh-token").json(&json!({ "refreshToken": refresh_token }))?;
        let tokens = self.client.api_call::<TokenPair>(request).await?;
        let access_token = tokens.access_token.clone();

        self.establish(tokens).await?;

        Ok(access_token)
    }

    /// Resolves the user behind a fresh token pair, persists the refresh token and publishes the session.
    async fn establish(&self, tokens: TokenPair) -> Result<User, GigzError> {
        let email = token::subject_email(&tokens.access_token)?;

        let request = ApiRequest::get(&format!("/users/{}", path_segment(&email)))
            .bearer(Some(tokens.access_token.clone()));
        let user = self.client.api_call::<User>(request).await?;

        self.storage.save(&tokens.refresh_token)?;

        tracing::debug!(email = %user.email, "session authenticated");
        self.state.send_replace(SessionState::Authenticated {
            access_token: tokens.access_token,
            user: user.clone(),
        });

        Ok(user)
    }

    /// Swaps the session user after a profile change. No-op when not authenticated.
    pub(crate) fn replace_user(&self, user: User) {
        self.state.send_if_modified(|state| match state {
            SessionState::Authenticated { user: current, .. } => {
                *current = user;
                true
            }
            _ => false,
        });
    }

    fn teardown(&self) {
        if let Err(err) = self.storage.clear() {
            tracing::warn!("could not clear stored refresh token: {}", err);
        }

        tracing::debug!("session cleared");
        self.state.send_replace(SessionState::Anonymous);
    }

    fn leave_initializing(&self) {
        self.state.send_if_modified(|state| {
            if *state == SessionState::Initializing {
                *state = SessionState::Anonymous;
                true
            } else {
                false
            }
        });
    }

    fn debug_line(&self, message: &str) {
        if !self.client.debug {
            return;
        }

        #[cfg(windows)]
        println!("{}", message);

        #[cfg(not(windows))]
        println!(
            "{}",
            message.gradient_with_color(Color::Cyan, Color::SpringGreen4)
        );
    }
}
