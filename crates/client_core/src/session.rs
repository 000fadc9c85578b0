//! Signed-in user state and bearer token persistence.

use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use shared::{
    domain::UserId,
    protocol::{Profile, UserInfo},
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    error::{ClientError, ClientResult},
    AuthApi, ProfileDirectory, SessionProvider,
};

pub const LOGIN_FAILURE_FALLBACK: &str = "Login failed";
pub const USER_DATA_FAILURE_FALLBACK: &str = "Failed to load user data";

/// Storage for the bearer token shared by the session and the transport.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Keeps the token in a single file so it survives between CLI invocations.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create token directory '{}'", parent.display())
            })?;
        }
        fs::write(&self.path, token)
            .with_context(|| format!("failed to write token file '{}'", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| {
                format!("failed to remove token file '{}'", self.path.display())
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Option<String>,
    pub username: Option<String>,
    pub token: String,
}

impl CurrentUser {
    fn from_info(info: UserInfo, token: String) -> Self {
        Self {
            id: info.id,
            email: info.email,
            username: info.username,
            token,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub id: UserId,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Reads the claims of a token without checking its signature; the backend
/// is the only party that can verify it.
pub fn decode_token_claims(token: &str) -> ClientResult<TokenClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|err| ClientError::invalid_shape(format!("unreadable token: {err}")))
}

pub struct Session {
    auth: Arc<dyn AuthApi>,
    tokens: Arc<dyn TokenStore>,
    user: RwLock<Option<CurrentUser>>,
    last_error: RwLock<Option<String>>,
}

impl Session {
    pub fn new(auth: Arc<dyn AuthApi>, tokens: Arc<dyn TokenStore>) -> Arc<Self> {
        Arc::new(Self {
            auth,
            tokens,
            user: RwLock::new(None),
            last_error: RwLock::new(None),
        })
    }

    /// Picks up a previously stored token. A token the backend no longer
    /// accepts is dropped silently.
    pub async fn restore(&self) -> Option<CurrentUser> {
        let token = self.tokens.load()?;
        match self.auth.fetch_user_info().await {
            Ok(info) => {
                let user = CurrentUser::from_info(info, token);
                info!(user_id = %user.id, "session restored");
                *self.user.write().await = Some(user.clone());
                Some(user)
            }
            Err(err) => {
                warn!(kind = err.kind(), "stored token rejected: {err}");
                if let Err(err) = self.tokens.clear() {
                    warn!("failed to clear stored token: {err:#}");
                }
                *self.user.write().await = None;
                None
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<CurrentUser> {
        *self.last_error.write().await = None;
        match self.login_inner(email, password).await {
            Ok(user) => {
                info!(user_id = %user.id, "signed in");
                *self.user.write().await = Some(user.clone());
                Ok(user)
            }
            Err(err) => {
                let message = err.display_message(LOGIN_FAILURE_FALLBACK);
                warn!(kind = err.kind(), "login failed: {err}");
                if let Err(err) = self.tokens.clear() {
                    warn!("failed to clear stored token: {err:#}");
                }
                *self.user.write().await = None;
                *self.last_error.write().await = Some(message.clone());
                Err(ClientError::Application {
                    status: err.status(),
                    message,
                })
            }
        }
    }

    async fn login_inner(&self, email: &str, password: &str) -> ClientResult<CurrentUser> {
        let token = self.auth.login(email, password).await?;
        self.tokens
            .save(&token)
            .map_err(|err| ClientError::application(format!("{err:#}")))?;
        let info = self.auth.fetch_user_info().await?;
        Ok(CurrentUser::from_info(info, token))
    }

    /// Always ends signed out, whether or not the backend acknowledged it.
    pub async fn logout(&self) {
        if let Err(err) = self.auth.logout().await {
            warn!(kind = err.kind(), "logout request failed: {err}");
        }
        if let Err(err) = self.tokens.clear() {
            warn!("failed to clear stored token: {err:#}");
        }
        *self.user.write().await = None;
        *self.last_error.write().await = None;
        info!("signed out");
    }

    /// Profile of the signed-in user, looked up by the id in the token claims.
    /// Any failure after the token is found reports the same generic message.
    pub async fn dashboard_profile(&self, directory: &dyn ProfileDirectory) -> ClientResult<Profile> {
        let token = match self.user.read().await.as_ref() {
            Some(user) => Some(user.token.clone()),
            None => self.tokens.load(),
        };
        let token = token.ok_or(ClientError::NotAuthenticated)?;

        let lookup = match decode_token_claims(&token) {
            Ok(claims) => directory.get_profile_by_user_id(&claims.id).await,
            Err(err) => Err(err),
        };
        lookup.map_err(|err| {
            warn!(kind = err.kind(), "error fetching user data: {err}");
            ClientError::Application {
                status: err.status(),
                message: USER_DATA_FAILURE_FALLBACK.to_string(),
            }
        })
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user.read().await.is_some()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    pub async fn clear_error(&self) {
        *self.last_error.write().await = None;
    }
}

#[async_trait]
impl SessionProvider for Session {
    async fn current_user(&self) -> Option<CurrentUser> {
        self.user.read().await.clone()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
