//! Admin authentication against the account API.

use folio_common::error::{FolioError, FolioResult};
use folio_common::models::{LoginRequest, PasswordChange, User};
use folio_common::validation::validate_request;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::AccountStore;

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct AuthContext {
    account: Arc<dyn AccountStore>,
    state: RwLock<AuthState>,
}

impl AuthContext {
    pub fn new(account: Arc<dyn AccountStore>) -> Self {
        Self { account, state: RwLock::new(AuthState::default()) }
    }

    pub async fn snapshot(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.user.is_some()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// The signed-in user, or `Unauthorized`.
    pub async fn require_user(&self) -> FolioResult<User> {
        self.user().await.ok_or(FolioError::Unauthorized)
    }

    async fn track<R, F>(&self, action: &str, op: F) -> FolioResult<R>
    where
        F: Future<Output = FolioResult<R>>,
    {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }
        let result = op.await;
        let mut state = self.state.write().await;
        state.loading = false;
        if let Err(e) = &result {
            tracing::error!(action, error = %e, "auth operation failed");
            state.error = Some(e.to_string());
        }
        result
    }

    /// Open an email/password session and load the account.
    pub async fn login(&self, email: &str, password: &str) -> FolioResult<User> {
        self.track("login", async {
            validate_request(&LoginRequest { email: email.to_string(), password: password.to_string() })?;
            self.account
                .create_session(email, password)
                .await
                .map_err(|e| match e {
                    FolioError::Unauthorized => FolioError::InvalidCredentials,
                    other => other,
                })?;
            let user = self.account.get_account().await?;
            tracing::info!(user_id = %user.id, "signed in");
            self.state.write().await.user = Some(user.clone());
            Ok(user)
        })
        .await
    }

    /// Close the current session. The local user is cleared even when the
    /// backend call fails.
    pub async fn logout(&self) -> FolioResult<()> {
        self.track("logout", async {
            let result = self.account.delete_session().await;
            self.state.write().await.user = None;
            match result {
                Ok(()) | Err(FolioError::Unauthorized) => Ok(()),
                Err(e) => Err(e),
            }
        })
        .await
    }

    /// Re-read the account. A 401 just means nobody is signed in.
    pub async fn refresh(&self) -> FolioResult<Option<User>> {
        self.track("refresh", async {
            match self.account.get_account().await {
                Ok(user) => {
                    self.state.write().await.user = Some(user.clone());
                    Ok(Some(user))
                }
                Err(FolioError::Unauthorized) => {
                    self.state.write().await.user = None;
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .await
    }

    pub async fn update_name(&self, name: &str) -> FolioResult<User> {
        self.track("update name", async {
            let name = name.trim();
            if name.is_empty() {
                return Err(FolioError::validation("Name is required"));
            }
            let user = self.account.update_name(name).await?;
            self.state.write().await.user = Some(user.clone());
            Ok(user)
        })
        .await
    }

    pub async fn update_password(&self, change: PasswordChange) -> FolioResult<User> {
        self.track("update password", async {
            validate_request(&change)?;
            let user = self
                .account
                .update_password(&change.new_password, &change.old_password)
                .await?;
            tracing::info!(user_id = %user.id, "password changed");
            Ok(user)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CallKind, MemoryBackend};

    const EMAIL: &str = "ada@example.com";
    const PASSWORD: &str = "correct-horse";

    fn context() -> (MemoryBackend, AuthContext) {
        let backend = MemoryBackend::new().with_account("Ada", EMAIL, PASSWORD);
        let auth = AuthContext::new(Arc::new(backend.clone()));
        (backend, auth)
    }

    #[tokio::test]
    async fn login_then_logout() {
        let (_, auth) = context();
        let user = auth.login(EMAIL, PASSWORD).await.unwrap();
        assert_eq!(user.name, "Ada");
        assert!(auth.is_authenticated().await);

        auth.logout().await.unwrap();
        assert!(!auth.is_authenticated().await);
        assert!(auth.require_user().await.is_err());
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let (_, auth) = context();
        let err = auth.login(EMAIL, "wrong-password").await.unwrap_err();
        assert!(matches!(err, FolioError::InvalidCredentials));
        assert_eq!(auth.error().await.as_deref(), Some("Invalid credentials"));
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn refresh_without_session_is_not_an_error() {
        let (_, auth) = context();
        assert!(auth.refresh().await.unwrap().is_none());
        assert!(auth.error().await.is_none());
    }

    #[tokio::test]
    async fn malformed_login_makes_no_call() {
        let (backend, auth) = context();
        assert!(auth.login("not-an-email", PASSWORD).await.is_err());
        assert_eq!(backend.count(CallKind::CreateSession), 0);
    }

    #[tokio::test]
    async fn account_updates() {
        let (_, auth) = context();
        auth.login(EMAIL, PASSWORD).await.unwrap();

        let user = auth.update_name("Ada L.").await.unwrap();
        assert_eq!(user.name, "Ada L.");
        assert_eq!(auth.user().await.unwrap().name, "Ada L.");

        let change = PasswordChange {
            old_password: PASSWORD.into(),
            new_password: "battery-staple".into(),
        };
        auth.update_password(change).await.unwrap();
        auth.logout().await.unwrap();
        assert!(auth.login(EMAIL, PASSWORD).await.is_err());
        assert!(auth.login(EMAIL, "battery-staple").await.is_ok());
    }
}
