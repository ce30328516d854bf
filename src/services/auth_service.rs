use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Claims, PasswordHasher, TokenIssuer};
use crate::database::{CredentialStore, InsertOutcome, StoreError, User};
use crate::error::ApiError;
use crate::types::{LoginRequest, RegisterRequest, TokenResponse};
use crate::validators::{self, NamePolicy};

/// Registration, login and token checks over injected collaborators.
///
/// Nothing here reaches for global state: the store, hasher, token issuer
/// and name policy are all supplied by the caller, so tests can run the
/// flows against an in-memory store with a fixed key.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    name_policy: NamePolicy,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
        name_policy: NamePolicy,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            name_policy,
            store_timeout,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Validate, hash, persist and issue a token for a new account
    pub async fn register(&self, request: RegisterRequest) -> Result<TokenResponse, ApiError> {
        let email = validators::normalize_email(&request.email);
        let name = request.name.trim().to_string();

        let mut errors = Vec::new();
        validators::check_name(&name, &self.name_policy, &mut errors);
        validators::check_email(&email, &mut errors);
        if validators::is_email(&email) && self.find(&email).await?.is_some() {
            // Advisory only, so the message joins the batch; the insert below decides
            errors.push(crate::error::MSG_USER_EXISTS.to_string());
        }
        validators::check_password(&request.password, &mut errors);

        if !errors.is_empty() {
            tracing::debug!("Registration rejected for {}: {:?}", email, errors);
            return Err(ApiError::Validation(errors));
        }

        let hash = self.hasher.hash_async(request.password).await?;
        let user = User::new(email.clone(), name, hash);

        let outcome = self
            .with_timeout("insert_if_absent", self.store.insert_if_absent(user))
            .await?;
        if outcome == InsertOutcome::Conflict {
            tracing::info!("Registration lost uniqueness race for {}", email);
            return Err(ApiError::Conflict);
        }

        let token = self.tokens.issue(&email)?;
        tracing::info!("Registered user {}", email);
        Ok(TokenResponse { token })
    }

    /// Check credentials and issue a token.
    ///
    /// Malformed email, unknown email and wrong password return the same
    /// error, and every path performs one bcrypt verification.
    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, ApiError> {
        let email = validators::normalize_email(&request.email);

        if !validators::is_email(&email) {
            self.hasher.verify_dummy_async(request.password).await?;
            tracing::info!("Login failed: invalid credentials");
            return Err(ApiError::InvalidCredentials);
        }

        let user = match self.find(&email).await? {
            Some(user) => user,
            None => {
                self.hasher.verify_dummy_async(request.password).await?;
                tracing::info!("Login failed: invalid credentials");
                return Err(ApiError::InvalidCredentials);
            }
        };

        let matched = self
            .hasher
            .verify_async(request.password, user.password.clone())
            .await?;
        if !matched {
            tracing::info!("Login failed: invalid credentials");
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.email)?;
        tracing::info!("User {} logged in", user.email);
        Ok(TokenResponse { token })
    }

    /// Verify a bearer token; any failure is an error, never a pass-through
    pub fn authenticate(&self, token: &str) -> Result<Claims, ApiError> {
        Ok(self.tokens.verify(token)?)
    }

    pub async fn find_user(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self.find(email).await?)
    }

    pub async fn ping_store(&self) -> Result<(), StoreError> {
        self.with_timeout("ping", self.store.ping()).await
    }

    async fn find(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.with_timeout("find_by_email", self.store.find_by_email(email))
            .await
    }

    async fn with_timeout<T>(
        &self,
        operation: &'static str,
        future: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.store_timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                operation,
                timeout: self.store_timeout,
            }),
        }
    }
}
