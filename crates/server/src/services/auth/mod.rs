//! Authentication service.
//!
//! Email/password accounts with argon2 hashes, and opaque bearer tokens
//! whose HMAC digests are stored in `auth_sessions`.

mod error;
mod tokens;

pub use error::AuthError;
pub use tokens::{digest_token, generate_token};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kasir_core::{AuthSession, Email, UserRole};

use crate::config::AuthConfig;
use crate::db::RepositoryError;
use crate::db::sessions::{IssuedTokens, SessionRepository, StoredSession};
use crate::db::users::UserRepository;
use crate::models::{CurrentUser, User};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A resolved access token: its caller and when the token stops working.
#[derive(Debug, Clone)]
pub struct ResolvedToken {
    pub user: CurrentUser,
    pub access_expires_at: DateTime<Utc>,
}

impl ResolvedToken {
    /// Whether the access token is still accepted at `now`.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.access_expires_at > now
    }
}

/// Outcome of a refresh: the new pair, and the access digest it retired.
#[derive(Debug, Clone)]
pub struct RefreshedSession {
    pub session: AuthSession,
    pub retired_access_hash: String,
}

/// Authentication service.
///
/// Handles signup, login, token refresh and token resolution.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    sessions: SessionRepository<'a>,
    config: &'a AuthConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, config: &'a AuthConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            sessions: SessionRepository::new(pool),
            config,
        }
    }

    /// Register a cashier account.
    ///
    /// The display name defaults to the local part of the email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let name = display_name(&email, name);
        self.users
            .create(&email, &name, UserRole::Cashier, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password and open a new session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let (access_token, refresh_token) = (generate_token(), generate_token());
        let access_hash = digest_token(&self.config.token_secret, &access_token)?;
        let refresh_hash = digest_token(&self.config.token_secret, &refresh_token)?;
        let issued = self.issue(&access_hash, &refresh_hash, Utc::now());

        let session = self.sessions.create(user.id, &issued).await?;
        tracing::info!(user_id = %user.id, session_id = %session.id, "User logged in");

        Ok(client_session(access_token, refresh_token, &session))
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the refresh token is unknown or expired.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedSession, AuthError> {
        let presented = digest_token(&self.config.token_secret, refresh_token)?;

        let (access_token, new_refresh_token) = (generate_token(), generate_token());
        let access_hash = digest_token(&self.config.token_secret, &access_token)?;
        let refresh_hash = digest_token(&self.config.token_secret, &new_refresh_token)?;
        let issued = self.issue(&access_hash, &refresh_hash, Utc::now());

        let rotated = self
            .sessions
            .rotate(&presented, &issued)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(RefreshedSession {
            session: client_session(access_token, new_refresh_token, &rotated.session),
            retired_access_hash: rotated.previous_access_hash,
        })
    }

    /// Close the session that owns this access token.
    ///
    /// Returns `true` if a session was removed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn logout(&self, access_token: &str) -> Result<bool, AuthError> {
        let digest = digest_token(&self.config.token_secret, access_token)?;
        Ok(self.sessions.delete_by_access_hash(&digest).await?)
    }

    /// Resolve a live access token to its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is unknown or expired.
    pub async fn authenticate(&self, access_token: &str) -> Result<CurrentUser, AuthError> {
        let digest = digest_token(&self.config.token_secret, access_token)?;
        Ok(self.authenticate_digest(&digest).await?.user)
    }

    /// Resolve an already computed access token digest to its user and expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is unknown or expired.
    pub async fn authenticate_digest(&self, digest: &str) -> Result<ResolvedToken, AuthError> {
        let session = self
            .sessions
            .find_by_access_hash(digest)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let user = self
            .users
            .get_by_id(session.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(ResolvedToken {
            user: user.into(),
            access_expires_at: session.access_expires_at,
        })
    }

    fn issue<'t>(
        &self,
        access_token_hash: &'t str,
        refresh_token_hash: &'t str,
        now: DateTime<Utc>,
    ) -> IssuedTokens<'t> {
        IssuedTokens {
            access_token_hash,
            refresh_token_hash,
            access_expires_at: expiry(now, self.config.access_token_ttl),
            refresh_expires_at: expiry(now, self.config.refresh_token_ttl),
        }
    }
}

fn expiry(now: DateTime<Utc>, ttl: std::time::Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn client_session(
    access_token: String,
    refresh_token: String,
    session: &StoredSession,
) -> AuthSession {
    AuthSession {
        access_token: Some(access_token),
        refresh_token: Some(refresh_token),
        expires_at: Some(session.access_expires_at.timestamp()),
    }
}

fn display_name(email: &Email, name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => email
            .as_str()
            .split('@')
            .next()
            .unwrap_or_default()
            .to_owned(),
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("kopi-susu-2024").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("kopi-susu-2024", &hash).is_ok());
        assert!(matches!(
            verify_password("teh-manis-2024", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_display_name_fallback() {
        let email = Email::parse("siti@warung.id").unwrap();
        assert_eq!(display_name(&email, Some("  Siti Aminah ")), "Siti Aminah");
        assert_eq!(display_name(&email, Some("   ")), "siti");
        assert_eq!(display_name(&email, None), "siti");
    }

    #[test]
    fn test_resolved_token_liveness() {
        let now = Utc::now();
        let resolved = ResolvedToken {
            user: CurrentUser {
                id: kasir_core::UserId::new(uuid::Uuid::nil()),
                email: Email::parse("kasir@warung.id").unwrap(),
                name: "Kasir".to_string(),
                role: UserRole::Cashier,
            },
            access_expires_at: now,
        };
        assert!(!resolved.is_live_at(now));
        assert!(resolved.is_live_at(now - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_expiry_saturates() {
        let now = Utc::now();
        assert_eq!(
            expiry(now, std::time::Duration::from_secs(60)),
            now + chrono::Duration::seconds(60)
        );
        assert_eq!(
            expiry(now, std::time::Duration::from_secs(u64::MAX)),
            DateTime::<Utc>::MAX_UTC
        );
    }
}
