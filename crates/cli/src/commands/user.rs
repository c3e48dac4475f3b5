//! User management commands.
//!
//! The API only signs up cashiers; admins are created here.

use kasir_core::{Email, UserRole};
use kasir_server::db::UserRepository;
use kasir_server::services::auth::{hash_password, validate_password};

use super::{CommandError, connect};

/// Create a user with a password login.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<(), CommandError> {
    let role: UserRole = role
        .parse()
        .map_err(|_| CommandError::Invalid(format!("role {role}, expected admin or cashier")))?;
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;
    validate_password(password).map_err(|e| CommandError::Invalid(e.to_string()))?;
    let password_hash =
        hash_password(password).map_err(|e| CommandError::Invalid(e.to_string()))?;

    let pool = connect().await?;

    tracing::info!("Creating user: {} ({})", email, role);
    let user = UserRepository::new(&pool)
        .create(&email, name, role, &password_hash)
        .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(())
}
