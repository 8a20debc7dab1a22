//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! # Make an existing account an admin
//! outpost-cli user promote -e admin@example.com -r admin
//! ```
//!
//! The first admin has to be promoted here; after that admins manage roles
//! from the site. A signed-in user picks up the new role on their next login.

use outpost_core::{Email, Role};
use outpost_web::db::UserRepository;

use super::{CommandError, connect};

fn parse_args(email: &str, role: &str) -> Result<(Email, Role), CommandError> {
    let email = Email::parse(email)
        .map_err(|e| CommandError::InvalidArgument(format!("Invalid email: {e}")))?;
    let role: Role = role.parse().map_err(|_| {
        CommandError::InvalidArgument(format!(
            "Invalid role: {role}. Valid roles: user, moderator, admin"
        ))
    })?;
    Ok((email, role))
}

/// Set the role of the account registered with `email`.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for a malformed email or role and
/// `CommandError::Repository` if no account has that email.
pub async fn promote(email: &str, role: &str) -> Result<(), CommandError> {
    let (email, role) = parse_args(email, role)?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .set_role_by_email(&email, role)
        .await?;

    tracing::info!(
        "Role updated! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        assert!(parse_args("admin@example.com", "admin").is_ok());
        assert!(matches!(
            parse_args("not-an-email", "admin"),
            Err(CommandError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_args("admin@example.com", "owner"),
            Err(CommandError::InvalidArgument(_))
        ));
    }
}
