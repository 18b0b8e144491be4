//! Authentication error types.

use thiserror::Error;

use crate::firebase::FirebaseError;
use crate::forms::FieldErrors;

/// Which auth flow failed, for picking a fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    Login,
    Register,
}

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Form input failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] FieldErrors),

    /// Email already has an account.
    #[error("email already in use")]
    EmailInUse,

    /// Email rejected by the identity service.
    #[error("invalid email")]
    InvalidEmail,

    /// Password rejected as too weak.
    #[error("password too weak")]
    WeakPassword,

    /// Too many attempts from this client.
    #[error("too many requests")]
    TooManyRequests,

    /// No account for this email.
    #[error("user not found")]
    UserNotFound,

    /// Wrong password for an existing account.
    #[error("wrong password")]
    WrongPassword,

    /// Email/password pair rejected without saying which part.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account has been disabled.
    #[error("user disabled")]
    UserDisabled,

    /// Any other identity service failure.
    #[error("identity service error: {0}")]
    Firebase(FirebaseError),
}

impl From<FirebaseError> for AuthError {
    fn from(err: FirebaseError) -> Self {
        match &err {
            FirebaseError::RateLimited(_) => Self::TooManyRequests,
            FirebaseError::Api { message, .. } => {
                // Codes may carry a detail suffix: "WEAK_PASSWORD : Password should be..."
                let code = message
                    .split([' ', ':'])
                    .next()
                    .unwrap_or_default();
                match code {
                    "EMAIL_EXISTS" => Self::EmailInUse,
                    "INVALID_EMAIL" => Self::InvalidEmail,
                    "WEAK_PASSWORD" => Self::WeakPassword,
                    "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyRequests,
                    "EMAIL_NOT_FOUND" => Self::UserNotFound,
                    "INVALID_PASSWORD" => Self::WrongPassword,
                    "INVALID_LOGIN_CREDENTIALS" => Self::InvalidCredentials,
                    "USER_DISABLED" => Self::UserDisabled,
                    _ => Self::Firebase(err),
                }
            }
            _ => Self::Firebase(err),
        }
    }
}

impl AuthError {
    /// Message safe to show on the login or register page.
    #[must_use]
    pub fn user_message(&self, operation: AuthOperation) -> String {
        match self {
            Self::Validation(errors) => errors
                .iter()
                .next()
                .map_or_else(|| fallback(operation).to_string(), |(_, m)| m.to_string()),
            Self::EmailInUse => "This email is already registered".to_string(),
            Self::InvalidEmail => "Invalid email format".to_string(),
            Self::WeakPassword => "Password is too weak".to_string(),
            Self::TooManyRequests => "Too many attempts, please try again later".to_string(),
            Self::UserNotFound => "No user found with this email".to_string(),
            Self::WrongPassword => "Incorrect password".to_string(),
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::UserDisabled => "This account has been disabled".to_string(),
            Self::Firebase(_) => fallback(operation).to_string(),
        }
    }

    /// Whether this is a service fault rather than a user mistake.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Firebase(_))
    }
}

const fn fallback(operation: AuthOperation) -> &'static str {
    match operation {
        AuthOperation::Login => "An error occurred during login",
        AuthOperation::Register => "An error occurred during registration",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(message: &str) -> FirebaseError {
        FirebaseError::Api {
            status: 400,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_maps_service_codes() {
        assert!(matches!(AuthError::from(api("EMAIL_EXISTS")), AuthError::EmailInUse));
        assert!(matches!(
            AuthError::from(api("WEAK_PASSWORD : Password should be at least 6 characters")),
            AuthError::WeakPassword
        ));
        assert!(matches!(
            AuthError::from(api("INVALID_PASSWORD")),
            AuthError::WrongPassword
        ));
        assert!(matches!(
            AuthError::from(FirebaseError::RateLimited(30)),
            AuthError::TooManyRequests
        ));
    }

    #[test]
    fn test_unknown_code_uses_fallback() {
        let err = AuthError::from(api("OPERATION_NOT_ALLOWED"));
        assert!(err.is_internal());
        assert_eq!(
            err.user_message(AuthOperation::Register),
            "An error occurred during registration"
        );
        assert_eq!(
            err.user_message(AuthOperation::Login),
            "An error occurred during login"
        );
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            AuthError::EmailInUse.user_message(AuthOperation::Register),
            "This email is already registered"
        );
        assert_eq!(
            AuthError::UserNotFound.user_message(AuthOperation::Login),
            "No user found with this email"
        );
    }
}
