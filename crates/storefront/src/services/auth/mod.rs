//! Authentication service.
//!
//! Email/password accounts backed by the Firebase Identity Toolkit. A
//! successful login or registration updates the shared [`SessionHolder`].

mod error;

pub use error::{AuthError, AuthOperation};

use secrecy::ExposeSecret;
use tracing::instrument;

use crate::error::{add_breadcrumb, capture_internal, clear_sentry_user, set_sentry_user};
use crate::firebase::IdentityClient;
use crate::forms::{LoginForm, RegisterForm};
use crate::models::{CurrentUser, SessionHolder};

/// Authentication service.
///
/// Handles registration, login, and logout.
pub struct AuthService<'a> {
    identity: &'a IdentityClient,
    session: &'a SessionHolder,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(identity: &'a IdentityClient, session: &'a SessionHolder) -> Self {
        Self { identity, session }
    }

    /// Register a new account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the form is invalid.
    /// Returns `AuthError::EmailInUse` if the email is already registered.
    #[instrument(skip(self, form))]
    pub async fn register(&self, form: &RegisterForm) -> Result<CurrentUser, AuthError> {
        let credentials = form.validate()?;

        let user = self
            .identity
            .sign_up(&credentials.email, credentials.password.expose_secret())
            .await
            .map_err(|e| log_failure(AuthOperation::Register, e.into()))?;

        add_breadcrumb("auth", "Account registered", None);
        self.sign_in_session(&user);
        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a field is blank.
    /// Returns `AuthError::UserNotFound`, `AuthError::WrongPassword` or
    /// `AuthError::InvalidCredentials` if the credentials are rejected.
    #[instrument(skip(self, form))]
    pub async fn login(&self, form: &LoginForm) -> Result<CurrentUser, AuthError> {
        let credentials = form.validate()?;

        let user = self
            .identity
            .sign_in(&credentials.email, credentials.password.expose_secret())
            .await
            .map_err(|e| log_failure(AuthOperation::Login, e.into()))?;

        add_breadcrumb("auth", "Signed in", None);
        self.sign_in_session(&user);
        Ok(user)
    }

    /// Sign out the current user.
    pub fn logout(&self) {
        add_breadcrumb("auth", "Signed out", None);
        clear_sentry_user();
        self.session.logout();
    }

    fn sign_in_session(&self, user: &CurrentUser) {
        set_sentry_user(&user.uid, Some(user.email.as_str()));
        self.session.set_user(user.clone());
    }
}

fn log_failure(operation: AuthOperation, err: AuthError) -> AuthError {
    if err.is_internal() {
        let context = match operation {
            AuthOperation::Login => "sign in",
            AuthOperation::Register => "sign up",
        };
        capture_internal(&err, context);
    } else {
        tracing::warn!(?operation, error = %err, "Credentials rejected");
    }
    err
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use url::Url;

    use super::*;
    use crate::config::FirebaseConfig;

    fn identity() -> IdentityClient {
        IdentityClient::new(&FirebaseConfig {
            api_key: SecretString::from("key"),
            project_id: "jewellery".to_string(),
            database_url: Url::parse("https://jewellery-default-rtdb.firebaseio.com/").unwrap(),
        })
    }

    #[tokio::test]
    async fn test_invalid_register_form_skips_identity_call() {
        let identity = identity();
        let session = SessionHolder::new();
        let auth = AuthService::new(&identity, &session);

        let form = RegisterForm {
            email: "asha@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
        };
        let err = auth.register(&form).await.unwrap_err();

        assert_eq!(
            err.user_message(AuthOperation::Register),
            "Passwords do not match"
        );
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_blank_login_form() {
        let identity = identity();
        let session = SessionHolder::new();
        let auth = AuthService::new(&identity, &session);

        let err = auth.login(&LoginForm::default()).await.unwrap_err();

        assert_eq!(
            err.user_message(AuthOperation::Login),
            "All fields are required"
        );
    }
}
