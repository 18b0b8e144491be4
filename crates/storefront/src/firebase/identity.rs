//! Email/password accounts via the Identity Toolkit REST API.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use miss_gypsy_core::{Email, UserUid};

use super::{FirebaseError, response_text};
use crate::config::FirebaseConfig;
use crate::models::CurrentUser;

/// Identity Toolkit base URL.
const BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
}

/// Client for Firebase email/password authentication.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl IdentityClient {
    /// Create a new identity client.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self::with_base_url(config, BASE_URL)
    }

    /// Create a client against another Identity Toolkit host, such as the
    /// local emulator (`http://localhost:9099/identitytoolkit.googleapis.com/v1`).
    #[must_use]
    pub fn with_base_url(config: &FirebaseConfig, base_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.into().trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError::Api` carrying the service error code (for
    /// example `EMAIL_EXISTS`) if the account cannot be created.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<CurrentUser, FirebaseError> {
        self.password_call("accounts:signUp", email, password).await
    }

    /// Sign in to an existing account.
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError::Api` carrying the service error code (for
    /// example `INVALID_PASSWORD`) if the credentials are rejected.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<CurrentUser, FirebaseError> {
        self.password_call("accounts:signInWithPassword", email, password)
            .await
    }

    async fn password_call(
        &self,
        method: &str,
        email: &Email,
        password: &str,
    ) -> Result<CurrentUser, FirebaseError> {
        let url = format!(
            "{}/{method}?key={}",
            self.inner.base_url,
            urlencoding::encode(self.inner.api_key.expose_secret())
        );
        let request = PasswordRequest {
            email: email.as_str(),
            password,
            return_secure_token: true,
        };

        let response = self.inner.client.post(&url).json(&request).send().await?;
        let body = response_text(response).await?;
        parse_account(&body)
    }
}

/// Parse a sign-up/sign-in response into the signed-in user.
fn parse_account(body: &str) -> Result<CurrentUser, FirebaseError> {
    let account: AccountResponse = serde_json::from_str(body)?;
    let email = Email::parse(&account.email)
        .map_err(|e| FirebaseError::Unexpected(format!("account email: {e}")))?;
    Ok(CurrentUser {
        uid: UserUid::new(account.local_id),
        email,
    })
}
