//! Firebase REST clients: catalog, documents and identity.
//!
//! # Architecture
//!
//! - Firebase is the source of truth - NO local sync, direct REST calls
//! - `reqwest` for HTTP, `serde_json` for payloads
//! - In-memory caching via `moka` for catalog reads (TTL from config)
//!
//! # APIs
//!
//! ## Realtime Database
//! - Product catalog, addressed as `products/{category}/{collection}`
//!
//! ## Firestore
//! - `reviews` and `contacts` collections, server-assigned timestamps
//!
//! ## Identity Toolkit
//! - Email/password sign-up and sign-in
//!
//! # Example
//!
//! ```rust,ignore
//! use miss_gypsy_storefront::firebase::CatalogClient;
//!
//! let catalog = CatalogClient::new(&config.firebase, config.catalog_cache_ttl);
//! let rings = catalog.products("rings", "engagement").await?;
//! ```

pub mod catalog;
pub mod documents;
pub mod identity;

pub use catalog::CatalogClient;
pub use documents::{DocumentClient, Fields};
pub use identity::IdentityClient;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to Firebase.
#[derive(Debug, Error)]
pub enum FirebaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response was valid JSON but not the expected shape.
    #[error("Unexpected response: {0}")]
    Unexpected(String),

    /// Rate limited by Firebase.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Error body shapes returned by Firebase services.
///
/// Firestore and Identity Toolkit nest a message object; the Realtime
/// Database returns a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed { error: ErrorDetail },
    Plain { error: String },
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Read a response body, mapping non-success statuses to `FirebaseError`.
pub(crate) async fn response_text(response: reqwest::Response) -> Result<String, FirebaseError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(FirebaseError::RateLimited(retry_after));
    }

    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Firebase returned non-success status"
        );
        return Err(FirebaseError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(body)
}

/// Extract the error message from a Firebase error body.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Detailed { error }) => error.message,
        Ok(ErrorBody::Plain { error }) => error,
        Err(_) => body.chars().take(200).collect(),
    }
}
