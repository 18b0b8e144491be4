//! Firestore document writes and queries.
//!
//! Only the two operations the storefront needs: append a document with a
//! server-assigned `timestamp`, and read the newest documents of a
//! collection.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use miss_gypsy_core::DocumentId;

use super::{FirebaseError, response_text};
use crate::config::FirebaseConfig;

/// Firestore REST base URL.
const BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Field set by the server on every document written through this client.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Typed document fields, keyed by field name.
pub type Fields = BTreeMap<String, FieldValue>;

/// A Firestore typed value, in its REST JSON encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    StringValue(String),
    /// Int64 values travel as decimal strings.
    IntegerValue(String),
    DoubleValue(f64),
    BooleanValue(bool),
    TimestampValue(DateTime<Utc>),
    NullValue(serde_json::Value),
}

impl FieldValue {
    /// Build a string value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::StringValue(value.into())
    }

    /// Build an integer value.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::IntegerValue(value.to_string())
    }

    /// The value as a string slice, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// The value as an integer, if it is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::IntegerValue(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// The value as a timestamp, if it is one.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::TimestampValue(ts) => Some(*ts),
            _ => None,
        }
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name (`projects/.../documents/{collection}/{id}`).
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
}

impl Document {
    /// Document ID (last path segment of the resource name).
    #[must_use]
    pub fn id(&self) -> DocumentId {
        DocumentId::new(self.name.rsplit('/').next().unwrap_or_default())
    }

    /// String field, if present.
    #[must_use]
    pub fn string_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(FieldValue::as_str)
    }

    /// Integer field, if present.
    #[must_use]
    pub fn integer_field(&self, field: &str) -> Option<i64> {
        self.fields.get(field).and_then(FieldValue::as_i64)
    }

    /// Server timestamp, if present.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.fields
            .get(TIMESTAMP_FIELD)
            .and_then(FieldValue::as_timestamp)
    }
}

/// One row of a `runQuery` response. Rows without a document only carry
/// the read time.
#[derive(Debug, Deserialize)]
struct QueryRow {
    document: Option<Document>,
}

/// Client for Firestore documents.
#[derive(Clone)]
pub struct DocumentClient {
    inner: Arc<DocumentClientInner>,
}

struct DocumentClientInner {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: SecretString,
}

impl DocumentClient {
    /// Create a new document client.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self::with_base_url(config, BASE_URL)
    }

    /// Create a client against another Firestore host, such as the local
    /// emulator (`http://localhost:8080/v1`).
    #[must_use]
    pub fn with_base_url(config: &FirebaseConfig, base_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(DocumentClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.into().trim_end_matches('/').to_string(),
                project_id: config.project_id.clone(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    /// Append a document to `collection`. The server sets `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError` if the commit fails.
    #[instrument(skip(self, fields), fields(field_count = fields.len()))]
    pub async fn add_document(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<DocumentId, FirebaseError> {
        let id = DocumentId::new(uuid::Uuid::new_v4().simple().to_string());
        let body = commit_body(&self.documents_root(), collection, &id, &fields);

        let response = self
            .inner
            .client
            .post(self.endpoint(":commit"))
            .json(&body)
            .send()
            .await?;
        response_text(response).await?;

        debug!(id = %id, "Document committed");
        Ok(id)
    }

    /// Newest documents of `collection`, ordered by `timestamp` descending.
    ///
    /// # Errors
    ///
    /// Returns `FirebaseError` if the query fails or the response cannot be
    /// parsed.
    #[instrument(skip(self))]
    pub async fn recent_documents(
        &self,
        collection: &str,
        limit: u32,
    ) -> Result<Vec<Document>, FirebaseError> {
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{
                    "field": { "fieldPath": TIMESTAMP_FIELD },
                    "direction": "DESCENDING"
                }],
                "limit": limit
            }
        });

        let response = self
            .inner
            .client
            .post(self.endpoint(":runQuery"))
            .json(&body)
            .send()
            .await?;
        let text = response_text(response).await?;

        parse_query_rows(&text)
    }

    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.inner.project_id
        )
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/{}{method}?key={}",
            self.inner.base_url,
            self.documents_root(),
            urlencoding::encode(self.inner.api_key.expose_secret())
        )
    }
}

/// Build a `:commit` body creating `{collection}/{id}` with a server
/// timestamp transform.
fn commit_body(
    root: &str,
    collection: &str,
    id: &DocumentId,
    fields: &Fields,
) -> serde_json::Value {
    json!({
        "writes": [{
            "update": {
                "name": format!("{root}/{collection}/{id}"),
                "fields": fields
            },
            "currentDocument": { "exists": false },
            "updateTransforms": [{
                "fieldPath": TIMESTAMP_FIELD,
                "setToServerValue": "REQUEST_TIME"
            }]
        }]
    })
}

/// Parse a `runQuery` response into its documents.
fn parse_query_rows(text: &str) -> Result<Vec<Document>, FirebaseError> {
    let rows: Vec<QueryRow> = serde_json::from_str(text)?;
    Ok(rows.into_iter().filter_map(|row| row.document).collect())
}
