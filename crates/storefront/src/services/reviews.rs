//! Customer reviews stored in Firestore.

use thiserror::Error;
use tracing::instrument;

use crate::error::{add_breadcrumb, capture_internal};
use crate::firebase::{DocumentClient, FirebaseError};
use crate::forms::{FieldErrors, ReviewForm};
use crate::models::Review;

/// Firestore collection holding reviews.
pub const REVIEWS_COLLECTION: &str = "reviews";

/// Errors from submitting or listing reviews.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("validation failed: {0}")]
    Validation(#[from] FieldErrors),

    #[error("review store error: {0}")]
    Firebase(#[from] FirebaseError),
}

impl ReviewError {
    /// Message safe to show under the review form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::Firebase(_) => "Failed to submit review. Please try again.".to_string(),
        }
    }
}

/// Reads and writes reviews.
pub struct ReviewService<'a> {
    documents: &'a DocumentClient,
}

impl<'a> ReviewService<'a> {
    #[must_use]
    pub const fn new(documents: &'a DocumentClient) -> Self {
        Self { documents }
    }

    /// Validate and store a review. Returns the stored review with its id.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Validation` if the form is invalid, or
    /// `ReviewError::Firebase` if the write fails.
    #[instrument(skip(self, form))]
    pub async fn submit(&self, form: &ReviewForm) -> Result<Review, ReviewError> {
        let mut review = form.validate()?;

        let id = self
            .documents
            .add_document(REVIEWS_COLLECTION, review.to_fields())
            .await
            .inspect_err(|e| {
                capture_internal(e, "store review");
            })?;

        add_breadcrumb("reviews", "Review submitted", Some(&[("id", id.as_str())]));
        review.id = Some(id);
        Ok(review)
    }

    /// Newest reviews first. Documents without a valid rating are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::Firebase` if the query fails.
    #[instrument(skip(self))]
    pub async fn recent(&self, limit: u32) -> Result<Vec<Review>, ReviewError> {
        let documents = self
            .documents
            .recent_documents(REVIEWS_COLLECTION, limit)
            .await?;

        let reviews: Vec<Review> = documents.iter().filter_map(Review::from_document).collect();
        if reviews.len() < documents.len() {
            tracing::warn!(
                skipped = documents.len() - reviews.len(),
                "Skipped malformed review documents"
            );
        }
        Ok(reviews)
    }
}
