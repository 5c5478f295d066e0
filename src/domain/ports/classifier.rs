use async_trait::async_trait;

use crate::domain::errors::ClassificationError;
use crate::domain::models::Intent;

/// Port for turning raw message text into an [`Intent`].
///
/// Implementations must return a category from the closed enumeration even
/// on uncertain input; the documented fallback is
/// [`IntentCategory::Learning`](crate::domain::models::IntentCategory) with
/// `context["degraded"] = true`. A backend failure (timeout, malformed
/// payload) surfaces as [`ClassificationError`] instead of a silent guess.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify a non-empty message.
    async fn classify(&self, text: &str) -> Result<Intent, ClassificationError>;
}
