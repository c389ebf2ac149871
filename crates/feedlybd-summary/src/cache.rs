//! Article-id keyed store for summaries that arrive independently.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::SummaryError;
use crate::queue::{SummaryQueue, SummaryRequest};

/// Shared summary cache. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct SummaryCache {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl SummaryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, article_id: &str) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(article_id)
            .cloned()
    }

    pub fn insert(&self, article_id: impl Into<String>, summary: impl Into<String>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(article_id.into(), summary.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached summary for `article_id`, or queue `request` and cache the result.
    ///
    /// Failures are not cached, so a later call tries again.
    ///
    /// # Errors
    ///
    /// Propagates the queue's [`SummaryError`].
    pub async fn get_or_summarize(
        &self,
        article_id: &str,
        queue: &SummaryQueue,
        request: SummaryRequest,
    ) -> Result<String, SummaryError> {
        if let Some(summary) = self.get(article_id) {
            return Ok(summary);
        }
        let summary = queue.enqueue(request).await?;
        self.insert(article_id, summary.clone());
        Ok(summary)
    }
}
