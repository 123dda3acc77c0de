// # Signing Date Cache
//
// Holds the provider-issued date used for signing.
//
// ## Lifecycle
//
// init → populate once → read many
//
// - The first `get_or_fetch()` asks the `DateSource` and stores the answer
// - Every later call returns the stored value without a request
// - A failed fetch stores nothing; the next call tries again
// - The stored date is never refreshed (see `reset()` for tests)
//
// ## Concurrency
//
// The lock is held across the fetch, so concurrent first callers wait for
// one request instead of racing several.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::traits::DateSource;
use crate::Result;

/// Populate-once cache of the provider signing date
pub struct SigningDateCache {
    source: Arc<dyn DateSource>,
    date: Mutex<Option<String>>,
}

impl SigningDateCache {
    /// Create an empty cache backed by `source`
    pub fn new(source: Arc<dyn DateSource>) -> Self {
        Self {
            source,
            date: Mutex::new(None),
        }
    }

    /// Create a cache that already holds `date`
    ///
    /// `source` is never asked unless the cache is reset.
    pub fn seeded(source: Arc<dyn DateSource>, date: impl Into<String>) -> Self {
        Self {
            source,
            date: Mutex::new(Some(date.into())),
        }
    }

    /// Return the cached date, fetching it on first use
    pub async fn get_or_fetch(&self) -> Result<String> {
        let mut date = self.date.lock().await;

        if let Some(ref cached) = *date {
            return Ok(cached.clone());
        }

        tracing::debug!("Fetching signing date from {}", self.source.describe());
        let fetched = self.source.fetch_date().await?;
        tracing::debug!("Signing date cached: {}", fetched);

        *date = Some(fetched.clone());
        Ok(fetched)
    }

    /// The cached date, if any, without fetching
    pub async fn cached(&self) -> Option<String> {
        self.date.lock().await.clone()
    }

    /// Drop the cached date so the next call fetches again
    pub async fn reset(&self) {
        *self.date.lock().await = None;
    }
}

impl std::fmt::Debug for SigningDateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningDateCache")
            .field("source", &self.source.describe())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Never;

    #[async_trait]
    impl DateSource for Never {
        async fn fetch_date(&self) -> Result<String> {
            Err(crate::Error::network("no date endpoint in unit tests"))
        }

        fn describe(&self) -> &str {
            "never"
        }
    }

    #[test]
    fn seeded_cache_reports_its_date() {
        let cache = SigningDateCache::seeded(Arc::new(Never), "Mon, 26 Mar 2012 19:37:58 GMT");

        tokio_test::block_on(async {
            assert_eq!(
                cache.cached().await.as_deref(),
                Some("Mon, 26 Mar 2012 19:37:58 GMT")
            );
            assert_eq!(
                cache.get_or_fetch().await.unwrap(),
                "Mon, 26 Mar 2012 19:37:58 GMT"
            );
        });
    }

    #[test]
    fn debug_names_the_source() {
        let cache = SigningDateCache::new(Arc::new(Never));
        assert!(format!("{:?}", cache).contains("never"));
    }
}
