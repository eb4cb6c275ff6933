use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::error::{OntoRankError, Result};
use super::identity::MatrixIdentity;
use crate::db::MatrixStore;
use crate::toolkit::matrix::Matrix;


/// Identity-keyed matrix cache: an in-process LRU in front of the persistent
/// matrix store. Entries never expire by age; a changed identity is a miss.
pub struct MatrixCache {
    store: Arc<dyn MatrixStore>,
    hot: Mutex<LruCache<MatrixIdentity, Arc<Matrix>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub hit_rate: f64,
}

impl MatrixCache {
    pub fn new(store: Arc<dyn MatrixStore>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            store,
            hot: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, identity: &MatrixIdentity) -> Result<Option<Arc<Matrix>>> {
        if let Some(matrix) = self.hot.lock().get(identity).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(matrix));
        }

        match self.store.get(identity).await? {
            Some(matrix) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                let matrix = Arc::new(matrix);
                self.hot.lock().put(identity.clone(), Arc::clone(&matrix));
                Ok(Some(matrix))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    pub async fn put(&self, identity: &MatrixIdentity, matrix: Arc<Matrix>) -> Result<()> {
        self.store.put(identity, &matrix).await?;
        self.hot.lock().put(identity.clone(), matrix);
        debug!("Stored {} matrix for {}", identity.kind, identity.version);
        Ok(())
    }

    /// Fetch the matrix for `identity`, computing and storing it on a miss when
    /// `auto_compute` is set. Never substitutes a matrix with another identity.
    pub async fn get_or_compute<F, Fut>(
        &self,
        identity: &MatrixIdentity,
        auto_compute: bool,
        compute: F,
    ) -> Result<Arc<Matrix>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Matrix>>,
    {
        if let Some(matrix) = self.get(identity).await? {
            return Ok(matrix);
        }

        if !auto_compute {
            return Err(OntoRankError::MissingMatrix {
                kind: identity.kind,
                version: identity.version.clone(),
                parameters: identity.parameters.clone(),
            });
        }

        info!("Computing {} matrix for {}", identity.kind, identity.version);
        let matrix = Arc::new(compute().await?);
        self.put(identity, Arc::clone(&matrix)).await?;
        Ok(matrix)
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 { hits as f64 / total as f64 } else { 0.0 };

        CacheStats {
            hits,
            misses,
            size: self.hot.lock().len(),
            hit_rate,
        }
    }

    /// Drops the in-process tier only; the persistent store is untouched.
    pub fn clear(&self) {
        self.hot.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::GraphKind;
    use crate::db::InMemoryMatrixStore;
    use crate::toolkit::matrix::ConceptIndex;
    use chrono::{TimeZone, Utc};

    fn identity(secs: i64) -> MatrixIdentity {
        MatrixIdentity::ccs("onto-1", Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn matrix() -> Matrix {
        let index = Arc::new(ConceptIndex::new(vec!["urn:a".to_string()]));
        Matrix::square(index, vec![1.0])
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = MatrixCache::new(Arc::new(InMemoryMatrixStore::new()), 4);
        assert!(cache.get(&identity(1)).await.unwrap().is_none());

        cache.put(&identity(1), Arc::new(matrix())).await.unwrap();
        assert!(cache.get(&identity(1)).await.unwrap().is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[tokio::test]
    async fn test_changed_identity_is_a_miss() {
        let cache = MatrixCache::new(Arc::new(InMemoryMatrixStore::new()), 4);
        cache.put(&identity(1), Arc::new(matrix())).await.unwrap();
        assert!(cache.get(&identity(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_matrix_without_auto_compute() {
        let cache = MatrixCache::new(Arc::new(InMemoryMatrixStore::new()), 4);
        let err = cache
            .get_or_compute(&identity(1), false, || async { Ok(matrix()) })
            .await
            .unwrap_err();

        match err {
            OntoRankError::MissingMatrix { kind, version, .. } => {
                assert_eq!(kind, GraphKind::Ontology);
                assert_eq!(version, "onto-1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_auto_compute_persists_to_store() {
        let store = Arc::new(InMemoryMatrixStore::new());
        let cache = MatrixCache::new(store.clone(), 4);
        cache
            .get_or_compute(&identity(1), true, || async { Ok(matrix()) })
            .await
            .unwrap();

        cache.clear();
        let fresh = MatrixCache::new(store, 4);
        assert!(fresh.get(&identity(1)).await.unwrap().is_some());
    }
}
