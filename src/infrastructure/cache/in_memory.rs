use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::errors::LedgerError;
use crate::core::models::settlement::NetPosition;
use crate::infrastructure::cache::{Cache, cache_keys};

#[derive(Clone)]
pub struct InMemoryCache {
    cache: Arc<RwLock<HashMap<String, (Vec<NetPosition>, chrono::DateTime<chrono::Utc>)>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        InMemoryCache {
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_net_summary(&self, user_id: &str) -> Result<Option<Vec<NetPosition>>, LedgerError> {
        let key = cache_keys::net_summary_key(user_id);
        let cache = self.cache.read().await;
        match cache.get(&key) {
            Some((summary, expiry)) if *expiry > chrono::Utc::now() => Ok(Some(summary.clone())),
            Some(_) => {
                drop(cache); // release read lock before evicting the stale entry
                self.cache.write().await.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save_net_summary(
        &self,
        user_id: &str,
        summary: &[NetPosition],
        ttl: std::time::Duration,
    ) -> Result<(), LedgerError> {
        let expiry = chrono::Utc::now()
            + chrono::Duration::from_std(ttl)
                .map_err(|e| LedgerError::CacheError(format!("Failed to convert TTL: {}", e)))?;
        let mut cache = self.cache.write().await;
        cache.insert(cache_keys::net_summary_key(user_id), (summary.to_vec(), expiry));
        Ok(())
    }

    async fn invalidate_net_summaries(&self, user_ids: &[String]) -> Result<(), LedgerError> {
        let mut cache = self.cache.write().await;
        for user_id in user_ids {
            cache.remove(&cache_keys::net_summary_key(user_id));
        }
        Ok(())
    }
}
