pub mod cache_keys;
pub mod in_memory;

use async_trait::async_trait;

use crate::core::errors::LedgerError;
use crate::core::models::settlement::NetPosition;

/// Read-through cache for per-user net settlement summaries. Entries are
/// invalidated for every user a mutation touches, so a hit is always
/// consistent with the obligation table.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_net_summary(&self, user_id: &str) -> Result<Option<Vec<NetPosition>>, LedgerError>;
    async fn save_net_summary(
        &self,
        user_id: &str,
        summary: &[NetPosition],
        ttl: std::time::Duration,
    ) -> Result<(), LedgerError>;
    async fn invalidate_net_summaries(&self, user_ids: &[String]) -> Result<(), LedgerError>;
}
