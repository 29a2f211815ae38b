mod settlement_tests;
mod user_tests;

use std::sync::Arc;

use crate::codec::AeadCodec;
use crate::core::models::user::User;
use crate::core::service::LedgerService;
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::storage::in_memory::InMemoryStore;

pub fn create_test_service() -> LedgerService<InMemoryStore, InMemoryCache> {
    let codec = Arc::new(AeadCodec::new("test-encryption-secret"));
    let storage = InMemoryStore::new(codec.clone());
    let cache = InMemoryCache::new();
    LedgerService::new(storage, cache, codec, "test-jwt-secret".to_string())
}

pub async fn register_user(
    service: &LedgerService<InMemoryStore, InMemoryCache>,
    name: &str,
    email: &str,
) -> User {
    service
        .register(name.to_string(), email.to_string(), "password123".to_string(), None)
        .await
        .unwrap()
}

/// Send and accept a friend request so the pair can split expenses.
pub async fn befriend(service: &LedgerService<InMemoryStore, InMemoryCache>, a: &User, b: &User) {
    service.send_friend_request(&a.id, &b.id).await.unwrap();
    let requests = service.incoming_friend_requests(&b.id).await.unwrap();
    let request = requests
        .iter()
        .find(|r| r.sender_id == a.id)
        .expect("request should be pending");
    service
        .respond_friend_request(&b.id, &request.id, "accept")
        .await
        .unwrap();
}

pub async fn balance_of(service: &LedgerService<InMemoryStore, InMemoryCache>, user_id: &str) -> f64 {
    service
        .profile(user_id)
        .await
        .unwrap()
        .balance
        .expect("balance should decode")
}

/// Seed a user's opening balance through the bank-details path.
pub async fn seed_balance(
    service: &LedgerService<InMemoryStore, InMemoryCache>,
    user_id: &str,
    amount: f64,
) {
    service
        .save_bank_details(user_id, None, None, amount)
        .await
        .unwrap();
}
