use crate::core::errors::LedgerError;
use crate::core::models::transaction::SharedWith;
use crate::core::models::user::User;
use crate::core::service::{CreateTransactionInput, LedgerService};
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::storage::in_memory::InMemoryStore;
use crate::tests::{balance_of, befriend, create_test_service, register_user, seed_balance};

/// Create a shared expense from `owner` with a single participant and return
/// the id of the obligation it fanned out.
async fn share_expense(
    service: &LedgerService<InMemoryStore, InMemoryCache>,
    owner: &User,
    debtor: &User,
    total: f64,
    share: f64,
    date: &str,
) -> String {
    service
        .create_transaction(
            &owner.id,
            CreateTransactionInput {
                amount: Some(total),
                kind: Some("shared".to_string()),
                transaction_date: Some(date.to_string()),
                description: Some("shared expense".to_string()),
                is_shared: true,
                shared_with: Some(SharedWith::Ids(vec![debtor.id.clone()])),
                shared_amount: Some(share),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    service
        .breakup(&owner.id, &debtor.id)
        .await
        .unwrap()
        .into_iter()
        .find(|entry| entry.transaction_date.to_string() == date && !entry.is_settled)
        .expect("obligation should exist")
        .settlement_id
}

#[tokio::test]
async fn test_claim_and_confirm_end_to_end() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let p1 = register_user(&service, "Priya", "priya@example.com").await;
    let p2 = register_user(&service, "Quinn", "quinn@example.com").await;
    befriend(&service, &alice, &p1).await;
    befriend(&service, &alice, &p2).await;
    seed_balance(&service, &alice.id, 100.0).await;
    seed_balance(&service, &p1.id, 50.0).await;

    service
        .create_transaction(
            &alice.id,
            CreateTransactionInput {
                amount: Some(100.0),
                kind: Some("shared".to_string()),
                transaction_date: Some("2025-05-01".to_string()),
                description: Some("Trip".to_string()),
                is_shared: true,
                shared_with: Some(SharedWith::Ids(vec![p1.id.clone(), p2.id.clone()])),
                shared_amount: Some(20.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(balance_of(&service, &alice.id).await, 40.0);

    let settlement_id = service.breakup(&alice.id, &p1.id).await.unwrap()[0]
        .settlement_id
        .clone();

    // Debtor claims: OPEN -> CLAIMED, no balance movement yet.
    service.settle(&p1.id, &settlement_id).await.unwrap();
    assert_eq!(balance_of(&service, &alice.id).await, 40.0);
    assert_eq!(balance_of(&service, &p1.id).await, 50.0);

    let pending = service.pending_confirmations(&alice.id).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].settlement_id, settlement_id);
    assert_eq!(pending[0].debtor_id, p1.id);
    assert_eq!(pending[0].debtor_name, "Priya");
    assert_eq!(pending[0].amount_owed, 20.0);

    // Receiver confirms: balances swap by the owed amount.
    let outcome = service
        .confirm_settlements(&alice.id, vec![settlement_id.clone()])
        .await
        .unwrap();
    assert_eq!(outcome.confirmed, vec![settlement_id.clone()]);
    assert!(outcome.failed.is_empty());
    assert_eq!(balance_of(&service, &alice.id).await, 60.0);
    assert_eq!(balance_of(&service, &p1.id).await, 30.0);

    let breakup = service.breakup(&p1.id, &alice.id).await.unwrap();
    assert!(breakup[0].is_confirmed_by_receiver);
    assert!(breakup[0].is_settled);

    // Re-confirming the same id fails without moving anything.
    let outcome = service
        .confirm_settlements(&alice.id, vec![settlement_id.clone()])
        .await
        .unwrap();
    assert!(outcome.confirmed.is_empty());
    assert_eq!(outcome.failed, vec![settlement_id]);
    assert_eq!(balance_of(&service, &alice.id).await, 60.0);
    assert_eq!(balance_of(&service, &p1.id).await, 30.0);
}

#[tokio::test]
async fn test_claim_only_from_open_and_only_by_debtor() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let bob = register_user(&service, "Bob", "bob@example.com").await;
    befriend(&service, &alice, &bob).await;

    let settlement_id = share_expense(&service, &alice, &bob, 50.0, 20.0, "2025-05-01").await;

    // The payer cannot claim the debtor's obligation.
    let result = service.settle(&alice.id, &settlement_id).await;
    assert!(matches!(result, Err(LedgerError::SettlementNotOpen(_))));

    service.settle(&bob.id, &settlement_id).await.unwrap();

    // Double claim fails.
    let result = service.settle(&bob.id, &settlement_id).await;
    assert!(matches!(result, Err(LedgerError::SettlementNotOpen(_))));
}

#[tokio::test]
async fn test_cancel_claim_lifecycle() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let bob = register_user(&service, "Bob", "bob@example.com").await;
    befriend(&service, &alice, &bob).await;
    seed_balance(&service, &bob.id, 100.0).await;

    let settlement_id = share_expense(&service, &alice, &bob, 50.0, 20.0, "2025-05-01").await;

    // Cancelling an OPEN row fails.
    let result = service.cancel_claim(&bob.id, &settlement_id).await;
    assert!(matches!(result, Err(LedgerError::SettlementNotClaimed(_))));

    service.settle(&bob.id, &settlement_id).await.unwrap();
    service.cancel_claim(&bob.id, &settlement_id).await.unwrap();

    // Back to OPEN: it can be claimed again and is out of the pending list.
    assert!(service.pending_confirmations(&alice.id).await.unwrap().is_empty());
    service.settle(&bob.id, &settlement_id).await.unwrap();

    // Once confirmed, the claim can never be reopened.
    service
        .confirm_settlements(&alice.id, vec![settlement_id.clone()])
        .await
        .unwrap();
    let result = service.cancel_claim(&bob.id, &settlement_id).await;
    assert!(matches!(result, Err(LedgerError::SettlementNotClaimed(_))));
}

#[tokio::test]
async fn test_confirm_requires_the_recorded_payer() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let bob = register_user(&service, "Bob", "bob@example.com").await;
    let carol = register_user(&service, "Carol", "carol@example.com").await;
    befriend(&service, &alice, &bob).await;
    seed_balance(&service, &bob.id, 100.0).await;

    let settlement_id = share_expense(&service, &alice, &bob, 50.0, 20.0, "2025-05-01").await;
    service.settle(&bob.id, &settlement_id).await.unwrap();

    // Neither the debtor nor a third party may confirm.
    for actor in [&bob, &carol] {
        let outcome = service
            .confirm_settlements(&actor.id, vec![settlement_id.clone()])
            .await
            .unwrap();
        assert!(outcome.confirmed.is_empty());
        assert_eq!(outcome.failed, vec![settlement_id.clone()]);
    }
    assert_eq!(balance_of(&service, &bob.id).await, 100.0);
}

#[tokio::test]
async fn test_confirm_requires_claimed_state() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let bob = register_user(&service, "Bob", "bob@example.com").await;
    befriend(&service, &alice, &bob).await;

    let settlement_id = share_expense(&service, &alice, &bob, 50.0, 20.0, "2025-05-01").await;

    // Still OPEN: nothing to confirm.
    let outcome = service
        .confirm_settlements(&alice.id, vec![settlement_id.clone()])
        .await
        .unwrap();
    assert!(outcome.confirmed.is_empty());
    assert_eq!(outcome.failed, vec![settlement_id]);
}

#[tokio::test]
async fn test_insufficient_balance_blocks_confirmation() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let bob = register_user(&service, "Bob", "bob@example.com").await;
    befriend(&service, &alice, &bob).await;
    seed_balance(&service, &alice.id, 100.0).await;
    seed_balance(&service, &bob.id, 5.0).await;

    let settlement_id = share_expense(&service, &alice, &bob, 50.0, 20.0, "2025-05-01").await;
    service.settle(&bob.id, &settlement_id).await.unwrap();

    let outcome = service
        .confirm_settlements(&alice.id, vec![settlement_id.clone()])
        .await
        .unwrap();
    assert_eq!(outcome.failed, vec![settlement_id.clone()]);

    // The claim survives and no balance moved.
    let pending = service.pending_confirmations(&alice.id).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(balance_of(&service, &bob.id).await, 5.0);

    // Funding the debtor lets the same confirmation go through.
    seed_balance(&service, &bob.id, 50.0).await;
    let outcome = service
        .confirm_settlements(&alice.id, vec![settlement_id.clone()])
        .await
        .unwrap();
    assert_eq!(outcome.confirmed, vec![settlement_id]);
    assert_eq!(balance_of(&service, &bob.id).await, 30.0);
}

#[tokio::test]
async fn test_batch_confirm_isolates_failures() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let bob = register_user(&service, "Bob", "bob@example.com").await;
    befriend(&service, &alice, &bob).await;
    seed_balance(&service, &alice.id, 0.0).await;
    seed_balance(&service, &bob.id, 100.0).await;

    let a = share_expense(&service, &alice, &bob, 30.0, 10.0, "2025-05-01").await;
    let b = share_expense(&service, &alice, &bob, 30.0, 10.0, "2025-05-02").await;
    let c = share_expense(&service, &alice, &bob, 30.0, 10.0, "2025-05-03").await;

    let outcome = service
        .claim_payments(&bob.id, vec![a.clone(), b.clone(), c.clone()])
        .await
        .unwrap();
    assert_eq!(outcome.claimed.len(), 3);
    assert!(outcome.failed.is_empty());

    // Confirm b alone first.
    let outcome = service.confirm_settlements(&alice.id, vec![b.clone()]).await.unwrap();
    assert_eq!(outcome.confirmed, vec![b.clone()]);

    // Confirming [a, b, c] still lands a and c; b reports failed.
    let outcome = service
        .confirm_settlements(&alice.id, vec![a.clone(), b.clone(), c.clone()])
        .await
        .unwrap();
    assert_eq!(outcome.confirmed, vec![a, c]);
    assert_eq!(outcome.failed, vec![b]);
    assert_eq!(balance_of(&service, &bob.id).await, 70.0);
}

#[tokio::test]
async fn test_claim_batch_reports_per_id_outcome() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let bob = register_user(&service, "Bob", "bob@example.com").await;
    befriend(&service, &alice, &bob).await;

    let good = share_expense(&service, &alice, &bob, 30.0, 10.0, "2025-05-01").await;

    let outcome = service
        .claim_payments(&bob.id, vec![good.clone(), "bogus".to_string()])
        .await
        .unwrap();
    assert_eq!(outcome.claimed, vec![good]);
    assert_eq!(outcome.failed, vec!["bogus".to_string()]);

    let result = service.claim_payments(&bob.id, Vec::new()).await;
    assert!(matches!(result, Err(LedgerError::EmptySettlementBatch)));
    let result = service.confirm_settlements(&alice.id, Vec::new()).await;
    assert!(matches!(result, Err(LedgerError::EmptySettlementBatch)));
}

#[tokio::test]
async fn test_net_summary_sign_convention() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let bob = register_user(&service, "Bob", "bob@example.com").await;
    befriend(&service, &alice, &bob).await;

    // Alice owes Bob 30; Bob owes Alice 10. Both unsettled.
    share_expense(&service, &bob, &alice, 40.0, 30.0, "2025-05-01").await;
    share_expense(&service, &alice, &bob, 20.0, 10.0, "2025-05-02").await;

    let summary = service.net_summary(&alice.id).await.unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].friend_id, bob.id);
    assert_eq!(summary[0].friend_name, "Bob");
    assert_eq!(summary[0].total_given, 10.0);
    assert_eq!(summary[0].total_taken, 30.0);
    assert_eq!(summary[0].net_amount, -20.0);

    let summary = service.net_summary(&bob.id).await.unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].friend_id, alice.id);
    assert_eq!(summary[0].total_given, 30.0);
    assert_eq!(summary[0].total_taken, 10.0);
    assert_eq!(summary[0].net_amount, 20.0);
}

#[tokio::test]
async fn test_net_summary_tracks_state_changes() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let bob = register_user(&service, "Bob", "bob@example.com").await;
    befriend(&service, &alice, &bob).await;
    seed_balance(&service, &bob.id, 100.0).await;

    let settlement_id = share_expense(&service, &alice, &bob, 50.0, 20.0, "2025-05-01").await;

    let summary = service.net_summary(&bob.id).await.unwrap();
    assert_eq!(summary[0].net_amount, -20.0);

    // Claimed rows leave the summary (they are in flight, not pending).
    service.settle(&bob.id, &settlement_id).await.unwrap();
    assert!(service.net_summary(&bob.id).await.unwrap().is_empty());
    assert!(service.net_summary(&alice.id).await.unwrap().is_empty());

    // Cancelling brings the debt back.
    service.cancel_claim(&bob.id, &settlement_id).await.unwrap();
    let summary = service.net_summary(&bob.id).await.unwrap();
    assert_eq!(summary[0].net_amount, -20.0);

    // Confirming removes it for good.
    service.settle(&bob.id, &settlement_id).await.unwrap();
    service
        .confirm_settlements(&alice.id, vec![settlement_id])
        .await
        .unwrap();
    assert!(service.net_summary(&bob.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_breakup_lists_newest_first() {
    let service = create_test_service();
    let alice = register_user(&service, "Alice", "alice@example.com").await;
    let bob = register_user(&service, "Bob", "bob@example.com").await;
    befriend(&service, &alice, &bob).await;

    share_expense(&service, &alice, &bob, 30.0, 10.0, "2025-05-01").await;
    share_expense(&service, &alice, &bob, 30.0, 15.0, "2025-06-01").await;

    let breakup = service.breakup(&alice.id, &bob.id).await.unwrap();
    assert_eq!(breakup.len(), 2);
    assert_eq!(breakup[0].transaction_date.to_string(), "2025-06-01");
    assert_eq!(breakup[0].amount_owed, 15.0);
    assert_eq!(breakup[1].transaction_date.to_string(), "2025-05-01");

    let result = service.breakup(&alice.id, "nobody").await;
    assert!(matches!(result, Err(LedgerError::UserNotFound(_))));
}
