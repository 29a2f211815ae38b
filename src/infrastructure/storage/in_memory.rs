use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::codec::ValueCodec;
use crate::core::errors::LedgerError;
use crate::core::models::{
    category::Category,
    friend::{FriendRequest, FriendRequestStatus, FriendRequestView, FriendSummary},
    obligation::{Obligation, SettlementState},
    scholarship::Scholarship,
    settlement::{BreakupRow, ClaimReceipt, ConfirmReceipt, ObligationContext, PendingRow},
    transaction::{Transaction, TransactionFilter, TransactionRecord, TransactionRow},
    user::User,
};
use crate::infrastructure::storage::Storage;

#[derive(Default)]
struct LedgerState {
    users: HashMap<String, User>,
    emails: HashMap<String, String>, // email -> user_id
    categories: HashMap<String, Category>,
    transactions: HashMap<String, Transaction>,
    obligations: HashMap<String, Obligation>,
    scholarships: Vec<Scholarship>,
    friend_requests: HashMap<String, FriendRequest>,
}

impl LedgerState {
    fn user_name(&self, user_id: &str) -> String {
        self.users
            .get(user_id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| user_id.to_string())
    }
}

/// All tables behind one lock. Holding the lock for a whole method body is
/// what the relational store's row locks plus transaction gave the original:
/// each method is serializable and commits all of its writes or none, since
/// every fallible step runs before the first mutation.
pub struct InMemoryStore {
    state: Mutex<LedgerState>,
    codec: Arc<dyn ValueCodec>,
}

impl InMemoryStore {
    pub fn new(codec: Arc<dyn ValueCodec>) -> Self {
        InMemoryStore {
            state: Mutex::new(LedgerState::default()),
            codec,
        }
    }

    fn decode_balance(&self, user: &User) -> Result<f64, LedgerError> {
        self.codec
            .decode(&user.balance)
            .ok()
            .and_then(|plain| plain.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(|| LedgerError::BalanceCorrupted(user.id.clone()))
    }

    fn encode_balance(&self, user_id: &str, value: f64) -> Result<String, LedgerError> {
        self.codec
            .encode(&value.to_string())
            .map_err(|e| LedgerError::Codec(format!("balance encode for {}: {}", user_id, e)))
    }
}

#[async_trait]
impl Storage for InMemoryStore {
    async fn create_user_if_not_exists(&self, user: User) -> Result<User, LedgerError> {
        let mut state = self.state.lock().await;
        if state.emails.contains_key(&user.email) {
            return Err(LedgerError::EmailAlreadyRegistered(user.email));
        }
        state.emails.insert(user.email.clone(), user.id.clone());
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, LedgerError> {
        Ok(self.state.lock().await.users.get(user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state
            .emails
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        name: String,
        mobile_no: Option<String>,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))?;
        user.name = name;
        user.mobile_no = mobile_no;
        Ok(())
    }

    async fn save_bank_details(
        &self,
        user_id: &str,
        bank_name: Option<String>,
        upi_id: Option<String>,
        balance: String,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))?;
        user.bank_name = bank_name;
        user.upi_id = upi_id;
        user.balance = balance;
        Ok(())
    }

    async fn list_categories(&self, user_id: &str) -> Result<Vec<Category>, LedgerError> {
        let state = self.state.lock().await;
        let mut categories: Vec<Category> = state
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn record_transaction(&self, record: TransactionRecord) -> Result<Transaction, LedgerError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        // Every fallible step happens before the first write.
        let payer = state
            .users
            .get(&record.paid_by)
            .ok_or_else(|| LedgerError::UserNotFound(record.paid_by.clone()))?;
        let current_balance = self.decode_balance(payer)?;
        let new_balance = self.encode_balance(&record.paid_by, current_balance + record.balance_delta)?;

        let category_id = match record.category_name {
            Some(ref name) => {
                let existing = state
                    .categories
                    .values()
                    .find(|c| c.user_id == record.user_id && c.name.eq_ignore_ascii_case(name))
                    .map(|c| c.id.clone());
                match existing {
                    Some(id) => Some(id),
                    None => {
                        let category = Category {
                            id: Uuid::new_v4().to_string(),
                            user_id: record.user_id.clone(),
                            name: name.clone(),
                        };
                        state.categories.insert(category.id.clone(), category.clone());
                        Some(category.id)
                    }
                }
            }
            None => None,
        };

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: record.user_id.clone(),
            amount: record.amount,
            kind: record.kind,
            category_id,
            transaction_date: record.transaction_date,
            description: record.description,
            is_shared: record.is_shared,
            paid_by: record.paid_by.clone(),
            created_at: now,
        };
        state
            .transactions
            .insert(transaction.id.clone(), transaction.clone());

        for new_obligation in record.obligations {
            let obligation = Obligation {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction.id.clone(),
                debtor_id: new_obligation.debtor_id,
                amount_owed: new_obligation.amount_owed,
                state: SettlementState::Open,
                settled_on: None,
                confirmed_on: None,
            };
            state.obligations.insert(obligation.id.clone(), obligation);
        }

        if let Some(new_scholarship) = record.scholarship {
            state.scholarships.push(Scholarship {
                id: Uuid::new_v4().to_string(),
                user_id: record.user_id.clone(),
                name: new_scholarship.name,
                amount: new_scholarship.amount,
                received_on: new_scholarship.received_on,
                note: new_scholarship.note,
                created_at: now,
            });
        }

        if let Some(payer) = state.users.get_mut(&record.paid_by) {
            payer.balance = new_balance;
        }

        Ok(transaction)
    }

    async fn list_transactions(
        &self,
        user_id: &str,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionRow>, LedgerError> {
        let state = self.state.lock().await;
        let mut rows: Vec<TransactionRow> = state
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .filter(|t| filter.kind.is_none_or(|k| t.kind == k))
            .filter(|t| {
                filter
                    .category_id
                    .as_ref()
                    .is_none_or(|c| t.category_id.as_deref() == Some(c.as_str()))
            })
            .map(|t| TransactionRow {
                transaction: t.clone(),
                category_name: t
                    .category_id
                    .as_ref()
                    .and_then(|id| state.categories.get(id))
                    .map(|c| c.name.clone()),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.transaction
                .transaction_date
                .cmp(&a.transaction.transaction_date)
                .then(b.transaction.created_at.cmp(&a.transaction.created_at))
        });
        Ok(rows)
    }

    async fn list_scholarships(&self, user_id: &str) -> Result<Vec<Scholarship>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state
            .scholarships
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn open_obligations_for(&self, user_id: &str) -> Result<Vec<ObligationContext>, LedgerError> {
        let state = self.state.lock().await;
        let mut contexts = Vec::new();
        for obligation in state.obligations.values() {
            if obligation.state != SettlementState::Open {
                continue;
            }
            let transaction = state.transactions.get(&obligation.transaction_id).ok_or_else(|| {
                LedgerError::StorageError(format!("obligation {} has no parent transaction", obligation.id))
            })?;
            let payer_id = transaction.paid_by.clone();
            if obligation.debtor_id == payer_id {
                continue; // self-splits are rejected at creation; skip any stray row
            }
            let counterpart_id = if obligation.debtor_id == user_id {
                payer_id.clone()
            } else if payer_id == user_id {
                obligation.debtor_id.clone()
            } else {
                continue;
            };
            contexts.push(ObligationContext {
                settlement_id: obligation.id.clone(),
                debtor_id: obligation.debtor_id.clone(),
                payer_id,
                counterpart_name: state.user_name(&counterpart_id),
                counterpart_id,
                amount_owed: obligation.amount_owed.clone(),
            });
        }
        Ok(contexts)
    }

    async fn obligations_between(
        &self,
        user_id: &str,
        friend_id: &str,
    ) -> Result<Vec<BreakupRow>, LedgerError> {
        let state = self.state.lock().await;
        let mut rows = Vec::new();
        for obligation in state.obligations.values() {
            let Some(transaction) = state.transactions.get(&obligation.transaction_id) else {
                continue;
            };
            let pair = (obligation.debtor_id.as_str(), transaction.paid_by.as_str());
            if pair != (user_id, friend_id) && pair != (friend_id, user_id) {
                continue;
            }
            rows.push(BreakupRow {
                settlement_id: obligation.id.clone(),
                transaction_id: transaction.id.clone(),
                debtor_id: obligation.debtor_id.clone(),
                paid_by: transaction.paid_by.clone(),
                description: transaction.description.clone(),
                transaction_date: transaction.transaction_date,
                transaction_total: transaction.amount.clone(),
                amount_owed: obligation.amount_owed.clone(),
                state: obligation.state,
                settled_on: obligation.settled_on,
            });
        }
        rows.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
        Ok(rows)
    }

    async fn claim_obligation(
        &self,
        settlement_id: &str,
        debtor_id: &str,
    ) -> Result<Option<ClaimReceipt>, LedgerError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(obligation) = state.obligations.get_mut(settlement_id) else {
            return Ok(None);
        };
        if obligation.debtor_id != debtor_id {
            return Ok(None);
        }
        let payer_id = state
            .transactions
            .get(&obligation.transaction_id)
            .map(|t| t.paid_by.clone())
            .ok_or_else(|| {
                LedgerError::StorageError(format!("obligation {} has no parent transaction", settlement_id))
            })?;
        if !obligation.claim(Utc::now()) {
            return Ok(None);
        }
        Ok(Some(ClaimReceipt {
            settlement_id: settlement_id.to_string(),
            payer_id,
        }))
    }

    async fn cancel_claim(
        &self,
        settlement_id: &str,
        debtor_id: &str,
    ) -> Result<Option<ClaimReceipt>, LedgerError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(obligation) = state.obligations.get_mut(settlement_id) else {
            return Ok(None);
        };
        if obligation.debtor_id != debtor_id {
            return Ok(None);
        }
        let payer_id = state
            .transactions
            .get(&obligation.transaction_id)
            .map(|t| t.paid_by.clone())
            .ok_or_else(|| {
                LedgerError::StorageError(format!("obligation {} has no parent transaction", settlement_id))
            })?;
        if !obligation.cancel_claim() {
            return Ok(None);
        }
        Ok(Some(ClaimReceipt {
            settlement_id: settlement_id.to_string(),
            payer_id,
        }))
    }

    async fn confirm_obligation(
        &self,
        settlement_id: &str,
        receiver_id: &str,
    ) -> Result<ConfirmReceipt, LedgerError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let now = Utc::now();

        let obligation = state
            .obligations
            .get(settlement_id)
            .ok_or_else(|| LedgerError::SettlementNotPending(settlement_id.to_string()))?;
        let transaction = state
            .transactions
            .get(&obligation.transaction_id)
            .ok_or_else(|| LedgerError::SettlementNotPending(settlement_id.to_string()))?;
        if transaction.paid_by != receiver_id || obligation.state != SettlementState::Claimed {
            return Err(LedgerError::SettlementNotPending(settlement_id.to_string()));
        }
        let debtor_id = obligation.debtor_id.clone();

        let amount = self
            .codec
            .decode(&obligation.amount_owed)
            .ok()
            .and_then(|plain| plain.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| {
                LedgerError::Codec(format!("amount_owed on settlement {} is unreadable", settlement_id))
            })?;

        let debtor = state
            .users
            .get(&debtor_id)
            .ok_or_else(|| LedgerError::UserNotFound(debtor_id.clone()))?;
        let receiver = state
            .users
            .get(receiver_id)
            .ok_or_else(|| LedgerError::UserNotFound(receiver_id.to_string()))?;
        let debtor_balance = self.decode_balance(debtor)?;
        let receiver_balance = self.decode_balance(receiver)?;

        // The one place balance sufficiency is enforced.
        if debtor_balance < amount {
            return Err(LedgerError::InsufficientBalance(debtor_id));
        }

        let new_debtor_balance = self.encode_balance(&debtor_id, debtor_balance - amount)?;
        let new_receiver_balance = self.encode_balance(receiver_id, receiver_balance + amount)?;

        // All checks passed; apply the unit's writes.
        if let Some(obligation) = state.obligations.get_mut(settlement_id) {
            obligation.confirm(now);
        }
        if let Some(debtor) = state.users.get_mut(&debtor_id) {
            debtor.balance = new_debtor_balance;
        }
        if let Some(receiver) = state.users.get_mut(receiver_id) {
            receiver.balance = new_receiver_balance;
        }

        Ok(ConfirmReceipt {
            settlement_id: settlement_id.to_string(),
            debtor_id,
            creditor_id: receiver_id.to_string(),
            amount,
        })
    }

    async fn pending_confirmations(&self, receiver_id: &str) -> Result<Vec<PendingRow>, LedgerError> {
        let state = self.state.lock().await;
        let mut rows: Vec<PendingRow> = state
            .obligations
            .values()
            .filter(|o| o.state == SettlementState::Claimed)
            .filter(|o| {
                state
                    .transactions
                    .get(&o.transaction_id)
                    .is_some_and(|t| t.paid_by == receiver_id)
            })
            .map(|o| PendingRow {
                settlement_id: o.id.clone(),
                debtor_id: o.debtor_id.clone(),
                debtor_name: state.user_name(&o.debtor_id),
                amount_owed: o.amount_owed.clone(),
                settled_on: o.settled_on,
            })
            .collect();
        rows.sort_by(|a, b| a.settled_on.cmp(&b.settled_on));
        Ok(rows)
    }

    async fn save_friend_request(&self, request: FriendRequest) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;
        let duplicate = state.friend_requests.values().any(|r| {
            (r.sender_id == request.sender_id && r.receiver_id == request.receiver_id)
                || (r.sender_id == request.receiver_id && r.receiver_id == request.sender_id)
        });
        if duplicate {
            return Err(LedgerError::DuplicateFriendRequest(
                request.sender_id,
                request.receiver_id,
            ));
        }
        state.friend_requests.insert(request.id.clone(), request);
        Ok(())
    }

    async fn respond_friend_request(
        &self,
        request_id: &str,
        receiver_id: &str,
        accept: bool,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;
        let request = state
            .friend_requests
            .get_mut(request_id)
            .filter(|r| r.receiver_id == receiver_id && r.status == FriendRequestStatus::Pending)
            .ok_or_else(|| LedgerError::FriendRequestNotFound(request_id.to_string()))?;
        request.status = if accept {
            FriendRequestStatus::Accepted
        } else {
            FriendRequestStatus::Rejected
        };
        Ok(())
    }

    async fn incoming_friend_requests(&self, user_id: &str) -> Result<Vec<FriendRequestView>, LedgerError> {
        let state = self.state.lock().await;
        let mut views: Vec<FriendRequestView> = state
            .friend_requests
            .values()
            .filter(|r| r.receiver_id == user_id && r.status == FriendRequestStatus::Pending)
            .map(|r| FriendRequestView {
                id: r.id.clone(),
                sender_id: r.sender_id.clone(),
                sender_name: state.user_name(&r.sender_id),
                created_at: r.created_at,
            })
            .collect();
        views.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(views)
    }

    async fn list_friends(&self, user_id: &str) -> Result<Vec<FriendSummary>, LedgerError> {
        let state = self.state.lock().await;
        let mut friends: Vec<FriendSummary> = state
            .friend_requests
            .values()
            .filter(|r| r.status == FriendRequestStatus::Accepted)
            .filter_map(|r| {
                let other = if r.sender_id == user_id {
                    &r.receiver_id
                } else if r.receiver_id == user_id {
                    &r.sender_id
                } else {
                    return None;
                };
                state.users.get(other).map(|u| FriendSummary {
                    id: u.id.clone(),
                    name: u.name.clone(),
                    email: u.email.clone(),
                })
            })
            .collect();
        friends.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(friends)
    }

    async fn are_friends(&self, user_id: &str, other_id: &str) -> Result<bool, LedgerError> {
        let state = self.state.lock().await;
        Ok(state.friend_requests.values().any(|r| {
            r.status == FriendRequestStatus::Accepted
                && ((r.sender_id == user_id && r.receiver_id == other_id)
                    || (r.sender_id == other_id && r.receiver_id == user_id))
        }))
    }
}
