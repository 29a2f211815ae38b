use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::jwt::{Claims, JwtService};
use crate::codec::ValueCodec;
use crate::core::errors::{FieldError, LedgerError};
use crate::core::models::{
    category::Category,
    friend::{FriendRequest, FriendRequestStatus, FriendRequestView, FriendSummary},
    settlement::{
        BreakupEntry, ClaimOutcome, ConfirmOutcome, NetPosition, PendingConfirmation,
    },
    transaction::{
        NewObligation, NewScholarship, SharedWith, TransactionFilter, TransactionKind,
        TransactionRecord, TransactionView,
    },
    user::User,
};
use crate::core::recorder;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::storage::Storage;

const NET_SUMMARY_TTL: std::time::Duration = std::time::Duration::from_secs(3600);
const NAME_MAX_LEN: usize = 100;
const DESCRIPTION_MAX_LEN: usize = 255;

#[derive(Clone, Debug, Default)]
pub struct CreateTransactionInput {
    pub amount: Option<f64>,
    pub kind: Option<String>,
    pub category_name: Option<String>,
    pub transaction_date: Option<String>,
    pub description: Option<String>,
    pub is_shared: bool,
    pub shared_with: Option<SharedWith>,
    pub shared_amount: Option<f64>,
    pub paid_by: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile_no: Option<String>,
    pub bank_name: Option<String>,
    pub upi_id: Option<String>,
    /// Decoded balance; `None` when the stored value cannot be read at all.
    pub balance: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct BankDetailsView {
    pub bank_name: Option<String>,
    pub upi_id: Option<String>,
    pub balance: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ScholarshipView {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[schema(value_type = String, example = "2025-04-01")]
    pub received_on: NaiveDate,
    pub note: String,
}

pub struct LedgerService<S: Storage, C: Cache> {
    storage: S,
    cache: C,
    codec: Arc<dyn ValueCodec>,
    jwt_service: JwtService,
}

impl<S: Storage, C: Cache> LedgerService<S, C> {
    pub fn new(storage: S, cache: C, codec: Arc<dyn ValueCodec>, jwt_secret: String) -> Self {
        LedgerService {
            storage,
            cache,
            codec,
            jwt_service: JwtService::new(jwt_secret),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, LedgerError> {
        self.jwt_service.validate_token(token)
    }

    // VALIDATION & CODEC HELPERS

    async fn validate_users(&self, user_ids: &[&str]) -> Result<(), LedgerError> {
        for &user_id in user_ids {
            if self.storage.get_user(user_id).await?.is_none() {
                return Err(LedgerError::UserNotFound(user_id.to_string()));
            }
        }
        Ok(())
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), LedgerError> {
        if value.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("Invalid {}", field),
                    description: format!("{} cannot be empty", field),
                },
            ));
        }
        if value.len() > max_length {
            return Err(LedgerError::InvalidInput(
                field.to_string(),
                FieldError {
                    field: field.to_string(),
                    title: format!("{} Too Long", field),
                    description: format!("{} cannot exceed {} characters", field, max_length),
                },
            ));
        }
        Ok(())
    }

    fn encode_value(&self, plaintext: &str) -> Result<String, LedgerError> {
        self.codec
            .encode(plaintext)
            .map_err(|e| LedgerError::Codec(e.to_string()))
    }

    /// Decode a stored amount for display. A corrupted row must not take the
    /// whole listing down: fall back to reading the raw stored value as a
    /// number, then to zero.
    fn decode_amount(&self, token: &str) -> f64 {
        match self.codec.decode(token) {
            Ok(plain) => plain.parse().unwrap_or(0.0),
            Err(e) => {
                warn!("amount decode degraded to raw value: {}", e);
                token.parse().unwrap_or(0.0)
            }
        }
    }

    /// As `decode_amount`, but distinguishes "unreadable" from zero.
    fn decode_amount_opt(&self, token: &str) -> Option<f64> {
        match self.codec.decode(token) {
            Ok(plain) => plain.parse().ok(),
            Err(_) => token.parse().ok(),
        }
    }

    fn decode_text(&self, token: &str) -> String {
        match self.codec.decode(token) {
            Ok(plain) => plain,
            Err(e) => {
                warn!("text decode degraded to raw value: {}", e);
                token.to_string()
            }
        }
    }

    // AUTH & PROFILE

    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
        mobile_no: Option<String>,
    ) -> Result<User, LedgerError> {
        if email.is_empty() {
            return Err(LedgerError::MissingField("email"));
        }
        if !email.contains('@') || !email.contains('.') || email.len() < 5 {
            return Err(LedgerError::InvalidEmail(email));
        }
        if password.is_empty() {
            return Err(LedgerError::InvalidInput(
                "password".to_string(),
                FieldError {
                    field: "password".to_string(),
                    title: "Invalid password".to_string(),
                    description: "Password cannot be empty".to_string(),
                },
            ));
        }
        self.validate_string_input("name", &name, NAME_MAX_LEN)?;

        let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
            .map_err(|e| LedgerError::InternalServerError(format!("Password hashing error: {}", e)))?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password: password_hash,
            mobile_no,
            bank_name: None,
            upi_id: None,
            balance: self.encode_value("0")?,
            created_at: Utc::now(),
        };

        let created = self.storage.create_user_if_not_exists(user).await?;
        info!(user_id = %created.id, "registered user");
        Ok(created)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(String, User), LedgerError> {
        let user = self
            .storage
            .get_user_by_email(email)
            .await?
            .ok_or(LedgerError::InvalidCredentials)?;

        let matches = bcrypt::verify(password, &user.password)
            .map_err(|e| LedgerError::InternalServerError(format!("Password verification error: {}", e)))?;
        if !matches {
            return Err(LedgerError::InvalidCredentials);
        }

        let token = self.jwt_service.generate_token(&user.id, "USER")?;
        Ok((token, user))
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, LedgerError> {
        self.storage.get_user(user_id).await
    }

    pub async fn profile(&self, user_id: &str) -> Result<ProfileView, LedgerError> {
        let user = self
            .storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))?;
        Ok(ProfileView {
            balance: self.decode_amount_opt(&user.balance),
            id: user.id,
            name: user.name,
            email: user.email,
            mobile_no: user.mobile_no,
            bank_name: user.bank_name,
            upi_id: user.upi_id,
        })
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        name: String,
        mobile_no: String,
    ) -> Result<(), LedgerError> {
        self.validate_string_input("name", &name, NAME_MAX_LEN)?;
        if mobile_no.trim().is_empty() {
            return Err(LedgerError::MissingField("mobile_no"));
        }
        self.storage.update_profile(user_id, name, Some(mobile_no)).await
    }

    pub async fn save_bank_details(
        &self,
        user_id: &str,
        bank_name: Option<String>,
        upi_id: Option<String>,
        initial_balance: f64,
    ) -> Result<(), LedgerError> {
        if !initial_balance.is_finite() {
            return Err(LedgerError::InvalidInput(
                "initial_balance".to_string(),
                FieldError {
                    field: "initial_balance".to_string(),
                    title: "Invalid balance".to_string(),
                    description: "Initial balance must be a valid number".to_string(),
                },
            ));
        }
        let encoded = self.encode_value(&initial_balance.to_string())?;
        self.storage
            .save_bank_details(user_id, bank_name, upi_id, encoded)
            .await
    }

    pub async fn bank_details(&self, user_id: &str) -> Result<BankDetailsView, LedgerError> {
        let user = self
            .storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))?;
        Ok(BankDetailsView {
            bank_name: user.bank_name,
            upi_id: user.upi_id,
            balance: self.decode_amount_opt(&user.balance),
        })
    }

    pub async fn categories(&self, user_id: &str) -> Result<Vec<Category>, LedgerError> {
        self.storage.list_categories(user_id).await
    }

    // TRANSACTION RECORDER

    pub async fn create_transaction(
        &self,
        owner_id: &str,
        input: CreateTransactionInput,
    ) -> Result<(), LedgerError> {
        let amount = input
            .amount
            .filter(|a| a.is_finite() && *a > 0.0)
            .ok_or(LedgerError::InvalidAmount)?;
        let kind_raw = input.kind.ok_or(LedgerError::MissingField("type"))?;
        let kind = TransactionKind::parse(&kind_raw)
            .ok_or_else(|| LedgerError::InvalidTransactionKind(kind_raw.clone()))?;
        let date_raw = input
            .transaction_date
            .ok_or(LedgerError::MissingField("transaction_date"))?;
        let transaction_date = NaiveDate::parse_from_str(date_raw.trim(), "%Y-%m-%d")
            .map_err(|_| LedgerError::InvalidDate(date_raw.clone()))?;

        let description = input.description.unwrap_or_default();
        if !description.trim().is_empty() {
            self.validate_string_input("description", &description, DESCRIPTION_MAX_LEN)?;
        }
        let category_name = match input.category_name {
            Some(name) => {
                self.validate_string_input("category_name", &name, NAME_MAX_LEN)?;
                Some(name.trim().to_lowercase())
            }
            None => None,
        };

        self.validate_users(&[owner_id]).await?;
        let paid_by = input.paid_by.unwrap_or_else(|| owner_id.to_string());

        // Normalize the participant list and work out the payer's own share.
        let participants = input
            .shared_with
            .as_ref()
            .map(recorder::normalize_participants)
            .unwrap_or_default();
        let (owner_share, obligations) = if input.is_shared && !participants.is_empty() {
            if participants.iter().any(|p| *p == paid_by || p.as_str() == owner_id) {
                return Err(LedgerError::SelfSplit);
            }
            let shared_amount = input
                .shared_amount
                .filter(|a| a.is_finite() && *a > 0.0)
                .ok_or(LedgerError::MissingField("shared_amount"))?;
            for participant in &participants {
                self.validate_users(&[participant.as_str()]).await?;
                if !self.storage.are_friends(owner_id, participant).await? {
                    return Err(LedgerError::NotAFriend(participant.clone()));
                }
            }
            let owner_share = recorder::owner_share(amount, shared_amount, participants.len())?;
            let encoded_share = self.encode_value(&shared_amount.to_string())?;
            let obligations = participants
                .iter()
                .map(|debtor_id| NewObligation {
                    debtor_id: debtor_id.clone(),
                    amount_owed: encoded_share.clone(),
                })
                .collect();
            (owner_share, obligations)
        } else {
            (amount, Vec::new())
        };

        let scholarship = if kind == TransactionKind::Scholarship {
            Some(NewScholarship {
                name: if description.trim().is_empty() {
                    "Scholarship".to_string()
                } else {
                    description.clone()
                },
                amount: self.encode_value(&owner_share.to_string())?,
                received_on: transaction_date,
                note: description.clone(),
            })
        } else {
            None
        };

        let record = TransactionRecord {
            user_id: owner_id.to_string(),
            paid_by: paid_by.clone(),
            kind,
            category_name,
            transaction_date,
            amount: self.encode_value(&owner_share.to_string())?,
            description: self.encode_value(&description)?,
            is_shared: input.is_shared,
            balance_delta: recorder::balance_delta(kind, owner_share),
            obligations,
            scholarship,
        };

        let transaction = self.storage.record_transaction(record).await?;
        debug!(transaction_id = %transaction.id, "recorded transaction");

        let mut touched: Vec<String> = participants;
        touched.push(paid_by);
        self.cache.invalidate_net_summaries(&touched).await?;

        info!(
            transaction_id = %transaction.id,
            owner_id,
            %kind,
            shared = transaction.is_shared,
            "transaction created"
        );
        Ok(())
    }

    pub async fn transactions(
        &self,
        owner_id: &str,
        kind: Option<String>,
        category_id: Option<String>,
    ) -> Result<Vec<TransactionView>, LedgerError> {
        let kind = match kind {
            Some(raw) => Some(
                TransactionKind::parse(&raw).ok_or_else(|| LedgerError::InvalidTransactionKind(raw.clone()))?,
            ),
            None => None,
        };
        let rows = self
            .storage
            .list_transactions(owner_id, TransactionFilter { kind, category_id })
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| TransactionView {
                amount: self.decode_amount(&row.transaction.amount),
                description: self.decode_text(&row.transaction.description),
                id: row.transaction.id,
                kind: row.transaction.kind,
                category_name: row.category_name,
                transaction_date: row.transaction.transaction_date,
                is_shared: row.transaction.is_shared,
                paid_by: row.transaction.paid_by,
                created_at: row.transaction.created_at,
            })
            .collect())
    }

    pub async fn scholarships(&self, user_id: &str) -> Result<Vec<ScholarshipView>, LedgerError> {
        let rows = self.storage.list_scholarships(user_id).await?;
        Ok(rows
            .into_iter()
            .map(|s| ScholarshipView {
                amount: self.decode_amount(&s.amount),
                id: s.id,
                name: s.name,
                received_on: s.received_on,
                note: s.note,
            })
            .collect())
    }

    // SETTLEMENT LEDGER

    pub async fn net_summary(&self, user_id: &str) -> Result<Vec<NetPosition>, LedgerError> {
        if let Some(cached) = self.cache.get_net_summary(user_id).await? {
            debug!(user_id, "net summary served from cache");
            return Ok(cached);
        }

        let contexts = self.storage.open_obligations_for(user_id).await?;
        let mut by_friend: HashMap<String, NetPosition> = HashMap::new();
        for ctx in contexts {
            let amount = self.decode_amount(&ctx.amount_owed);
            let entry = by_friend
                .entry(ctx.counterpart_id.clone())
                .or_insert_with(|| NetPosition {
                    friend_id: ctx.counterpart_id.clone(),
                    friend_name: ctx.counterpart_name.clone(),
                    total_given: 0.0,
                    total_taken: 0.0,
                    net_amount: 0.0,
                });
            if ctx.debtor_id == user_id {
                entry.total_taken += amount;
            } else {
                entry.total_given += amount;
            }
            entry.net_amount = entry.total_given - entry.total_taken;
        }

        let mut summary: Vec<NetPosition> = by_friend.into_values().collect();
        summary.sort_by(|a, b| a.friend_name.cmp(&b.friend_name).then(a.friend_id.cmp(&b.friend_id)));

        self.cache
            .save_net_summary(user_id, &summary, NET_SUMMARY_TTL)
            .await?;
        Ok(summary)
    }

    pub async fn breakup(&self, user_id: &str, friend_id: &str) -> Result<Vec<BreakupEntry>, LedgerError> {
        self.validate_users(&[friend_id]).await?;
        let rows = self.storage.obligations_between(user_id, friend_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| BreakupEntry {
                description: self.decode_text(&row.description),
                transaction_total: self.decode_amount_opt(&row.transaction_total),
                amount_owed: self.decode_amount(&row.amount_owed),
                is_settled: row.state.is_settled(),
                is_paid_by_user: row.state.is_paid_by_user(),
                is_confirmed_by_receiver: row.state.is_confirmed_by_receiver(),
                settlement_id: row.settlement_id,
                transaction_id: row.transaction_id,
                debtor_id: row.debtor_id,
                paid_by: row.paid_by,
                transaction_date: row.transaction_date,
                settled_on: row.settled_on,
            })
            .collect())
    }

    /// Debtor marks one obligation as paid (OPEN → CLAIMED). The receiver
    /// still has to confirm before any balance moves.
    pub async fn settle(&self, user_id: &str, settlement_id: &str) -> Result<(), LedgerError> {
        if settlement_id.trim().is_empty() {
            return Err(LedgerError::MissingField("settlement_id"));
        }
        match self.storage.claim_obligation(settlement_id, user_id).await? {
            Some(receipt) => {
                self.cache
                    .invalidate_net_summaries(&[user_id.to_string(), receipt.payer_id.clone()])
                    .await?;
                info!(settlement_id, user_id, "settlement claimed");
                Ok(())
            }
            None => Err(LedgerError::SettlementNotOpen(settlement_id.to_string())),
        }
    }

    /// Batch claim; each id succeeds or fails on its own.
    pub async fn claim_payments(
        &self,
        user_id: &str,
        settlement_ids: Vec<String>,
    ) -> Result<ClaimOutcome, LedgerError> {
        if settlement_ids.is_empty() {
            return Err(LedgerError::EmptySettlementBatch);
        }

        let mut outcome = ClaimOutcome {
            claimed: Vec::new(),
            failed: Vec::new(),
        };
        let mut touched = vec![user_id.to_string()];
        for settlement_id in settlement_ids {
            match self.storage.claim_obligation(&settlement_id, user_id).await {
                Ok(Some(receipt)) => {
                    touched.push(receipt.payer_id);
                    outcome.claimed.push(settlement_id);
                }
                Ok(None) => outcome.failed.push(settlement_id),
                Err(e) => {
                    warn!(%settlement_id, "claim failed: {}", e);
                    outcome.failed.push(settlement_id);
                }
            }
        }
        touched.dedup();
        self.cache.invalidate_net_summaries(&touched).await?;
        Ok(outcome)
    }

    /// Debtor withdraws a claim (CLAIMED → OPEN).
    pub async fn cancel_claim(&self, user_id: &str, settlement_id: &str) -> Result<(), LedgerError> {
        if settlement_id.trim().is_empty() {
            return Err(LedgerError::MissingField("settlement_id"));
        }
        match self.storage.cancel_claim(settlement_id, user_id).await? {
            Some(receipt) => {
                self.cache
                    .invalidate_net_summaries(&[user_id.to_string(), receipt.payer_id.clone()])
                    .await?;
                info!(settlement_id, user_id, "claim cancelled");
                Ok(())
            }
            None => Err(LedgerError::SettlementNotClaimed(settlement_id.to_string())),
        }
    }

    /// Receiver finalizes claims. Each id is its own atomic unit: a failure
    /// lands in `failed` and never rolls back its siblings.
    pub async fn confirm_settlements(
        &self,
        receiver_id: &str,
        settlement_ids: Vec<String>,
    ) -> Result<ConfirmOutcome, LedgerError> {
        if settlement_ids.is_empty() {
            return Err(LedgerError::EmptySettlementBatch);
        }

        let results = join_all(
            settlement_ids
                .iter()
                .map(|id| self.storage.confirm_obligation(id, receiver_id)),
        )
        .await;

        let mut outcome = ConfirmOutcome {
            confirmed: Vec::new(),
            failed: Vec::new(),
        };
        let mut touched = vec![receiver_id.to_string()];
        for (settlement_id, result) in settlement_ids.into_iter().zip(results) {
            match result {
                Ok(receipt) => {
                    info!(
                        %settlement_id,
                        debtor_id = %receipt.debtor_id,
                        amount = receipt.amount,
                        "settlement confirmed"
                    );
                    touched.push(receipt.debtor_id);
                    outcome.confirmed.push(settlement_id);
                }
                Err(e) => {
                    warn!(%settlement_id, "confirmation failed: {}", e);
                    outcome.failed.push(settlement_id);
                }
            }
        }
        touched.dedup();
        self.cache.invalidate_net_summaries(&touched).await?;
        Ok(outcome)
    }

    pub async fn pending_confirmations(
        &self,
        receiver_id: &str,
    ) -> Result<Vec<PendingConfirmation>, LedgerError> {
        let rows = self.storage.pending_confirmations(receiver_id).await?;
        Ok(rows
            .into_iter()
            .map(|row| PendingConfirmation {
                amount_owed: self.decode_amount(&row.amount_owed),
                settlement_id: row.settlement_id,
                debtor_id: row.debtor_id,
                debtor_name: row.debtor_name,
                settled_on: row.settled_on,
            })
            .collect())
    }

    // FRIENDS

    pub async fn send_friend_request(&self, sender_id: &str, receiver_id: &str) -> Result<(), LedgerError> {
        if receiver_id.trim().is_empty() {
            return Err(LedgerError::MissingField("user_id"));
        }
        if sender_id == receiver_id {
            return Err(LedgerError::InvalidInput(
                "user_id".to_string(),
                FieldError {
                    field: "user_id".to_string(),
                    title: "Invalid friend request".to_string(),
                    description: "Cannot send a friend request to yourself".to_string(),
                },
            ));
        }
        self.validate_users(&[receiver_id]).await?;

        self.storage
            .save_friend_request(FriendRequest {
                id: Uuid::new_v4().to_string(),
                sender_id: sender_id.to_string(),
                receiver_id: receiver_id.to_string(),
                status: FriendRequestStatus::Pending,
                created_at: Utc::now(),
            })
            .await?;
        info!(sender_id, receiver_id, "friend request sent");
        Ok(())
    }

    pub async fn respond_friend_request(
        &self,
        user_id: &str,
        request_id: &str,
        action: &str,
    ) -> Result<(), LedgerError> {
        let accept = match action {
            "accept" => true,
            "reject" => false,
            other => return Err(LedgerError::InvalidFriendAction(other.to_string())),
        };
        self.storage
            .respond_friend_request(request_id, user_id, accept)
            .await?;
        info!(request_id, user_id, accept, "friend request answered");
        Ok(())
    }

    pub async fn friends(&self, user_id: &str) -> Result<Vec<FriendSummary>, LedgerError> {
        self.storage.list_friends(user_id).await
    }

    pub async fn incoming_friend_requests(&self, user_id: &str) -> Result<Vec<FriendRequestView>, LedgerError> {
        self.storage.incoming_friend_requests(user_id).await
    }
}
