use async_trait::async_trait;

use crate::core::errors::LedgerError;
use crate::core::models::{
    category::Category,
    friend::{FriendRequest, FriendRequestView, FriendSummary},
    scholarship::Scholarship,
    settlement::{BreakupRow, ClaimReceipt, ConfirmReceipt, ObligationContext, PendingRow},
    transaction::{Transaction, TransactionFilter, TransactionRecord, TransactionRow},
    user::User,
};

/// The ledger store boundary. Every method is one atomic unit: it commits
/// all of its row reads and writes or none of them, and any balance it
/// touches is decoded, adjusted, and re-encoded without leaving that unit.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn create_user_if_not_exists(&self, user: User) -> Result<User, LedgerError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, LedgerError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, LedgerError>;
    async fn update_profile(
        &self,
        user_id: &str,
        name: String,
        mobile_no: Option<String>,
    ) -> Result<(), LedgerError>;
    async fn save_bank_details(
        &self,
        user_id: &str,
        bank_name: Option<String>,
        upi_id: Option<String>,
        balance: String,
    ) -> Result<(), LedgerError>;

    async fn list_categories(&self, user_id: &str) -> Result<Vec<Category>, LedgerError>;

    /// The transaction-creation unit: resolve-or-create the category, insert
    /// the transaction plus its obligation and scholarship rows, and apply
    /// the signed balance delta to the payer.
    async fn record_transaction(&self, record: TransactionRecord) -> Result<Transaction, LedgerError>;
    async fn list_transactions(
        &self,
        user_id: &str,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionRow>, LedgerError>;
    async fn list_scholarships(&self, user_id: &str) -> Result<Vec<Scholarship>, LedgerError>;

    /// OPEN obligations where the user is debtor or payer-of-record.
    async fn open_obligations_for(&self, user_id: &str) -> Result<Vec<ObligationContext>, LedgerError>;
    async fn obligations_between(
        &self,
        user_id: &str,
        friend_id: &str,
    ) -> Result<Vec<BreakupRow>, LedgerError>;
    /// OPEN → CLAIMED with exactly-one-row semantics: `None` when the row is
    /// missing, belongs to another debtor, or is not OPEN.
    async fn claim_obligation(
        &self,
        settlement_id: &str,
        debtor_id: &str,
    ) -> Result<Option<ClaimReceipt>, LedgerError>;
    /// CLAIMED → OPEN, same exactly-one-row semantics.
    async fn cancel_claim(
        &self,
        settlement_id: &str,
        debtor_id: &str,
    ) -> Result<Option<ClaimReceipt>, LedgerError>;
    /// The settlement-confirmation unit: CLAIMED → CONFIRMED gated on the
    /// acting receiver being the payer-of-record and the debtor's balance
    /// covering the owed amount, then the two-balance swap.
    async fn confirm_obligation(
        &self,
        settlement_id: &str,
        receiver_id: &str,
    ) -> Result<ConfirmReceipt, LedgerError>;
    async fn pending_confirmations(&self, receiver_id: &str) -> Result<Vec<PendingRow>, LedgerError>;

    async fn save_friend_request(&self, request: FriendRequest) -> Result<(), LedgerError>;
    async fn respond_friend_request(
        &self,
        request_id: &str,
        receiver_id: &str,
        accept: bool,
    ) -> Result<(), LedgerError>;
    async fn incoming_friend_requests(&self, user_id: &str) -> Result<Vec<FriendRequestView>, LedgerError>;
    async fn list_friends(&self, user_id: &str) -> Result<Vec<FriendSummary>, LedgerError>;
    async fn are_friends(&self, user_id: &str, other_id: &str) -> Result<bool, LedgerError>;
}

pub mod in_memory;
