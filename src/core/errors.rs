use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

#[derive(Error, Debug, Serialize)]
pub enum LedgerError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid or missing amount")]
    InvalidAmount,
    #[error("Unknown transaction type: {0}")]
    InvalidTransactionKind(String),
    #[error("Invalid transaction date: {0}")]
    InvalidDate(String),
    #[error("Total shared amount cannot exceed the total amount paid")]
    OverSplit,
    #[error("Cannot split a transaction with yourself")]
    SelfSplit,
    #[error("User {0} is not an accepted friend")]
    NotAFriend(String),
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),
    #[error("Email {0} already registered")]
    EmailAlreadyRegistered(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("User {0} not found")]
    UserNotFound(String),

    /// Claim refused: the row is missing, belongs to someone else, or is not OPEN.
    #[error("Unable to mark settlement {0} as paid (invalid id or already settled)")]
    SettlementNotOpen(String),
    /// Cancel refused: the row is missing, belongs to someone else, or is not CLAIMED.
    #[error("Unable to cancel claim on settlement {0} (not in claimed state)")]
    SettlementNotClaimed(String),
    /// Confirm refused: no CLAIMED row with this id awaiting the acting receiver.
    #[error("Settlement {0} not found or not pending confirmation")]
    SettlementNotPending(String),
    #[error("Debtor {0} does not have sufficient balance")]
    InsufficientBalance(String),
    #[error("settlement_ids array required")]
    EmptySettlementBatch,

    #[error("Friend request already exists between {0} and {1}")]
    DuplicateFriendRequest(String, String),
    #[error("Friend request {0} not found")]
    FriendRequestNotFound(String),
    #[error("Invalid friend request action: {0}")]
    InvalidFriendAction(String),

    /// A balance that must be trusted failed to decode; the enclosing atomic
    /// unit is rolled back.
    #[error("Stored balance for user {0} is corrupted")]
    BalanceCorrupted(String),
    #[error("Codec error: {0}")]
    Codec(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Cache error: {0}")]
    CacheError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}
