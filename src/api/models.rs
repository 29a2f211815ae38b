use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::core::errors::LedgerError;
use crate::core::models::transaction::SharedWith;

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub mobile_no: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile_no: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserView,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub mobile_no: String,
}

#[derive(Deserialize, ToSchema)]
pub struct BankDetailsRequest {
    pub bank_name: Option<String>,
    pub upi_id: Option<String>,
    pub initial_balance: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category_name: Option<String>,
    pub transaction_date: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_shared: bool,
    pub shared_with: Option<SharedWith>,
    pub shared_amount: Option<f64>,
    pub paid_by: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct TransactionQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SettleRequest {
    pub settlement_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CancelClaimRequest {
    pub settlement_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ClaimPaymentsRequest {
    pub settlement_ids: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ConfirmSettlementsRequest {
    pub settlement_ids: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SendFriendRequestRequest {
    pub user_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RespondFriendRequestRequest {
    pub request_id: String,
    pub action: String, // "accept" | "reject"
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for LedgerError to implement IntoResponse
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self.0 {
            LedgerError::MissingField(field) => (StatusCode::BAD_REQUEST, format!("{} is required", field)),
            LedgerError::InvalidAmount => (StatusCode::BAD_REQUEST, "Invalid or missing amount".to_string()),
            LedgerError::InvalidTransactionKind(kind) => {
                (StatusCode::BAD_REQUEST, format!("Unknown transaction type: {}", kind))
            }
            LedgerError::InvalidDate(date) => {
                (StatusCode::BAD_REQUEST, format!("Invalid transaction date: {}", date))
            }
            LedgerError::OverSplit => (
                StatusCode::BAD_REQUEST,
                "Total shared amount cannot exceed the total amount paid".to_string(),
            ),
            LedgerError::SelfSplit => (
                StatusCode::BAD_REQUEST,
                "Cannot split a transaction with yourself".to_string(),
            ),
            LedgerError::NotAFriend(id) => (
                StatusCode::BAD_REQUEST,
                format!("User {} is not an accepted friend", id),
            ),
            LedgerError::InvalidInput(field, detail) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid input for {}: {:?}", field, detail),
            ),
            LedgerError::InvalidEmail(email) => (StatusCode::BAD_REQUEST, format!("Invalid email: {}", email)),
            LedgerError::EmailAlreadyRegistered(email) => {
                (StatusCode::CONFLICT, format!("Email {} already registered", email))
            }
            LedgerError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string()),
            LedgerError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            LedgerError::UserNotFound(id) => (StatusCode::NOT_FOUND, format!("User {} not found", id)),
            LedgerError::SettlementNotOpen(id) => (
                StatusCode::BAD_REQUEST,
                format!("Unable to mark settlement {} as paid (invalid id or already settled)", id),
            ),
            LedgerError::SettlementNotClaimed(id) => (
                StatusCode::BAD_REQUEST,
                format!("Unable to cancel claim on settlement {} (not in claimed state)", id),
            ),
            LedgerError::SettlementNotPending(id) => (
                StatusCode::BAD_REQUEST,
                format!("Settlement {} not found or not pending confirmation", id),
            ),
            LedgerError::InsufficientBalance(id) => (
                StatusCode::BAD_REQUEST,
                format!("Debtor {} does not have sufficient balance", id),
            ),
            LedgerError::EmptySettlementBatch => {
                (StatusCode::BAD_REQUEST, "settlement_ids array required".to_string())
            }
            LedgerError::DuplicateFriendRequest(sender, receiver) => (
                StatusCode::CONFLICT,
                format!("Friend request already exists between {} and {}", sender, receiver),
            ),
            LedgerError::FriendRequestNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Friend request {} not found", id))
            }
            LedgerError::InvalidFriendAction(action) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid friend request action: {}", action),
            ),
            // 500-class: log the detail server-side, keep the wire message generic.
            LedgerError::BalanceCorrupted(id) => {
                tracing::error!("stored balance for user {} is corrupted", id);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            LedgerError::Codec(msg) => {
                tracing::error!("codec error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            LedgerError::StorageError(msg) => {
                tracing::error!("storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            LedgerError::CacheError(msg) => {
                tracing::error!("cache error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            LedgerError::InternalServerError(msg) => {
                tracing::error!("internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}
