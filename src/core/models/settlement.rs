use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::obligation::SettlementState;

/// Net position of the requesting user against one friend, aggregated over
/// OPEN obligations only. `total_given` is what the friend still owes the
/// user, `total_taken` what the user still owes the friend.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NetPosition {
    pub friend_id: String,
    pub friend_name: String,
    pub total_given: f64,
    pub total_taken: f64,
    pub net_amount: f64,
}

/// One OPEN obligation as the net-summary scan sees it: the pair of debtor
/// and payer-of-record plus the counterpart from the requesting user's side.
#[derive(Clone, Debug)]
pub struct ObligationContext {
    pub settlement_id: String,
    pub debtor_id: String,
    pub payer_id: String,
    pub counterpart_id: String,
    pub counterpart_name: String,
    pub amount_owed: String, // encoded
}

/// Storage row for the friend-level statement, still encoded.
#[derive(Clone, Debug)]
pub struct BreakupRow {
    pub settlement_id: String,
    pub transaction_id: String,
    pub debtor_id: String,
    pub paid_by: String,
    pub description: String,       // encoded
    pub transaction_date: NaiveDate,
    pub transaction_total: String, // encoded owner share
    pub amount_owed: String,       // encoded
    pub state: SettlementState,
    pub settled_on: Option<DateTime<Utc>>,
}

/// Decoded statement entry as it leaves the API, with the legacy status
/// flags the frontend expects.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BreakupEntry {
    pub settlement_id: String,
    pub transaction_id: String,
    pub debtor_id: String,
    pub paid_by: String,
    pub description: String,
    #[schema(value_type = String, example = "2025-04-01")]
    pub transaction_date: NaiveDate,
    pub transaction_total: Option<f64>,
    pub amount_owed: f64,
    pub is_settled: bool,
    pub is_paid_by_user: bool,
    pub is_confirmed_by_receiver: bool,
    #[schema(value_type = Option<String>, example = "2025-04-02T08:00:00Z")]
    pub settled_on: Option<DateTime<Utc>>,
}

/// Storage row for a claim awaiting the receiver, still encoded.
#[derive(Clone, Debug)]
pub struct PendingRow {
    pub settlement_id: String,
    pub debtor_id: String,
    pub debtor_name: String,
    pub amount_owed: String, // encoded
    pub settled_on: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PendingConfirmation {
    pub settlement_id: String,
    pub debtor_id: String,
    pub debtor_name: String,
    pub amount_owed: f64,
    #[schema(value_type = Option<String>, example = "2025-04-02T08:00:00Z")]
    pub settled_on: Option<DateTime<Utc>>,
}

/// Returned by a successful claim or cancel so callers can invalidate both
/// parties' cached summaries.
#[derive(Clone, Debug)]
pub struct ClaimReceipt {
    pub settlement_id: String,
    pub payer_id: String,
}

/// Returned by a successful confirmation: the amount moved and both parties.
#[derive(Clone, Debug)]
pub struct ConfirmReceipt {
    pub settlement_id: String,
    pub debtor_id: String,
    pub creditor_id: String,
    pub amount: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ClaimOutcome {
    pub claimed: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ConfirmOutcome {
    pub confirmed: Vec<String>,
    pub failed: Vec<String>,
}
