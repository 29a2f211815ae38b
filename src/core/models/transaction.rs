use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
    Shared,
    Info,
    Scholarship,
}

impl TransactionKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "credit" => Some(TransactionKind::Credit),
            "debit" => Some(TransactionKind::Debit),
            "shared" => Some(TransactionKind::Shared),
            "info" => Some(TransactionKind::Info),
            "scholarship" => Some(TransactionKind::Scholarship),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
            TransactionKind::Shared => "shared",
            TransactionKind::Info => "info",
            TransactionKind::Scholarship => "scholarship",
        };
        write!(f, "{}", s)
    }
}

/// An immutable financial event. For shared transactions `amount` carries the
/// owner's own retained share, never the gross amount paid, so balance and
/// dashboard sums cannot double-count what participants owe back.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub amount: String, // encoded
    pub kind: TransactionKind,
    pub category_id: Option<String>,
    pub transaction_date: NaiveDate,
    pub description: String, // encoded
    pub is_shared: bool,
    pub paid_by: String,
    pub created_at: DateTime<Utc>,
}

/// Participant list as accepted on the wire: either a structured id list or a
/// comma-delimited string.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum SharedWith {
    Ids(Vec<String>),
    Csv(String),
}

#[derive(Clone, Debug)]
pub struct NewObligation {
    pub debtor_id: String,
    pub amount_owed: String, // encoded
}

#[derive(Clone, Debug)]
pub struct NewScholarship {
    pub name: String,
    pub amount: String, // encoded
    pub received_on: NaiveDate,
    pub note: String,
}

/// Everything one transaction-creation atomic unit writes: the category to
/// resolve or create, the transaction row, the per-participant obligations,
/// an optional scholarship entry, and the signed balance delta to apply to
/// the payer inside the same unit.
#[derive(Clone, Debug)]
pub struct TransactionRecord {
    pub user_id: String,
    pub paid_by: String,
    pub kind: TransactionKind,
    pub category_name: Option<String>,
    pub transaction_date: NaiveDate,
    pub amount: String,      // encoded owner share
    pub description: String, // encoded
    pub is_shared: bool,
    pub obligations: Vec<NewObligation>,
    pub scholarship: Option<NewScholarship>,
    pub balance_delta: f64,
}

#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub category_id: Option<String>,
}

/// Transaction joined with its category name, still encoded.
#[derive(Clone, Debug)]
pub struct TransactionRow {
    pub transaction: Transaction,
    pub category_name: Option<String>,
}

/// Decoded transaction as it leaves the API.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionView {
    pub id: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category_name: Option<String>,
    #[schema(value_type = String, example = "2025-04-01")]
    pub transaction_date: NaiveDate,
    pub description: String,
    pub is_shared: bool,
    pub paid_by: String,
    #[schema(value_type = String, example = "2025-04-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}
