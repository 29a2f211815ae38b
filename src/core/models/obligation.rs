use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Settlement lifecycle of one obligation. One tagged state instead of the
/// three independent booleans the schema grew historically, so combinations
/// like confirmed-but-never-claimed cannot be represented at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SettlementState {
    Open,
    Claimed,
    Confirmed,
}

impl SettlementState {
    // Legacy flag views kept for the wire format.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SettlementState::Open)
    }

    pub fn is_paid_by_user(&self) -> bool {
        matches!(self, SettlementState::Claimed | SettlementState::Confirmed)
    }

    pub fn is_confirmed_by_receiver(&self) -> bool {
        matches!(self, SettlementState::Confirmed)
    }
}

/// One participant's owed share of a shared transaction. `amount_owed` is
/// immutable after creation; only the settlement state ever changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Obligation {
    pub id: String,
    pub transaction_id: String,
    pub debtor_id: String,
    pub amount_owed: String, // encoded
    pub state: SettlementState,
    pub settled_on: Option<DateTime<Utc>>,
    pub confirmed_on: Option<DateTime<Utc>>,
}

impl Obligation {
    /// OPEN → CLAIMED. Returns false (and mutates nothing) from any other state.
    pub fn claim(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != SettlementState::Open {
            return false;
        }
        self.state = SettlementState::Claimed;
        self.settled_on = Some(now);
        true
    }

    /// CLAIMED → OPEN. A confirmed row can never be reopened.
    pub fn cancel_claim(&mut self) -> bool {
        if self.state != SettlementState::Claimed {
            return false;
        }
        self.state = SettlementState::Open;
        self.settled_on = None;
        true
    }

    /// CLAIMED → CONFIRMED. Terminal.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != SettlementState::Claimed {
            return false;
        }
        self.state = SettlementState::Confirmed;
        self.confirmed_on = Some(now);
        true
    }
}
