use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Scholarship income entry, recorded alongside a `scholarship`-kind
/// transaction in the same atomic unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scholarship {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub amount: String, // encoded
    pub received_on: NaiveDate,
    pub note: String,
    pub created_at: DateTime<Utc>,
}
