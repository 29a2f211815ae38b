use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String, // bcrypt hash
    pub mobile_no: Option<String>,
    pub bank_name: Option<String>,
    pub upi_id: Option<String>,
    /// Encoded running balance. Decoded only inside the atomic unit that
    /// mutates it, or with per-row fallback on display paths.
    pub balance: String,
    pub created_at: DateTime<Utc>,
}
