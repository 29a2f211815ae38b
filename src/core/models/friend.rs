use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Incoming pending request with the sender's name joined in.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FriendRequestView {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    #[schema(value_type = String, example = "2025-04-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FriendSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}
