use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-user spending category. Names are stored trimmed and lowercased so
/// resolve-or-create can match case-insensitively.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: String,
    pub user_id: String,
    pub name: String,
}
