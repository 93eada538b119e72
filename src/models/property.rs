use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub name: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

/// Body of both create and rename requests.
#[derive(Debug, Deserialize, Validate)]
pub struct PropertyInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}
