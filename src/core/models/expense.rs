use super::user::UserResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseCreate {
    pub group_id: i64,
    pub paid_by_user_id: i64,
    /// Decimal amount in the group's (single, implicit) currency.
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form string, typically JSON, stored verbatim.
    #[serde(default)]
    pub metadata: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseResponse {
    pub id: i64,
    pub group_id: i64,
    pub paid_by_user_id: i64,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(with = "super::timestamp")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    pub paid_by_user: UserResponse,
}
