use super::user::UserResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupResponse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_by_user_id: i64,
    #[serde(with = "super::timestamp")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupMemberResponse {
    pub id: i64,
    pub group_id: i64,
    pub user_id: i64,
    #[serde(with = "super::timestamp")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub joined_at: DateTime<Utc>,
    pub user: UserResponse,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupWithMembers {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_by_user_id: i64,
    #[serde(with = "super::timestamp")]
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub members: Vec<GroupMemberResponse>,
}

impl GroupWithMembers {
    pub fn new(group: GroupResponse, members: Vec<GroupMemberResponse>) -> Self {
        GroupWithMembers {
            id: group.id,
            name: group.name,
            description: group.description,
            created_by_user_id: group.created_by_user_id,
            created_at: group.created_at,
            members,
        }
    }

    pub fn is_member(&self, user_id: i64) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AddMemberRequest {
    pub email: String,
}
