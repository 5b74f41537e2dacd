use crate::core::errors::SettlementError;
use crate::core::models::{ExpenseResponse, GroupMemberResponse, GroupResponse, UserResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A stored account, including the password hash that never leaves the server.
#[derive(Clone, Debug, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub hashed_password: String,
    pub full_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_by_user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl GroupRecord {
    pub fn to_response(&self) -> GroupResponse {
        GroupResponse {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            created_by_user_id: self.created_by_user_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MembershipRecord {
    pub id: i64,
    pub group_id: i64,
    pub user_id: i64,
    pub joined_at: DateTime<Utc>,
}

impl MembershipRecord {
    pub fn to_response(&self, user: &UserRecord) -> GroupMemberResponse {
        GroupMemberResponse {
            id: self.id,
            group_id: self.group_id,
            user_id: self.user_id,
            joined_at: self.joined_at,
            user: user.to_response(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseRecord {
    pub id: i64,
    pub group_id: i64,
    pub paid_by_user_id: i64,
    pub amount: f64,
    pub description: Option<String>,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ExpenseRecord {
    pub fn to_response(&self, paid_by: &UserRecord) -> ExpenseResponse {
        ExpenseResponse {
            id: self.id,
            group_id: self.group_id,
            paid_by_user_id: self.paid_by_user_id,
            amount: self.amount,
            description: self.description.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
            paid_by_user: paid_by.to_response(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewExpense {
    pub group_id: i64,
    pub paid_by_user_id: i64,
    pub amount: f64,
    pub description: Option<String>,
    pub metadata: Option<String>,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Fails with `AlreadyRegistered` if the username or email is in use.
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, SettlementError>;
    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, SettlementError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, SettlementError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, SettlementError>;
    async fn update_user(&self, user: UserRecord) -> Result<UserRecord, SettlementError>;

    async fn insert_group(
        &self,
        name: String,
        description: Option<String>,
        created_by_user_id: i64,
    ) -> Result<GroupRecord, SettlementError>;
    async fn get_group(&self, group_id: i64) -> Result<Option<GroupRecord>, SettlementError>;
    async fn list_groups_for_user(&self, user_id: i64) -> Result<Vec<GroupRecord>, SettlementError>;

    /// Fails with `AlreadyGroupMember` if the pair already exists.
    async fn insert_membership(&self, group_id: i64, user_id: i64) -> Result<MembershipRecord, SettlementError>;
    async fn get_membership(&self, group_id: i64, user_id: i64) -> Result<Option<MembershipRecord>, SettlementError>;
    /// Members of a group in join order.
    async fn list_memberships(&self, group_id: i64) -> Result<Vec<MembershipRecord>, SettlementError>;

    async fn insert_expense(&self, expense: NewExpense) -> Result<ExpenseRecord, SettlementError>;
    async fn list_expenses(&self, group_id: i64) -> Result<Vec<ExpenseRecord>, SettlementError>;
}

pub mod in_memory;
