use crate::core::errors::SettlementError;
use crate::infrastructure::storage::{
    ExpenseRecord, GroupRecord, MembershipRecord, NewExpense, NewUser, Storage, UserRecord,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, UserRecord>,
    groups: BTreeMap<i64, GroupRecord>,
    memberships: BTreeMap<i64, MembershipRecord>,
    expenses: BTreeMap<i64, ExpenseRecord>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// Process-local store. All tables sit behind one lock so that uniqueness
/// checks and the insert that follows them happen atomically.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, SettlementError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(SettlementError::AlreadyRegistered);
        }
        let record = UserRecord {
            id: tables.next_id(),
            email: user.email,
            username: user.username,
            hashed_password: user.hashed_password,
            full_name: user.full_name,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, SettlementError> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, SettlementError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, SettlementError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_user(&self, user: UserRecord) -> Result<UserRecord, SettlementError> {
        let mut tables = self.tables.write().await;
        if let Some(other) = tables
            .users
            .values()
            .find(|u| u.id != user.id && (u.email == user.email || u.username == user.username))
        {
            return Err(if other.username == user.username {
                SettlementError::UsernameTaken
            } else {
                SettlementError::EmailTaken
            });
        }
        let slot = tables.users.get_mut(&user.id).ok_or(SettlementError::UserNotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn insert_group(
        &self,
        name: String,
        description: Option<String>,
        created_by_user_id: i64,
    ) -> Result<GroupRecord, SettlementError> {
        let mut tables = self.tables.write().await;
        let record = GroupRecord {
            id: tables.next_id(),
            name,
            description,
            created_by_user_id,
            created_at: Utc::now(),
        };
        tables.groups.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_group(&self, group_id: i64) -> Result<Option<GroupRecord>, SettlementError> {
        Ok(self.tables.read().await.groups.get(&group_id).cloned())
    }

    async fn list_groups_for_user(&self, user_id: i64) -> Result<Vec<GroupRecord>, SettlementError> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| tables.groups.get(&m.group_id).cloned())
            .collect())
    }

    async fn insert_membership(&self, group_id: i64, user_id: i64) -> Result<MembershipRecord, SettlementError> {
        let mut tables = self.tables.write().await;
        if tables
            .memberships
            .values()
            .any(|m| m.group_id == group_id && m.user_id == user_id)
        {
            return Err(SettlementError::AlreadyGroupMember);
        }
        let record = MembershipRecord {
            id: tables.next_id(),
            group_id,
            user_id,
            joined_at: Utc::now(),
        };
        tables.memberships.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_membership(&self, group_id: i64, user_id: i64) -> Result<Option<MembershipRecord>, SettlementError> {
        Ok(self
            .tables
            .read()
            .await
            .memberships
            .values()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_memberships(&self, group_id: i64) -> Result<Vec<MembershipRecord>, SettlementError> {
        // ids are assigned monotonically, so map order is join order
        Ok(self
            .tables
            .read()
            .await
            .memberships
            .values()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn insert_expense(&self, expense: NewExpense) -> Result<ExpenseRecord, SettlementError> {
        let mut tables = self.tables.write().await;
        let record = ExpenseRecord {
            id: tables.next_id(),
            group_id: expense.group_id,
            paid_by_user_id: expense.paid_by_user_id,
            amount: expense.amount,
            description: expense.description,
            metadata: expense.metadata,
            created_at: Utc::now(),
        };
        tables.expenses.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_expenses(&self, group_id: i64) -> Result<Vec<ExpenseRecord>, SettlementError> {
        Ok(self
            .tables
            .read()
            .await
            .expenses
            .values()
            .filter(|e| e.group_id == group_id)
            .cloned()
            .collect())
    }
}
