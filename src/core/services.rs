use crate::auth::jwt::JwtService;
use crate::config::Config;
use crate::core::errors::SettlementError;
use crate::core::ledger::{self, Payment};
use crate::core::models::{
    AddMemberRequest, BalanceSummary, ExpenseCreate, ExpenseResponse, GroupBalanceSummary, GroupCreate,
    GroupMemberResponse, GroupResponse, GroupWithMembers, Token, UserBase, UserCreate, UserLogin, UserResponse,
};
use crate::infrastructure::storage::{GroupRecord, NewExpense, NewUser, Storage, UserRecord};
use log::{debug, info, warn};
use std::collections::HashMap;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 8;
const GROUP_NAME_MAX: usize = 100;

pub struct SettlementService<S: Storage> {
    storage: S,
    jwt_service: JwtService,
    bcrypt_cost: u32,
}

impl<S: Storage> SettlementService<S> {
    pub fn new(storage: S, config: &Config) -> Self {
        info!("Initializing SettlementService");
        SettlementService {
            storage,
            jwt_service: JwtService::new(config.secret_key.clone(), config.access_token_expire_minutes),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    // AUTHENTICATION

    pub async fn signup(&self, req: UserCreate) -> Result<UserResponse, SettlementError> {
        validate_email(&req.email)?;
        validate_length("username", &req.username, USERNAME_MIN, USERNAME_MAX)?;
        if req.password.chars().count() < PASSWORD_MIN {
            return Err(SettlementError::invalid_input(
                "password",
                format!("must be at least {} characters", PASSWORD_MIN),
            ));
        }

        info!("Signing up user with email: {}", req.email);
        let hashed_password = bcrypt::hash(&req.password, self.bcrypt_cost)
            .map_err(|e| SettlementError::PasswordHash(e.to_string()))?;
        let user = self
            .storage
            .insert_user(NewUser {
                email: req.email,
                username: req.username,
                hashed_password,
                full_name: req.full_name,
            })
            .await?;
        debug!("User created with ID: {}", user.id);
        Ok(user.to_response())
    }

    pub async fn login(&self, req: UserLogin) -> Result<Token, SettlementError> {
        let user = self
            .storage
            .get_user_by_email(&req.email)
            .await?
            .ok_or(SettlementError::InvalidCredentials)?;

        let verified = bcrypt::verify(&req.password, &user.hashed_password)
            .map_err(|e| SettlementError::PasswordHash(e.to_string()))?;
        if !verified {
            warn!("Failed login attempt for user ID: {}", user.id);
            return Err(SettlementError::InvalidCredentials);
        }

        info!("User {} logged in", user.id);
        let access_token = self.jwt_service.generate_token(user.id)?;
        Ok(Token::bearer(access_token))
    }

    /// Resolve a bearer token to an active user.
    pub async fn current_user(&self, token: &str) -> Result<UserRecord, SettlementError> {
        let claims = self.jwt_service.validate_token(token)?;
        let user = self
            .storage
            .get_user(claims.user_id()?)
            .await?
            .ok_or(SettlementError::InvalidToken)?;
        if !user.is_active {
            return Err(SettlementError::InactiveUser);
        }
        Ok(user)
    }

    // USERS

    pub async fn update_profile(&self, current: &UserRecord, update: UserBase) -> Result<UserResponse, SettlementError> {
        validate_email(&update.email)?;
        validate_length("username", &update.username, USERNAME_MIN, USERNAME_MAX)?;

        if update.username != current.username && self.storage.get_user_by_username(&update.username).await?.is_some() {
            return Err(SettlementError::UsernameTaken);
        }
        if update.email != current.email && self.storage.get_user_by_email(&update.email).await?.is_some() {
            return Err(SettlementError::EmailTaken);
        }

        info!("Updating profile of user ID: {}", current.id);
        let updated = self
            .storage
            .update_user(UserRecord {
                email: update.email,
                username: update.username,
                full_name: update.full_name,
                ..current.clone()
            })
            .await?;
        Ok(updated.to_response())
    }

    pub async fn get_user(&self, user_id: i64) -> Result<UserResponse, SettlementError> {
        self.storage
            .get_user(user_id)
            .await?
            .map(|u| u.to_response())
            .ok_or(SettlementError::UserNotFound)
    }

    // GROUPS

    pub async fn create_group(&self, current: &UserRecord, req: GroupCreate) -> Result<GroupResponse, SettlementError> {
        validate_length("name", &req.name, 1, GROUP_NAME_MAX)?;

        info!("Creating group '{}' for user ID: {}", req.name, current.id);
        let group = self.storage.insert_group(req.name, req.description, current.id).await?;
        self.storage.insert_membership(group.id, current.id).await?;
        debug!("Group created with ID: {}", group.id);
        Ok(group.to_response())
    }

    pub async fn my_groups(&self, current: &UserRecord) -> Result<Vec<GroupWithMembers>, SettlementError> {
        let groups = self.storage.list_groups_for_user(current.id).await?;
        let mut result = Vec::with_capacity(groups.len());
        for group in &groups {
            result.push(self.with_members(group).await?);
        }
        Ok(result)
    }

    pub async fn get_group(&self, current: &UserRecord, group_id: i64) -> Result<GroupWithMembers, SettlementError> {
        let group = self
            .member_group(group_id, current, "You are not a member of this group")
            .await?;
        self.with_members(&group).await
    }

    pub async fn add_member(
        &self,
        current: &UserRecord,
        group_id: i64,
        req: AddMemberRequest,
    ) -> Result<GroupMemberResponse, SettlementError> {
        self.member_group(group_id, current, "You must be a member of the group to add members")
            .await?;
        let user = self
            .storage
            .get_user_by_email(&req.email)
            .await?
            .ok_or(SettlementError::UserNotFound)?;

        info!("User {} adding user {} to group {}", current.id, user.id, group_id);
        let membership = self.storage.insert_membership(group_id, user.id).await?;
        Ok(membership.to_response(&user))
    }

    // EXPENSES

    pub async fn create_expense(&self, current: &UserRecord, req: ExpenseCreate) -> Result<ExpenseResponse, SettlementError> {
        if !req.amount.is_finite() || req.amount <= 0.0 {
            return Err(SettlementError::invalid_input("amount", "must be greater than 0"));
        }
        if ledger::to_cents(req.amount).is_none() {
            return Err(SettlementError::invalid_input("amount", "is too large"));
        }
        self.member_group(req.group_id, current, "You must be a member of the group to add expenses")
            .await?;
        if self
            .storage
            .get_membership(req.group_id, req.paid_by_user_id)
            .await?
            .is_none()
        {
            return Err(SettlementError::PayerNotGroupMember);
        }
        let payer = self
            .storage
            .get_user(req.paid_by_user_id)
            .await?
            .ok_or(SettlementError::UserNotFound)?;

        info!(
            "User {} adding expense of {} paid by {} to group {}",
            current.id, req.amount, payer.id, req.group_id
        );
        let expense = self
            .storage
            .insert_expense(NewExpense {
                group_id: req.group_id,
                paid_by_user_id: req.paid_by_user_id,
                amount: req.amount,
                description: req.description,
                metadata: req.metadata,
            })
            .await?;
        Ok(expense.to_response(&payer))
    }

    /// Expense history of a group, newest first.
    pub async fn group_expenses(&self, current: &UserRecord, group_id: i64) -> Result<Vec<ExpenseResponse>, SettlementError> {
        self.member_group(group_id, current, "You must be a member of the group to view expenses")
            .await?;
        let mut expenses = self.storage.list_expenses(group_id).await?;
        expenses.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut payers: HashMap<i64, UserRecord> = HashMap::new();
        let mut result = Vec::with_capacity(expenses.len());
        for expense in &expenses {
            if !payers.contains_key(&expense.paid_by_user_id) {
                let payer = self
                    .storage
                    .get_user(expense.paid_by_user_id)
                    .await?
                    .ok_or(SettlementError::UserNotFound)?;
                payers.insert(payer.id, payer);
            }
            if let Some(payer) = payers.get(&expense.paid_by_user_id) {
                result.push(expense.to_response(payer));
            }
        }
        Ok(result)
    }

    pub async fn balance_summary(&self, current: &UserRecord, group_id: i64) -> Result<GroupBalanceSummary, SettlementError> {
        let group = self
            .member_group(group_id, current, "You must be a member of the group to view balance summary")
            .await?;
        let memberships = self.storage.list_memberships(group_id).await?;
        let payments: Vec<Payment> = self
            .storage
            .list_expenses(group_id)
            .await?
            .iter()
            .map(|e| Payment {
                payer_id: e.paid_by_user_id,
                amount: e.amount,
            })
            .collect();

        let member_ids: Vec<i64> = memberships.iter().map(|m| m.user_id).collect();
        let mut balances = Vec::with_capacity(member_ids.len());
        for row in ledger::summarize(&member_ids, &payments)? {
            let user = self
                .storage
                .get_user(row.user_id)
                .await?
                .ok_or(SettlementError::UserNotFound)?;
            balances.push(BalanceSummary {
                user_id: row.user_id,
                user: user.to_response(),
                total_owed: row.total_owed,
                total_owes: row.total_owes,
                net_balance: row.net_balance,
            });
        }
        debug!("Computed {} balances for group {}", balances.len(), group_id);

        Ok(GroupBalanceSummary {
            group_id,
            group: group.to_response(),
            balances,
        })
    }

    // HELPERS

    /// Load a group and require `current` to be one of its members.
    async fn member_group(&self, group_id: i64, current: &UserRecord, refusal: &str) -> Result<GroupRecord, SettlementError> {
        let group = self
            .storage
            .get_group(group_id)
            .await?
            .ok_or(SettlementError::GroupNotFound)?;
        if self.storage.get_membership(group_id, current.id).await?.is_none() {
            warn!("User {} refused access to group {}", current.id, group_id);
            return Err(SettlementError::NotGroupMember(refusal.to_string()));
        }
        Ok(group)
    }

    async fn with_members(&self, group: &GroupRecord) -> Result<GroupWithMembers, SettlementError> {
        let memberships = self.storage.list_memberships(group.id).await?;
        let mut members = Vec::with_capacity(memberships.len());
        for membership in &memberships {
            let user = self
                .storage
                .get_user(membership.user_id)
                .await?
                .ok_or(SettlementError::UserNotFound)?;
            members.push(membership.to_response(&user));
        }
        Ok(GroupWithMembers::new(group.to_response(), members))
    }
}

fn validate_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), SettlementError> {
    let len = value.chars().count();
    if len < min {
        return Err(SettlementError::invalid_input(
            field,
            format!("must be at least {} characters", min),
        ));
    }
    if len > max {
        return Err(SettlementError::invalid_input(
            field,
            format!("cannot exceed {} characters", max),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), SettlementError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SettlementError::invalid_input("email", "value is not a valid email address"))
    }
}
