use super::{ExpenseSettlementClient, Result};
use crate::core::models::{ExpenseResponse, GroupBalanceSummary, GroupWithMembers, UserCreate, UserLogin, UserResponse};
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Everything a group page shows, fetched in one go.
#[derive(Debug, Clone)]
pub struct GroupOverview {
    pub group: GroupWithMembers,
    pub expenses: Vec<ExpenseResponse>,
    pub balance: GroupBalanceSummary,
}

/// Signed-in state shared by front-end views: the client plus the user it
/// is acting as.
pub struct AuthSession {
    client: Arc<ExpenseSettlementClient>,
    user: RwLock<Option<UserResponse>>,
}

impl AuthSession {
    pub fn new(client: Arc<ExpenseSettlementClient>) -> Self {
        AuthSession {
            client,
            user: RwLock::new(None),
        }
    }

    pub fn client(&self) -> &ExpenseSettlementClient {
        &self.client
    }

    pub async fn user(&self) -> Option<UserResponse> {
        self.user.read().await.clone()
    }

    /// Pick up a token persisted by an earlier run, if it is still good.
    pub async fn restore(&self) -> Option<UserResponse> {
        if !self.client.is_authenticated() {
            return None;
        }
        self.refresh_user().await.ok()
    }

    /// Re-read the current user. Any failure signs the session out.
    pub async fn refresh_user(&self) -> Result<UserResponse> {
        match self.client.get_current_user().await {
            Ok(user) => {
                *self.user.write().await = Some(user.clone());
                Ok(user)
            }
            Err(err) => {
                debug!("Refreshing user failed, signing out: {}", err);
                *self.user.write().await = None;
                self.client.clear_token();
                Err(err)
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserResponse> {
        self.client
            .login(&UserLogin {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        let user = self.refresh_user().await?;
        info!("Signed in as user {}", user.id);
        Ok(user)
    }

    /// Create the account, then sign in with it.
    pub async fn signup(
        &self,
        email: &str,
        username: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<UserResponse> {
        self.client
            .signup(&UserCreate {
                email: email.to_string(),
                username: username.to_string(),
                full_name: full_name.filter(|n| !n.is_empty()).map(str::to_string),
                password: password.to_string(),
            })
            .await?;
        self.login(email, password).await
    }

    pub async fn logout(&self) {
        self.client.clear_token();
        *self.user.write().await = None;
    }

    /// Fetch group, expenses and balances concurrently.
    pub async fn load_group_overview(&self, group_id: i64) -> Result<GroupOverview> {
        let (group, expenses, balance) = futures::try_join!(
            self.client.get_group(group_id),
            self.client.get_group_expenses(group_id),
            self.client.get_group_balance_summary(group_id),
        )?;
        Ok(GroupOverview {
            group,
            expenses,
            balance,
        })
    }
}
