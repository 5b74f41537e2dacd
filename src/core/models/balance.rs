use super::group::GroupResponse;
use super::user::UserResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One member's position within a group.
///
/// `net_balance == total_owed - total_owes`; positive means the others owe
/// this member, negative means this member owes the others.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BalanceSummary {
    pub user_id: i64,
    pub user: UserResponse,
    pub total_owed: f64,
    pub total_owes: f64,
    pub net_balance: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GroupBalanceSummary {
    pub group_id: i64,
    pub group: GroupResponse,
    pub balances: Vec<BalanceSummary>,
}

impl GroupBalanceSummary {
    pub fn balance_for(&self, user_id: i64) -> Option<&BalanceSummary> {
        self.balances.iter().find(|b| b.user_id == user_id)
    }
}
