//! Per-group balance aggregation.
//!
//! Every expense is split equally among all current members of the group.
//! Arithmetic runs in integer cents so that each member's
//! `net = owed - owes` holds exactly and the nets of a group sum to zero.
//! Cents that do not divide evenly go one each to the earliest-joined
//! members.

use crate::core::errors::SettlementError;
use std::collections::HashMap;

/// A single paid expense as seen by the ledger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Payment {
    pub payer_id: i64,
    pub amount: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemberBalance {
    pub user_id: i64,
    pub total_owed: f64,
    pub total_owes: f64,
    pub net_balance: f64,
}

#[derive(Default, Clone, Copy)]
struct Cents {
    paid: i128,
    share: i128,
}

/// Smallest cent count that no longer fits an `i64`.
const CENTS_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Round `amount` to whole cents; `None` if the result does not fit an `i64`.
pub fn to_cents(amount: f64) -> Option<i64> {
    let cents = (amount * 100.0).round();
    (cents.is_finite() && cents > -CENTS_LIMIT && cents < CENTS_LIMIT).then_some(cents as i64)
}

fn from_cents(cents: i128) -> f64 {
    cents as f64 / 100.0
}

/// Aggregate `payments` over `members` (in join order).
///
/// A payment whose payer has no row in `members` still counts towards the
/// members' shares.
pub fn summarize(members: &[i64], payments: &[Payment]) -> Result<Vec<MemberBalance>, SettlementError> {
    if members.is_empty() {
        return Ok(Vec::new());
    }

    let mut totals: HashMap<i64, Cents> = members.iter().map(|id| (*id, Cents::default())).collect();
    let count = members.len() as i64;

    for payment in payments {
        let amount = to_cents(payment.amount)
            .ok_or_else(|| SettlementError::Ledger(format!("amount {} is out of range", payment.amount)))?;
        if let Some(entry) = totals.get_mut(&payment.payer_id) {
            entry.paid += i128::from(amount);
        }

        let base = amount.div_euclid(count);
        let remainder = amount.rem_euclid(count) as usize;
        for (position, member_id) in members.iter().enumerate() {
            if let Some(entry) = totals.get_mut(member_id) {
                entry.share += i128::from(base + i64::from(position < remainder));
            }
        }
    }

    Ok(members
        .iter()
        .map(|id| {
            let cents = totals.get(id).copied().unwrap_or_default();
            MemberBalance {
                user_id: *id,
                total_owed: from_cents(cents.paid),
                total_owes: from_cents(cents.share),
                net_balance: from_cents(cents.paid - cents.share),
            }
        })
        .collect())
}
