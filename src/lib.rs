pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use client::{AuthSession, ClientConfig, ClientError, ExpenseSettlementClient, TokenStorage};
pub use crate::core::errors::SettlementError;
pub use crate::core::services::SettlementService;
pub use infrastructure::storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests;
