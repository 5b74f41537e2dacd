use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// Signup with a username or email that already exists
    #[error("Username or email already registered")]
    AlreadyRegistered,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already taken")]
    EmailTaken,

    /// Unknown email or wrong password at login
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Missing, malformed, expired, or orphaned bearer token
    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Inactive user")]
    InactiveUser,

    #[error("User not found")]
    UserNotFound,

    #[error("Group not found")]
    GroupNotFound,

    #[error("User is already a member of this group")]
    AlreadyGroupMember,

    /// Caller is not a member of the group; carries the full message for the
    /// action that was refused.
    #[error("{0}")]
    NotGroupMember(String),

    #[error("Paying user must be a member of the group")]
    PayerNotGroupMember,

    /// Schema-level validation failure on a request field
    #[error("Invalid input for field `{field}`: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token issue error: {0}")]
    TokenIssue(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored amounts that cannot be aggregated
    #[error("Ledger error: {0}")]
    Ledger(String),
}

impl SettlementError {
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        SettlementError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
