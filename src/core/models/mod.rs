pub mod balance;
pub mod expense;
pub mod group;
pub mod timestamp;
pub mod user;

pub use balance::{BalanceSummary, GroupBalanceSummary};
pub use expense::{ExpenseCreate, ExpenseResponse};
pub use group::{AddMemberRequest, GroupCreate, GroupMemberResponse, GroupResponse, GroupWithMembers};
pub use user::{Token, UserBase, UserCreate, UserLogin, UserResponse};
