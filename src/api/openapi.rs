use utoipa::OpenApi;

use crate::{
    api::models::{ErrorResponse, HealthResponse, RootResponse},
    core::models::{
        AddMemberRequest, BalanceSummary, ExpenseCreate, ExpenseResponse, GroupBalanceSummary, GroupCreate,
        GroupMemberResponse, GroupResponse, GroupWithMembers, Token, UserBase, UserCreate, UserLogin, UserResponse,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::root,
        super::handlers::health,
        super::handlers::signup,
        super::handlers::login,
        super::handlers::get_current_user,
        super::handlers::get_my_profile,
        super::handlers::update_my_profile,
        super::handlers::get_user,
        super::handlers::create_group,
        super::handlers::get_my_groups,
        super::handlers::get_group,
        super::handlers::add_member_to_group,
        super::handlers::create_expense,
        super::handlers::get_group_expenses,
        super::handlers::get_group_balance_summary
    ),
    components(schemas(
        UserBase,
        UserCreate,
        UserLogin,
        UserResponse,
        Token,
        GroupCreate,
        GroupResponse,
        GroupMemberResponse,
        GroupWithMembers,
        AddMemberRequest,
        ExpenseCreate,
        ExpenseResponse,
        BalanceSummary,
        GroupBalanceSummary,
        ErrorResponse,
        RootResponse,
        HealthResponse
    )),
    info(
        title = "Expense Settlement API",
        description = "API for managing split expenses between members of a group",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
