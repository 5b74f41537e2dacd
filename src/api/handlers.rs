use crate::{
    api::models::{ApiError, ErrorResponse, HealthResponse, RootResponse},
    core::{
        errors::SettlementError,
        models::{
            AddMemberRequest, ExpenseCreate, ExpenseResponse, GroupBalanceSummary, GroupCreate, GroupMemberResponse,
            GroupResponse, GroupWithMembers, Token, UserBase, UserCreate, UserLogin, UserResponse,
        },
        services::SettlementService,
    },
    infrastructure::storage::{UserRecord, in_memory::InMemoryStorage},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Request, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
};
use http::header;

use std::sync::Arc;

pub type SharedService = Arc<SettlementService<InMemoryStorage>>;

/// The authenticated caller, placed in request extensions by `auth_middleware`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub UserRecord);

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn auth_middleware(
    State(service): State<SharedService>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(&req).ok_or(SettlementError::InvalidToken)?;
    let user = service.current_user(token).await?;
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Routes relative to the API prefix.
pub fn api_routes(service: SharedService) -> Router {
    let protected_routes = Router::new()
        .route("/auth/me", get(get_current_user))
        .route("/users/me", get(get_my_profile).put(update_my_profile))
        .route("/users/{user_id}", get(get_user))
        .route("/groups", post(create_group).get(get_my_groups))
        .route("/groups/{group_id}", get(get_group))
        .route("/groups/{group_id}/members", post(add_member_to_group))
        .route("/expenses", post(create_expense))
        .route("/expenses/group/{group_id}", get(get_group_expenses))
        .route("/expenses/group/{group_id}/balance", get(get_group_balance_summary))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = RootResponse))
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Expense Settlement API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/openapi.json".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Username or email already registered", body = ErrorResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(service): State<SharedService>,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(req) = payload?;
    let user = service.signup(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = UserLogin,
    responses(
        (status = 200, description = "Login successful", body = Token),
        (status = 401, description = "Incorrect email or password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(service): State<SharedService>,
    payload: Result<Json<UserLogin>, JsonRejection>,
) -> Result<Json<Token>, ApiError> {
    let Json(req) = payload?;
    let token = service.login(req).await?;
    Ok(Json(token))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Could not validate credentials", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_current_user(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(user.to_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user's profile", body = UserResponse),
        (status = 401, description = "Could not validate credentials", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_my_profile(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(user.to_response())
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UserBase,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Username or email already taken", body = ErrorResponse),
        (status = 401, description = "Could not validate credentials", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_my_profile(
    State(service): State<SharedService>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<UserBase>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(req) = payload?;
    let updated = service.update_profile(&user, req).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    params(("user_id" = i64, Path, description = "ID of the user")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_user(
    State(service): State<SharedService>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = service.get_user(user_id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/v1/groups",
    request_body = GroupCreate,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 422, description = "Invalid input", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_group(
    State(service): State<SharedService>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<GroupCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    let Json(req) = payload?;
    let group = service.create_group(&user, req).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/v1/groups",
    responses((status = 200, description = "Groups the caller belongs to", body = Vec<GroupWithMembers>)),
    security(("Bearer" = []))
)]
pub async fn get_my_groups(
    State(service): State<SharedService>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<GroupWithMembers>>, ApiError> {
    let groups = service.my_groups(&user).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    get,
    path = "/api/v1/groups/{group_id}",
    params(("group_id" = i64, Path, description = "ID of the group")),
    responses(
        (status = 200, description = "Group with members", body = GroupWithMembers),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group(
    State(service): State<SharedService>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_id): Path<i64>,
) -> Result<Json<GroupWithMembers>, ApiError> {
    let group = service.get_group(&user, group_id).await?;
    Ok(Json(group))
}

#[utoipa::path(
    post,
    path = "/api/v1/groups/{group_id}/members",
    params(("group_id" = i64, Path, description = "ID of the group")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = GroupMemberResponse),
        (status = 400, description = "Already a member", body = ErrorResponse),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 404, description = "Group or user not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn add_member_to_group(
    State(service): State<SharedService>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_id): Path<i64>,
    payload: Result<Json<AddMemberRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GroupMemberResponse>), ApiError> {
    let Json(req) = payload?;
    let member = service.add_member(&user, group_id, req).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    request_body = ExpenseCreate,
    responses(
        (status = 201, description = "Expense recorded", body = ExpenseResponse),
        (status = 400, description = "Payer is not a member", body = ErrorResponse),
        (status = 403, description = "Caller is not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse),
        (status = 422, description = "Invalid amount", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_expense(
    State(service): State<SharedService>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<ExpenseCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    let Json(req) = payload?;
    let expense = service.create_expense(&user, req).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/v1/expenses/group/{group_id}",
    params(("group_id" = i64, Path, description = "ID of the group")),
    responses(
        (status = 200, description = "Expense history, newest first", body = Vec<ExpenseResponse>),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group_expenses(
    State(service): State<SharedService>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_id): Path<i64>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let expenses = service.group_expenses(&user, group_id).await?;
    Ok(Json(expenses))
}

#[utoipa::path(
    get,
    path = "/api/v1/expenses/group/{group_id}/balance",
    params(("group_id" = i64, Path, description = "ID of the group")),
    responses(
        (status = 200, description = "Per-member balances", body = GroupBalanceSummary),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_group_balance_summary(
    State(service): State<SharedService>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(group_id): Path<i64>,
) -> Result<Json<GroupBalanceSummary>, ApiError> {
    let summary = service.balance_summary(&user, group_id).await?;
    Ok(Json(summary))
}
