//! Typed HTTP client for the expense settlement API.
//!
//! Every operation is one request/response round trip through
//! [`ExpenseSettlementClient::request`]. The only state the client keeps is
//! the bearer token, held in a [`TokenStorage`].

pub mod errors;
pub mod session;
pub mod token_storage;

pub use errors::{ClientError, ErrorKind};
pub use session::{AuthSession, GroupOverview};
pub use token_storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage, create_default_token_storage};

use crate::config::{CONFIG, DEFAULT_API_PREFIX};
use crate::core::models::{
    AddMemberRequest, ExpenseCreate, ExpenseResponse, GroupBalanceSummary, GroupCreate, GroupMemberResponse,
    GroupResponse, GroupWithMembers, Token, UserBase, UserCreate, UserLogin, UserResponse,
};
use log::{debug, warn};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, ClientError>;

pub struct ClientConfig {
    pub base_url: String,
    /// Defaults to `/api/v1`.
    pub api_prefix: Option<String>,
    /// Defaults to [`create_default_token_storage`] over the configured
    /// token directory.
    pub token_storage: Option<Arc<dyn TokenStorage>>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            api_prefix: None,
            token_storage: None,
        }
    }

    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    pub fn token_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.token_storage = Some(storage);
        self
    }
}

/// Per-call options for [`ExpenseSettlementClient::request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Merged over `Content-Type`; `Authorization` is set last when a token
    /// is held.
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        RequestOptions {
            method,
            ..Self::default()
        }
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

#[derive(Clone)]
pub struct ExpenseSettlementClient {
    base_url: String,
    api_prefix: String,
    token_storage: Arc<dyn TokenStorage>,
    http: reqwest::Client,
}

impl std::fmt::Debug for ExpenseSettlementClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpenseSettlementClient")
            .field("base_url", &self.base_url)
            .field("api_prefix", &self.api_prefix)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl ExpenseSettlementClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .strip_suffix('/')
            .unwrap_or(&config.base_url)
            .to_string();
        reqwest::Url::parse(&base_url).map_err(|err| ClientError::InvalidBaseUrl(format!("{base_url}: {err}")))?;

        Ok(Self {
            base_url,
            api_prefix: config.api_prefix.unwrap_or_else(|| DEFAULT_API_PREFIX.to_string()),
            token_storage: config
                .token_storage
                .unwrap_or_else(|| create_default_token_storage(CONFIG.token_dir.as_deref())),
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The held token; blank values count as no token.
    pub fn get_token(&self) -> Option<String> {
        self.token_storage
            .get_token()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    pub fn set_token(&self, token: &str) {
        self.token_storage.set_token(token);
    }

    pub fn clear_token(&self) {
        self.token_storage.clear_token();
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    /// Perform one call and decode the body into `T`.
    pub async fn request<T: DeserializeOwned>(&self, endpoint: &str, options: RequestOptions) -> Result<T> {
        let data = self.request_value(endpoint, options).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Perform one call and return the parsed body untouched.
    ///
    /// JSON bodies that fail to parse come back as `{}`, and non-JSON
    /// bodies as a JSON string. A 401 clears the stored token before the
    /// error is returned.
    pub async fn request_value(&self, endpoint: &str, options: RequestOptions) -> Result<Value> {
        let url = format!("{}{}{}", self.base_url, self.api_prefix, endpoint);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }
        if let Some(token) = self.get_token() {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value; sending request without it"),
            }
        }

        debug!("{} {}", options.method, url);
        let mut builder = self.http.request(options.method, &url).headers(headers);
        if let Some(body) = &options.body {
            builder = builder.body(body.to_string());
        }
        let response = builder.send().await?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let data = if is_json {
            match response.bytes().await {
                Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|_| empty_object()),
                Err(_) => empty_object(),
            }
        } else {
            Value::String(response.text().await.unwrap_or_default())
        };

        if status.is_success() {
            return Ok(data);
        }

        // reqwest does not expose the reason phrase sent by the server, so
        // statuses without a canonical one fall back to the numeric code
        let status_text = status.canonical_reason().unwrap_or(status.as_str());
        let detail = is_json
            .then(|| error_detail(&data))
            .flatten()
            .unwrap_or_else(|| status_text.to_string());
        if status.as_u16() == 401 {
            self.clear_token();
        }
        let err = ClientError::from_status(status.as_u16(), status_text, Some(detail).filter(|d| !d.is_empty()));
        debug!("{} failed with {}: {:?}", url, status, err.detail());
        Err(err)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(endpoint, RequestOptions::new(Method::GET)).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        self.request(endpoint, RequestOptions::new(Method::POST).json(body)?)
            .await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        self.request(endpoint, RequestOptions::new(Method::PUT).json(body)?)
            .await
    }

    // Authentication

    pub async fn signup(&self, user: &UserCreate) -> Result<UserResponse> {
        self.post("/auth/signup", user).await
    }

    /// Log in and keep the returned access token for subsequent calls.
    pub async fn login(&self, credentials: &UserLogin) -> Result<Token> {
        let token: Token = self.post("/auth/login", credentials).await?;
        self.set_token(&token.access_token);
        Ok(token)
    }

    pub async fn get_current_user(&self) -> Result<UserResponse> {
        self.get("/auth/me").await
    }

    // Users

    pub async fn get_my_profile(&self) -> Result<UserResponse> {
        self.get("/users/me").await
    }

    pub async fn update_my_profile(&self, user: &UserBase) -> Result<UserResponse> {
        self.put("/users/me", user).await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<UserResponse> {
        self.get(&format!("/users/{user_id}")).await
    }

    // Groups

    pub async fn create_group(&self, group: &GroupCreate) -> Result<GroupResponse> {
        self.post("/groups", group).await
    }

    pub async fn get_my_groups(&self) -> Result<Vec<GroupWithMembers>> {
        self.get("/groups").await
    }

    pub async fn get_group(&self, group_id: i64) -> Result<GroupWithMembers> {
        self.get(&format!("/groups/{group_id}")).await
    }

    pub async fn add_member_to_group(&self, group_id: i64, request: &AddMemberRequest) -> Result<GroupMemberResponse> {
        self.post(&format!("/groups/{group_id}/members"), request).await
    }

    // Expenses

    pub async fn create_expense(&self, expense: &ExpenseCreate) -> Result<ExpenseResponse> {
        self.post("/expenses", expense).await
    }

    pub async fn get_group_expenses(&self, group_id: i64) -> Result<Vec<ExpenseResponse>> {
        self.get(&format!("/expenses/group/{group_id}")).await
    }

    /// Balances assume every expense is shared equally by all members.
    pub async fn get_group_balance_summary(&self, group_id: i64) -> Result<GroupBalanceSummary> {
        self.get(&format!("/expenses/group/{group_id}/balance")).await
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// The backend's human-readable explanation, if the body carries one.
fn error_detail(data: &Value) -> Option<String> {
    match data.get("detail")? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
