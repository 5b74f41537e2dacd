mod client_tests;
mod user_tests;

use crate::api;
use crate::client::{ClientConfig, ExpenseSettlementClient, MemoryTokenStorage, TokenStorage};
use crate::config::Config;
use crate::core::models::{UserCreate, UserLogin};
use crate::core::services::SettlementService;
use crate::infrastructure::storage::UserRecord;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use std::sync::Arc;

pub fn test_config() -> Config {
    Config {
        secret_key: "test-secret".to_string(),
        bcrypt_cost: 4,
        token_dir: None,
        ..Config::default()
    }
}

pub fn create_test_service() -> SettlementService<InMemoryStorage> {
    let _ = env_logger::try_init();
    SettlementService::new(InMemoryStorage::new(), &test_config())
}

pub fn new_user(name: &str) -> UserCreate {
    UserCreate {
        email: format!("{name}@example.com"),
        username: name.to_string(),
        full_name: None,
        password: "password123".to_string(),
    }
}

/// Sign a user up and resolve them through their own login token.
pub async fn signed_in(service: &SettlementService<InMemoryStorage>, name: &str) -> UserRecord {
    service.signup(new_user(name)).await.unwrap();
    let token = service
        .login(UserLogin {
            email: format!("{name}@example.com"),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    service.current_user(&token.access_token).await.unwrap()
}

/// Serve the real application on an ephemeral port; returns its base url.
pub async fn spawn_app() -> String {
    let _ = env_logger::try_init();
    let config = test_config();
    let service = Arc::new(SettlementService::new(InMemoryStorage::new(), &config));
    let app = api::app(service, &config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn memory_client(base_url: &str) -> ExpenseSettlementClient {
    let storage: Arc<dyn TokenStorage> = Arc::new(MemoryTokenStorage::new());
    ExpenseSettlementClient::new(ClientConfig::new(base_url).token_storage(storage)).unwrap()
}
