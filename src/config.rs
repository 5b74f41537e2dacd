use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_PREFIX: &str = "/api/v1";

pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub bcrypt_cost: u32,
    pub log_level: String,
    pub request_timeout_secs: u64,
    /// Directory holding the persisted bearer token on the client side.
    pub token_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_prefix", &self.api_prefix)
            .field("secret_key", &"<redacted>")
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("token_dir", &self.token_dir)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            secret_key: "your-secret-key-change-in-production".to_string(),
            access_token_expire_minutes: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            log_level: "info".to_string(),
            request_timeout_secs: 30,
            token_dir: default_token_dir(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed_var("PORT").unwrap_or(defaults.port),
            api_prefix: env::var("API_V1_PREFIX").unwrap_or(defaults.api_prefix),
            secret_key: env::var("SECRET_KEY").unwrap_or(defaults.secret_key),
            access_token_expire_minutes: parsed_var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .unwrap_or(defaults.access_token_expire_minutes),
            bcrypt_cost: parsed_var("BCRYPT_COST").unwrap_or(defaults.bcrypt_cost),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            request_timeout_secs: parsed_var("REQUEST_TIMEOUT_SECS").unwrap_or(defaults.request_timeout_secs),
            token_dir: env::var_os("EXPENSE_SETTLEMENT_TOKEN_DIR")
                .map(PathBuf::from)
                .or(defaults.token_dir),
        }
    }
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn default_token_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(".expense_settlement"))
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
