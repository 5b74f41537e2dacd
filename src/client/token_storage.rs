//! Where the client keeps its bearer token.
//!
//! Persistence is best-effort: a storage medium that fails is treated as
//! holding no token, and failed writes are dropped after logging. Nothing in
//! this module returns an error.

use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Name of the single key under which a durable store keeps the token.
pub const TOKEN_KEY: &str = "expense_settlement_token";

pub trait TokenStorage: Send + Sync {
    fn get_token(&self) -> Option<String>;
    fn set_token(&self, token: &str);
    fn clear_token(&self);
}

/// Token held for the lifetime of the client instance.
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone()).filter(|t| !t.is_empty())
    }

    fn set_token(&self, token: &str) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.to_string());
        }
    }

    fn clear_token(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }
}

/// Token persisted as a file named [`TOKEN_KEY`] inside a directory, so it
/// survives restarts of the process.
pub struct FileTokenStorage {
    dir: PathBuf,
}

impl FileTokenStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileTokenStorage { dir: dir.into() }
    }

    /// Returns a store only if `dir` can be created and written to.
    pub fn probe(dir: &Path) -> Option<Self> {
        let writable = fs::create_dir_all(dir)
            .and_then(|_| fs::metadata(dir))
            .map(|meta| meta.is_dir() && !meta.permissions().readonly());
        match writable {
            Ok(true) => Some(Self::new(dir)),
            Ok(false) => {
                debug!("Token directory {} is not writable", dir.display());
                None
            }
            Err(err) => {
                debug!("Token directory {} unavailable: {}", dir.display(), err);
                None
            }
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_KEY)
    }

    fn write(&self, token: &str) -> io::Result<()> {
        let tmp = self.dir.join(format!(".{}.{}.tmp", TOKEN_KEY, Uuid::new_v4()));
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        // owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options
            .open(&tmp)
            .and_then(|mut file| file.write_all(token.as_bytes()))
            .and_then(|_| fs::rename(&tmp, self.path()))
            .inspect_err(|_| {
                let _ = fs::remove_file(&tmp);
            })
    }
}

impl TokenStorage for FileTokenStorage {
    fn get_token(&self) -> Option<String> {
        match fs::read_to_string(self.path()) {
            Ok(token) => Some(token.trim().to_string()).filter(|t| !t.is_empty()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("Could not read stored token: {}", err);
                None
            }
        }
    }

    fn set_token(&self, token: &str) {
        if let Err(err) = self.write(token) {
            warn!("Could not persist token: {}", err);
        }
    }

    fn clear_token(&self) {
        match fs::remove_file(self.path()) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("Could not remove stored token: {}", err),
        }
    }
}

/// Pick a durable store when `dir` is usable, else an in-memory one.
pub fn create_default_token_storage(dir: Option<&Path>) -> Arc<dyn TokenStorage> {
    match dir.and_then(FileTokenStorage::probe) {
        Some(store) => {
            debug!("Persisting token under {}", store.path().display());
            Arc::new(store)
        }
        None => Arc::new(MemoryTokenStorage::new()),
    }
}
