//! In-memory filer
//!
//! Simulates a filer's directories and shares so a submission can be rehearsed
//! without an appliance. Every call is recorded, and any operation can be made
//! to fail.

use crate::domain::ports::{FilerConnector, FilerSession, ShareSpec};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

// =============================================================================
// Call Records
// =============================================================================

/// Filer operations that can be recorded or made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilerOperation {
    Open,
    Login,
    Mkdir,
    CreateShare,
    Close,
}

/// One call made against the simulated filer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilerCall {
    Open { address: String },
    Login { username: String },
    Mkdir { path: String },
    CreateShare(ShareSpec),
    Close,
}

impl FilerCall {
    pub fn operation(&self) -> FilerOperation {
        match self {
            FilerCall::Open { .. } => FilerOperation::Open,
            FilerCall::Login { .. } => FilerOperation::Login,
            FilerCall::Mkdir { .. } => FilerOperation::Mkdir,
            FilerCall::CreateShare(_) => FilerOperation::CreateShare,
            FilerCall::Close => FilerOperation::Close,
        }
    }
}

// =============================================================================
// Filer State
// =============================================================================

#[derive(Debug, Default)]
struct FilerState {
    directories: BTreeSet<String>,
    shares: BTreeMap<String, ShareSpec>,
    calls: Vec<FilerCall>,
    failures: BTreeMap<FilerOperation, String>,
    open_sessions: usize,
}

impl FilerState {
    fn check_failure(&self, operation: FilerOperation, name: &str) -> Result<()> {
        match self.failures.get(&operation) {
            Some(reason) => Err(rejected(name, reason)),
            None => Ok(()),
        }
    }
}

fn rejected(operation: &str, reason: impl Into<String>) -> Error {
    Error::FilerRejected {
        operation: operation.to_string(),
        reason: reason.into(),
    }
}

// =============================================================================
// In-Memory Filer
// =============================================================================

/// Connector for a simulated filer shared by all sessions it opens
#[derive(Debug, Clone, Default)]
pub struct InMemoryFiler {
    state: Arc<RwLock<FilerState>>,
    /// username -> password; empty accepts any credentials
    admins: Arc<BTreeMap<String, String>>,
}

impl InMemoryFiler {
    /// Create a filer that accepts any credentials
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an admin account; once any is registered, logins are checked
    pub fn with_admin(mut self, username: &str, password: &str) -> Self {
        Arc::make_mut(&mut self.admins).insert(username.to_string(), password.to_string());
        self
    }

    /// Pre-create a directory
    pub async fn add_directory(&self, path: &str) {
        self.state.write().await.directories.insert(path.to_string());
    }

    /// Make every future call of `operation` fail with `reason`
    pub async fn fail_on(&self, operation: FilerOperation, reason: &str) {
        self.state
            .write()
            .await
            .failures
            .insert(operation, reason.to_string());
    }

    pub async fn has_directory(&self, path: &str) -> bool {
        self.state.read().await.directories.contains(path)
    }

    pub async fn share(&self, name: &str) -> Option<ShareSpec> {
        self.state.read().await.shares.get(name).cloned()
    }

    pub async fn shares(&self) -> Vec<ShareSpec> {
        self.state.read().await.shares.values().cloned().collect()
    }

    pub async fn calls(&self) -> Vec<FilerCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn open_sessions(&self) -> usize {
        self.state.read().await.open_sessions
    }
}

#[async_trait]
impl FilerConnector for InMemoryFiler {
    async fn open(&self, address: &str) -> Result<Box<dyn FilerSession>> {
        let mut state = self.state.write().await;
        state.calls.push(FilerCall::Open {
            address: address.to_string(),
        });

        if let Some(reason) = state.failures.get(&FilerOperation::Open) {
            return Err(Error::Connection {
                filer: address.to_string(),
                reason: reason.clone(),
            });
        }

        state.open_sessions += 1;
        debug!("Opened in-memory session to {}", address);

        Ok(Box::new(InMemorySession {
            state: self.state.clone(),
            admins: self.admins.clone(),
            address: address.to_string(),
            logged_in: false,
            closed: false,
        }))
    }

    fn kind(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// In-Memory Session
// =============================================================================

struct InMemorySession {
    state: Arc<RwLock<FilerState>>,
    admins: Arc<BTreeMap<String, String>>,
    address: String,
    logged_in: bool,
    closed: bool,
}

impl InMemorySession {
    fn require_login(&self, operation: &str) -> Result<()> {
        if self.logged_in {
            Ok(())
        } else {
            Err(Error::NotLoggedIn {
                operation: operation.to_string(),
            })
        }
    }
}

#[async_trait]
impl FilerSession for InMemorySession {
    async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(FilerCall::Login {
            username: username.to_string(),
        });
        state.check_failure(FilerOperation::Login, "login")?;

        if !self.admins.is_empty() && self.admins.get(username).map(String::as_str) != Some(password)
        {
            return Err(rejected("login", "invalid username or password"));
        }

        self.logged_in = true;
        Ok(())
    }

    async fn mkdir(&mut self, path: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(FilerCall::Mkdir {
            path: path.to_string(),
        });
        self.require_login("mkdir")?;
        state.check_failure(FilerOperation::Mkdir, "mkdir")?;

        if path.trim_matches('/').is_empty() {
            return Err(rejected("mkdir", "invalid path"));
        }
        if !state.directories.insert(path.to_string()) {
            return Err(rejected("mkdir", format!("'{}' already exists", path)));
        }
        Ok(())
    }

    async fn create_share(&mut self, share: &ShareSpec) -> Result<()> {
        let mut state = self.state.write().await;
        state.calls.push(FilerCall::CreateShare(share.clone()));
        self.require_login("create share")?;
        state.check_failure(FilerOperation::CreateShare, "create share")?;

        if state.shares.contains_key(&share.name) {
            return Err(rejected(
                "create share",
                format!("share '{}' already exists", share.name),
            ));
        }
        if !state.directories.contains(&share.directory) {
            return Err(rejected(
                "create share",
                format!("directory '{}' not found", share.directory),
            ));
        }
        if share.acl.iter().any(|ace| ace.name.trim().is_empty()) {
            return Err(rejected("create share", "ACL entry without principal name"));
        }

        state.shares.insert(share.name.clone(), share.clone());
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.logged_in = false;

        let mut state = self.state.write().await;
        state.calls.push(FilerCall::Close);
        state.open_sessions = state.open_sessions.saturating_sub(1);
        debug!("Closed in-memory session to {}", self.address);
        state.check_failure(FilerOperation::Close, "logout")
    }
}
