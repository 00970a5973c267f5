//! Domain Ports - Filer session boundary
//!
//! The provisioning flow only ever talks to a filer through these traits.
//! Adapters in [`crate::filer`] implement them over HTTP or in memory.

use crate::domain::access::{NfsClient, ShareAce};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Credentials
// =============================================================================

/// Administrative credentials for one filer
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Filer address (host, host:port or URL)
    pub address: String,
    /// Admin username
    pub username: String,
    /// Admin password, never logged
    pub password: String,
}

impl Credentials {
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

// =============================================================================
// Share Creation Arguments
// =============================================================================

/// Arguments of a single share-creation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSpec {
    /// Share name
    pub name: String,
    /// Directory the share exposes
    pub directory: String,
    /// Whether the share is exported over NFS
    pub export_to_nfs: bool,
    /// Trusted NFS clients
    pub trusted_nfs_clients: Vec<NfsClient>,
    /// Share ACL, group entries before user entries
    pub acl: Vec<ShareAce>,
}

// =============================================================================
// Filer Session Port
// =============================================================================

/// An open management session against one filer.
///
/// Obtained from [`FilerConnector::open`]. Callers must call [`close`] once
/// they are done, whether or not the other calls succeeded.
///
/// [`close`]: FilerSession::close
#[async_trait]
pub trait FilerSession: Send {
    /// Authenticate as an administrator
    async fn login(&mut self, username: &str, password: &str) -> Result<()>;

    /// Create a directory; fails if the path is invalid or already exists
    async fn mkdir(&mut self, path: &str) -> Result<()>;

    /// Create a share; fails on naming conflicts or an invalid ACL
    async fn create_share(&mut self, share: &ShareSpec) -> Result<()>;

    /// Release the session
    async fn close(&mut self) -> Result<()>;
}

// =============================================================================
// Filer Connector Port
// =============================================================================

/// Opens sessions against filers
#[async_trait]
pub trait FilerConnector: Send + Sync {
    /// Open a session to the filer at `address`
    async fn open(&self, address: &str) -> Result<Box<dyn FilerSession>>;

    /// Connector name
    fn kind(&self) -> &str;
}

pub type FilerConnectorRef = Arc<dyn FilerConnector>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("filer.local", "admin", "s3cret!");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("s3cret!"));
    }

    #[test]
    fn test_share_spec_wire_names() {
        let spec = ShareSpec {
            name: "proj1".into(),
            directory: "cloud/proj1".into(),
            export_to_nfs: false,
            trusted_nfs_clients: Vec::new(),
            acl: Vec::new(),
        };
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["exportToNfs"], false);
        assert!(value["trustedNfsClients"].as_array().unwrap().is_empty());
    }
}
