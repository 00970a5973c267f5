//! HTTP Filer Adapter
//!
//! Talks to a filer's JSON management endpoint. Session state lives in the
//! client's cookie store, so each opened session gets its own client.

use crate::domain::ports::{FilerConnector, FilerSession, ShareSpec};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the HTTP filer adapter
#[derive(Debug, Clone)]
pub struct HttpFilerConfig {
    /// Scheme used when the filer address has none
    pub scheme: String,
    /// Path prefix of the management API
    pub api_prefix: String,
    /// Verify the filer's TLS certificate
    pub verify_tls: bool,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpFilerConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            api_prefix: "/api".to_string(),
            // appliances ship with self-signed certificates
            verify_tls: false,
            timeout_secs: 30,
        }
    }
}

// =============================================================================
// HTTP Connector
// =============================================================================

/// Opens HTTP management sessions
pub struct HttpFilerConnector {
    config: HttpFilerConfig,
}

impl HttpFilerConnector {
    pub fn new(config: HttpFilerConfig) -> Self {
        Self { config }
    }

    /// Management API base URL for a filer address
    pub fn api_base(&self, address: &str) -> Result<String> {
        let address = address.trim().trim_end_matches('/');
        if address.is_empty() {
            return Err(Error::Connection {
                filer: address.to_string(),
                reason: "empty filer address".into(),
            });
        }

        let origin = if address.contains("://") {
            address.to_string()
        } else {
            format!("{}://{}", self.config.scheme, address)
        };

        let prefix = self.config.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            Ok(origin)
        } else {
            Ok(format!("{}/{}", origin, prefix))
        }
    }
}

#[async_trait]
impl FilerConnector for HttpFilerConnector {
    async fn open(&self, address: &str) -> Result<Box<dyn FilerSession>> {
        let api_base = self.api_base(address)?;

        if !self.config.verify_tls {
            warn!("TLS certificate verification disabled for {}", address);
        }

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!self.config.verify_tls)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()
            .map_err(|e| Error::Connection {
                filer: address.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Opened HTTP session to {}", api_base);

        Ok(Box::new(HttpFilerSession {
            client,
            api_base,
            address: address.to_string(),
            logged_in: false,
        }))
    }

    fn kind(&self) -> &str {
        "http"
    }
}

// =============================================================================
// HTTP Session
// =============================================================================

/// One logged-in (or not yet logged-in) management session
pub struct HttpFilerSession {
    client: reqwest::Client,
    api_base: String,
    address: String,
    logged_in: bool,
}

impl HttpFilerSession {
    async fn post<T: Serialize + ?Sized>(&self, operation: &str, path: &str, body: &T) -> Result<()> {
        let url = format!("{}/{}", self.api_base, path);
        debug!("POST {} ({})", url, operation);

        let response = match self.client.post(&url).json(body).send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() => {
                return Err(Error::Connection {
                    filer: self.address.clone(),
                    reason: e.to_string(),
                })
            }
            Err(e) => return Err(Error::Http(e)),
        };
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::FilerStatus {
            operation: operation.to_string(),
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }

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
impl FilerSession for HttpFilerSession {
    async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.post(
            "login",
            "login",
            &json!({ "username": username, "password": password }),
        )
        .await?;
        self.logged_in = true;
        info!("Authenticated to {} as {}", self.address, username);
        Ok(())
    }

    async fn mkdir(&mut self, path: &str) -> Result<()> {
        self.require_login("mkdir")?;
        self.post("mkdir", "files/mkdir", &json!({ "path": path }))
            .await
    }

    async fn create_share(&mut self, share: &ShareSpec) -> Result<()> {
        self.require_login("create share")?;
        self.post("create share", "shares", share).await
    }

    async fn close(&mut self) -> Result<()> {
        if !self.logged_in {
            return Ok(());
        }
        self.logged_in = false;
        self.post("logout", "logout", &json!({})).await
    }
}
