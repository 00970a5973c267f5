//! Filer Adapters
//!
//! Provides connectors that open filer management sessions:
//! - HTTP: JSON management endpoint of a real appliance
//! - Memory: simulated filer for rehearsals and tests

pub mod http;
pub mod memory;

pub use http::*;
pub use memory::*;

use crate::domain::ports::FilerConnectorRef;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Factory for creating filer connectors
pub struct FilerFactory;

impl FilerFactory {
    /// Create a connector by name
    pub fn create(kind: &str, config: FilerConfig) -> Result<FilerConnectorRef> {
        match kind.to_lowercase().as_str() {
            "http" | "https" => Ok(Arc::new(HttpFilerConnector::new(config.http))),
            "memory" | "mem" => Ok(Arc::new(InMemoryFiler::new())),
            _ => Err(Error::Configuration(format!(
                "Unknown filer kind: {} (expected http or memory)",
                kind
            ))),
        }
    }
}

/// Combined connector configuration
#[derive(Debug, Clone, Default)]
pub struct FilerConfig {
    pub http: HttpFilerConfig,
}
