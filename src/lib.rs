//! Share Provisioner
//!
//! Creates a folder on a network-attached storage filer and exposes it as a
//! share with Active Directory and NFS access control, in one submission.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       ShareForm (input)                          │
//! │   filer · admin credentials · base path · share name             │
//! │   [AD user]  [AD group]  [NFS]   (each Disabled | Enabled)       │
//! └───────────────────────────────┬─────────────────────────────────┘
//!                                 │ RequestBuilder
//!                 ┌───────────────┴───────────────┐
//!                 │      ProvisioningRequest      │
//!                 │  directory · ACL · NFS list   │
//!                 └───────────────┬───────────────┘
//!                                 │ ProvisioningFlow
//!      open ─▶ login ─▶ mkdir ─▶ create share ─▶ close (always)
//!                                 │
//! ┌───────────────────────────────┴─────────────────────────────────┐
//! │                         Filer Connectors                         │
//! │  ┌──────────────────────────┐  ┌──────────────────────────────┐  │
//! │  │  HTTP management API     │  │  In-memory simulation        │  │
//! │  └──────────────────────────┘  └──────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`provisioning`]: Form state, request building, submission flow
//! - [`filer`]: Filer connectors (HTTP, in-memory)
//! - [`domain`]: Access control types and filer session ports
//! - [`error`]: Error types and handling

pub mod domain;
pub mod error;
pub mod filer;
pub mod provisioning;

// Re-export commonly used types
pub use domain::{
    AccessEntry, Credentials, FilerConnector, FilerConnectorRef, FilerSession, NfsClient,
    Permission, PrincipalType, ShareAce, ShareSpec,
};

pub use error::{Error, ErrorKind, Result};

pub use filer::{FilerConfig, FilerFactory, HttpFilerConfig, HttpFilerConnector, InMemoryFiler};

pub use provisioning::{
    DomainPrincipalFields, FolderTarget, FormOverrides, NfsFields, OutputLog, ProvisioningFlow,
    ProvisioningRequest, RequestBuilder, Section, ShareForm, Submission,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
