//! Domain layer - Access control model and port definitions
//!
//! This module defines the access entries a share carries and the traits
//! (ports) that filer adapters implement.

pub mod access;
pub mod ports;

pub use access::*;
pub use ports::*;
