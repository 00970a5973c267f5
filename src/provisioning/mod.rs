//! Share Provisioning Module
//!
//! Form state, request building, and the login/mkdir/create-share flow.

pub mod builder;
pub mod flow;
pub mod form;
pub mod output;
pub mod request;

pub use builder::*;
pub use flow::*;
pub use form::*;
pub use output::*;
pub use request::*;
