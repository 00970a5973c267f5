//! Error types for the Share Provisioner
//!
//! Every stage of a submission (connect, login, mkdir, share creation) has its
//! own variant so the output log can say exactly which step failed and on what.

use thiserror::Error;

/// Unified error type for the provisioner
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Request file error: {path} - {reason}")]
    RequestFile { path: String, reason: String },

    // =========================================================================
    // Filer Stage Errors
    // =========================================================================
    #[error("Could not connect to filer {filer}: {reason}")]
    Connection { filer: String, reason: String },

    #[error("Login to filer {filer} failed: {source}")]
    Authentication {
        filer: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Error creating folder '{path}': {source}")]
    DirectoryCreation {
        path: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Error creating share '{share}': {source}")]
    ShareCreation {
        share: String,
        #[source]
        source: Box<Error>,
    },

    // =========================================================================
    // Filer Call Errors
    // =========================================================================
    #[error("Filer rejected {operation}: {reason}")]
    FilerRejected { operation: String, reason: String },

    #[error("Filer returned HTTP {status} for {operation}: {body}")]
    FilerStatus {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("No active session: {operation} requires login")]
    NotLoggedIn { operation: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which part of a submission an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing form input, raised before any remote call
    Input,
    /// The filer could not be reached
    Connection,
    /// The filer refused the admin credentials
    Authentication,
    /// The target directory could not be created
    Directory,
    /// The share could not be created
    Share,
    /// Anything else
    Unexpected,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Input => write!(f, "input"),
            ErrorKind::Connection => write!(f, "connection"),
            ErrorKind::Authentication => write!(f, "authentication"),
            ErrorKind::Directory => write!(f, "directory"),
            ErrorKind::Share => write!(f, "share"),
            ErrorKind::Unexpected => write!(f, "unexpected"),
        }
    }
}

impl Error {
    /// Classify this error by submission stage
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingField { .. }
            | Error::RequestFile { .. }
            | Error::Configuration(_) => ErrorKind::Input,

            Error::Connection { .. } | Error::Http(_) => ErrorKind::Connection,

            Error::Authentication { .. } | Error::NotLoggedIn { .. } => {
                ErrorKind::Authentication
            }

            Error::DirectoryCreation { .. } => ErrorKind::Directory,

            Error::ShareCreation { .. } => ErrorKind::Share,

            _ => ErrorKind::Unexpected,
        }
    }

    /// Whether correcting the form and resubmitting is the expected remedy
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Input | ErrorKind::Authentication | ErrorKind::Directory | ErrorKind::Share
        )
    }
}

/// Result type alias for the provisioner
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(operation: &str) -> Box<Error> {
        Box::new(Error::FilerRejected {
            operation: operation.into(),
            reason: "denied".into(),
        })
    }

    #[test]
    fn test_error_kinds() {
        let err = Error::MissingField { field: "share_name" };
        assert_eq!(err.kind(), ErrorKind::Input);

        let err = Error::Authentication {
            filer: "filer.local".into(),
            source: rejected("login"),
        };
        assert_eq!(err.kind(), ErrorKind::Authentication);

        let err = Error::DirectoryCreation {
            path: "cloud/a".into(),
            source: rejected("mkdir"),
        };
        assert_eq!(err.kind(), ErrorKind::Directory);

        let err = *rejected("logout");
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_directory_error_names_path() {
        let err = Error::DirectoryCreation {
            path: "cloud/users/svc/data1/proj1".into(),
            source: rejected("mkdir"),
        };
        let message = err.to_string();
        assert!(message.contains("cloud/users/svc/data1/proj1"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn test_input_errors() {
        let err = Error::ShareCreation {
            share: "proj1".into(),
            source: rejected("create share"),
        };
        assert!(err.is_input_error());

        let err = Error::Connection {
            filer: "filer.local".into(),
            reason: "refused".into(),
        };
        assert!(!err.is_input_error());
    }
}
