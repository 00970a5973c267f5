//! Provisioning flow
//!
//! Runs a submission against a filer: open session, login, mkdir, create
//! share. The first failing stage ends the submission. The session is closed
//! on every path once it was opened.

use crate::domain::ports::{FilerConnectorRef, FilerSession, ShareSpec};
use crate::error::{Error, Result};
use crate::provisioning::builder::{RequestBuilder, Submission};
use crate::provisioning::form::ShareForm;
use crate::provisioning::output::OutputLog;
use tracing::{debug, info, warn};

/// Executes share provisioning submissions.
///
/// Holds no per-submission state, so a failed submission can simply be
/// resubmitted with corrected input.
pub struct ProvisioningFlow {
    connector: FilerConnectorRef,
}

impl ProvisioningFlow {
    pub fn new(connector: FilerConnectorRef) -> Self {
        Self { connector }
    }

    /// Build a request from the form and execute it
    pub async fn submit(&self, form: &ShareForm, log: &mut OutputLog) -> Result<ShareSpec> {
        let (ad_user, ad_group, nfs) = form.section_states();
        log.info(format!(
            "Sections enabled - ad_user: {}, ad_group: {}, nfs: {}",
            ad_user, ad_group, nfs
        ));

        let submission = match RequestBuilder::build(form) {
            Ok(submission) => submission,
            Err(e) => {
                log.error(e.to_string());
                return Err(e);
            }
        };

        self.execute(&submission, log).await
    }

    /// Execute an already built submission
    pub async fn execute(&self, submission: &Submission, log: &mut OutputLog) -> Result<ShareSpec> {
        let filer = submission.credentials.address.as_str();
        info!(
            "Opening {} session to filer {}",
            self.connector.kind(),
            filer
        );

        let mut session = match self.connector.open(filer).await {
            Ok(session) => session,
            Err(e) => {
                let e = connection_error(filer, e);
                log.error(e.to_string());
                return Err(e);
            }
        };

        let outcome = run_stages(session.as_mut(), submission, log).await;

        if let Err(e) = session.close().await {
            warn!("Closing session to {} failed: {}", filer, e);
            log.warn(format!("Failed to close session to {}: {}", filer, e));
        } else {
            debug!("Session to {} closed", filer);
        }

        if let Err(e) = &outcome {
            log.error(e.to_string());
        }
        outcome
    }
}

async fn run_stages(
    session: &mut dyn FilerSession,
    submission: &Submission,
    log: &mut OutputLog,
) -> Result<ShareSpec> {
    let credentials = &submission.credentials;
    let request = &submission.request;

    session
        .login(&credentials.username, &credentials.password)
        .await
        .map_err(|e| match e {
            Error::Connection { .. } => e,
            other => Error::Authentication {
                filer: credentials.address.clone(),
                source: Box::new(other),
            },
        })?;
    log.info(format!("Logged in to the filer at {}", credentials.address));

    let directory = request.directory();
    session
        .mkdir(&directory)
        .await
        .map_err(|e| Error::DirectoryCreation {
            path: directory.clone(),
            source: Box::new(e),
        })?;
    log.info(format!("Folder '{}' created successfully.", directory));

    let share = request.share_spec();
    debug!(
        "Creating share {} ({} ACL entries, {} NFS clients)",
        share.name,
        share.acl.len(),
        share.trusted_nfs_clients.len()
    );
    session
        .create_share(&share)
        .await
        .map_err(|e| Error::ShareCreation {
            share: share.name.clone(),
            source: Box::new(e),
        })?;
    log.info(format!("Share '{}' created successfully.", share.name));

    Ok(share)
}

fn connection_error(filer: &str, e: Error) -> Error {
    match e {
        Error::Connection { .. } => e,
        other => Error::Connection {
            filer: filer.to_string(),
            reason: other.to_string(),
        },
    }
}
