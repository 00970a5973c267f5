//! Share Provisioning Request Builder
//!
//! Turns a [`ShareForm`] into the credentials and [`ProvisioningRequest`] for
//! one submission. Field values are trimmed; disabled sections contribute
//! nothing.

use crate::domain::access::{AccessEntry, Permission};
use crate::domain::ports::Credentials;
use crate::error::{Error, Result};
use crate::provisioning::form::{DomainPrincipalFields, NfsFields, Section, ShareForm};
use crate::provisioning::request::{FolderTarget, ProvisioningRequest};
use tracing::debug;

/// Credentials plus request, ready to run against a filer
#[derive(Debug, Clone)]
pub struct Submission {
    pub credentials: Credentials,
    pub request: ProvisioningRequest,
}

/// Builds provisioning requests from form state
pub struct RequestBuilder;

impl RequestBuilder {
    /// Build a submission from the form.
    ///
    /// Fails with [`Error::MissingField`] when a required value is empty.
    pub fn build(form: &ShareForm) -> Result<Submission> {
        let filer = required("filer", &form.filer)?;
        let admin_user = required("admin_user", &form.admin_user)?;
        let share_name = required("share_name", &form.share_name)?;

        let credentials = Credentials::new(filer, admin_user, form.admin_password.trim());
        let target = FolderTarget::new(form.base_path.trim(), share_name);

        let mut entries = Vec::with_capacity(3);
        if let Some((name, permission)) = domain_entry("ad_group", &form.ad_group)? {
            entries.push(AccessEntry::DomainGroup { name, permission });
        }
        if let Some((name, permission)) = domain_entry("ad_user", &form.ad_user)? {
            entries.push(AccessEntry::DomainUser { name, permission });
        }
        let nfs = nfs_entry(&form.nfs)?;
        let export_to_nfs = nfs.is_some();
        entries.extend(nfs);

        let request = ProvisioningRequest {
            target,
            entries,
            export_to_nfs,
        };

        debug!(
            "Built request for {} ({} access entries, nfs export: {})",
            request.directory(),
            request.entries.len(),
            request.export_to_nfs
        );

        Ok(Submission {
            credentials,
            request,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::MissingField { field });
    }
    Ok(value.to_string())
}

fn domain_entry(
    section: &'static str,
    fields: &Section<DomainPrincipalFields>,
) -> Result<Option<(String, Permission)>> {
    match fields {
        Section::Disabled => Ok(None),
        Section::Enabled(fields) => {
            let name = required(section, &fields.name)?;
            Ok(Some((name, Permission::resolve(&fields.permission))))
        }
    }
}

fn nfs_entry(fields: &Section<NfsFields>) -> Result<Option<AccessEntry>> {
    match fields {
        Section::Disabled => Ok(None),
        Section::Enabled(fields) => Ok(Some(AccessEntry::NfsClient {
            address: required("nfs_range", &fields.range)?,
            netmask: required("nfs_mask", &fields.mask)?,
            permission: Permission::resolve(&fields.permission),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::PrincipalType;
    use assert_matches::assert_matches;

    fn base_form() -> ShareForm {
        ShareForm {
            filer: "edge.corp.local".into(),
            admin_user: "admin".into(),
            admin_password: "secret".into(),
            base_path: "cloud/users/svc/data1".into(),
            share_name: "proj1".into(),
            ..Default::default()
        }
    }

    fn with_sections(user: bool, group: bool, nfs: bool) -> ShareForm {
        let mut form = base_form();
        if user {
            form.ad_user = Section::Enabled(DomainPrincipalFields::new("alice@corp.com", "RO"));
        }
        if group {
            form.ad_group = Section::Enabled(DomainPrincipalFields::new("CORP\\eng", "RW"));
        }
        if nfs {
            form.nfs = Section::Enabled(NfsFields::new("10.0.0.0", "255.255.255.0", "rw"));
        }
        form
    }

    #[test]
    fn test_all_sections_disabled() {
        let submission = RequestBuilder::build(&base_form()).unwrap();
        let share = submission.request.share_spec();

        assert_eq!(share.directory, "cloud/users/svc/data1/proj1");
        assert_eq!(share.name, "proj1");
        assert!(share.acl.is_empty());
        assert!(share.trusted_nfs_clients.is_empty());
        assert!(!share.export_to_nfs);
    }

    #[test]
    fn test_every_toggle_combination() {
        for mask in 0u8..8 {
            let (user, group, nfs) = (mask & 1 != 0, mask & 2 != 0, mask & 4 != 0);
            let request = RequestBuilder::build(&with_sections(user, group, nfs))
                .unwrap()
                .request;
            let acl = request.acl();

            let expected: Vec<PrincipalType> = [
                (group, PrincipalType::DomainGroup),
                (user, PrincipalType::DomainUser),
            ]
            .iter()
            .filter(|(enabled, _)| *enabled)
            .map(|(_, principal)| *principal)
            .collect();
            let actual: Vec<PrincipalType> = acl.iter().map(|ace| ace.principal_type).collect();

            assert_eq!(actual, expected, "toggles user={user} group={group} nfs={nfs}");
            assert_eq!(request.nfs_clients().len(), usize::from(nfs));
            assert_eq!(request.export_to_nfs, nfs);
        }
    }

    #[test]
    fn test_nfs_read_write() {
        let mut form = base_form();
        form.nfs = Section::Enabled(NfsFields::new("10.0.0.0", "255.255.255.0", "rw"));

        let share = RequestBuilder::build(&form).unwrap().request.share_spec();
        assert!(share.export_to_nfs);
        assert_eq!(share.trusted_nfs_clients.len(), 1);

        let client = &share.trusted_nfs_clients[0];
        assert_eq!(client.address, "10.0.0.0");
        assert_eq!(client.netmask, "255.255.255.0");
        assert_eq!(client.permission, Permission::ReadWrite);
    }

    #[test]
    fn test_disabled_section_does_not_leak() {
        let mut form = with_sections(true, true, true);
        form.ad_user.disable();
        form.nfs.disable();

        let request = RequestBuilder::build(&form).unwrap().request;
        let rendered = serde_json::to_string(&request.share_spec()).unwrap();

        assert!(!rendered.contains("alice@corp.com"));
        assert!(!rendered.contains("10.0.0.0"));
        assert!(rendered.contains("CORP\\\\eng"));
        assert!(!request.export_to_nfs);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let mut form = base_form();
        form.filer = "  edge.corp.local ".into();
        form.share_name = " proj1\t".into();
        form.base_path = " cloud/data/ ".into();
        form.ad_user = Section::Enabled(DomainPrincipalFields::new(" bob@corp.com ", "Rw"));

        let submission = RequestBuilder::build(&form).unwrap();
        assert_eq!(submission.credentials.address, "edge.corp.local");
        assert_eq!(submission.request.directory(), "cloud/data/proj1");

        let acl = submission.request.acl();
        assert_eq!(acl[0].name, "bob@corp.com");
        assert_eq!(acl[0].permission, Permission::ReadWrite);
    }

    #[test]
    fn test_missing_required_fields() {
        let mut form = base_form();
        form.share_name = "   ".into();
        assert_matches!(
            RequestBuilder::build(&form),
            Err(Error::MissingField { field: "share_name" })
        );

        let mut form = base_form();
        form.ad_group = Section::Enabled(DomainPrincipalFields::new("", "RW"));
        assert_matches!(
            RequestBuilder::build(&form),
            Err(Error::MissingField { field: "ad_group" })
        );

        let mut form = base_form();
        form.nfs = Section::Enabled(NfsFields::new("10.0.0.0", "", "RO"));
        assert_matches!(
            RequestBuilder::build(&form),
            Err(Error::MissingField { field: "nfs_mask" })
        );
    }
}
