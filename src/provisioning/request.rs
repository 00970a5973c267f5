//! Provisioning request
//!
//! The fully resolved, per-submission description of what will be created on
//! the filer: one folder and one share with its access entries.

use crate::domain::access::{AccessEntry, NfsClient, PrincipalType, ShareAce};
use crate::domain::ports::ShareSpec;
use serde::{Deserialize, Serialize};

/// Order in which domain principals appear in the share ACL
const ACL_ORDER: [PrincipalType; 2] = [PrincipalType::DomainGroup, PrincipalType::DomainUser];

/// Folder to create and share
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTarget {
    pub base_path: String,
    pub share_name: String,
}

impl FolderTarget {
    pub fn new(base_path: impl Into<String>, share_name: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            share_name: share_name.into(),
        }
    }

    /// Full directory path: base path without trailing `/`, then the share name
    pub fn directory(&self) -> String {
        format!("{}/{}", self.base_path.trim_end_matches('/'), self.share_name)
    }
}

/// One share provisioning request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningRequest {
    pub target: FolderTarget,
    /// At most one entry per principal type
    pub entries: Vec<AccessEntry>,
    pub export_to_nfs: bool,
}

impl ProvisioningRequest {
    pub fn directory(&self) -> String {
        self.target.directory()
    }

    pub fn share_name(&self) -> &str {
        &self.target.share_name
    }

    /// Share ACL, domain groups first, then domain users
    pub fn acl(&self) -> Vec<ShareAce> {
        ACL_ORDER
            .iter()
            .filter_map(|principal| {
                self.entries
                    .iter()
                    .find(|entry| entry.principal_type() == *principal)
            })
            .filter_map(AccessEntry::to_share_ace)
            .collect()
    }

    pub fn nfs_clients(&self) -> Vec<NfsClient> {
        self.entries
            .iter()
            .filter_map(AccessEntry::to_nfs_client)
            .collect()
    }

    /// Arguments for the share-creation call
    pub fn share_spec(&self) -> ShareSpec {
        ShareSpec {
            name: self.target.share_name.clone(),
            directory: self.directory(),
            export_to_nfs: self.export_to_nfs,
            trusted_nfs_clients: self.nfs_clients(),
            acl: self.acl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::Permission;

    #[test]
    fn test_directory_composition() {
        let target = FolderTarget::new("cloud/users/svc/data1", "proj1");
        assert_eq!(target.directory(), "cloud/users/svc/data1/proj1");

        let target = FolderTarget::new("cloud/users/svc/data1/", "proj1");
        assert_eq!(target.directory(), "cloud/users/svc/data1/proj1");

        let target = FolderTarget::new("cloud/users/svc/data1///", "proj1");
        assert_eq!(target.directory(), "cloud/users/svc/data1/proj1");
    }

    #[test]
    fn test_acl_order_is_group_then_user() {
        let request = ProvisioningRequest {
            target: FolderTarget::new("cloud", "s"),
            // deliberately out of order
            entries: vec![
                AccessEntry::DomainUser {
                    name: "alice@corp.com".into(),
                    permission: Permission::ReadOnly,
                },
                AccessEntry::DomainGroup {
                    name: "CORP\\eng".into(),
                    permission: Permission::ReadWrite,
                },
            ],
            export_to_nfs: false,
        };

        let acl = request.acl();
        assert_eq!(acl.len(), 2);
        assert_eq!(acl[0].principal_type, PrincipalType::DomainGroup);
        assert_eq!(acl[1].principal_type, PrincipalType::DomainUser);
        assert!(request.nfs_clients().is_empty());
    }
}
