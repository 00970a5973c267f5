//! Access control types
//!
//! Permission levels and the access entries a share can carry. Domain users
//! and groups end up in the share ACL; NFS clients end up in the trusted
//! client list of the NFS export.

use serde::{Deserialize, Serialize};

// =============================================================================
// Permission
// =============================================================================

/// Access level granted to a principal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[default]
    #[serde(rename = "RO")]
    ReadOnly,
    #[serde(rename = "RW")]
    ReadWrite,
}

impl Permission {
    /// Resolve a raw permission field.
    ///
    /// Only `RW` (any case) grants read-write; every other value, including
    /// an empty one, falls back to read-only.
    pub fn resolve(value: &str) -> Self {
        if value.eq_ignore_ascii_case("RW") {
            Permission::ReadWrite
        } else {
            Permission::ReadOnly
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::ReadOnly => write!(f, "RO"),
            Permission::ReadWrite => write!(f, "RW"),
        }
    }
}

// =============================================================================
// Principals
// =============================================================================

/// Kind of principal an access entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalType {
    DomainUser,
    DomainGroup,
    NfsClient,
}

impl std::fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrincipalType::DomainUser => write!(f, "domain-user"),
            PrincipalType::DomainGroup => write!(f, "domain-group"),
            PrincipalType::NfsClient => write!(f, "nfs-client"),
        }
    }
}

// =============================================================================
// Access Entries
// =============================================================================

/// One access grant in a provisioning request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessEntry {
    /// Active Directory user, e.g. `user@domain.com`
    DomainUser { name: String, permission: Permission },
    /// Active Directory group, e.g. `DOMAIN\group`
    DomainGroup { name: String, permission: Permission },
    /// NFS client network
    NfsClient {
        address: String,
        netmask: String,
        permission: Permission,
    },
}

impl AccessEntry {
    pub fn principal_type(&self) -> PrincipalType {
        match self {
            AccessEntry::DomainUser { .. } => PrincipalType::DomainUser,
            AccessEntry::DomainGroup { .. } => PrincipalType::DomainGroup,
            AccessEntry::NfsClient { .. } => PrincipalType::NfsClient,
        }
    }

    pub fn permission(&self) -> Permission {
        match self {
            AccessEntry::DomainUser { permission, .. }
            | AccessEntry::DomainGroup { permission, .. }
            | AccessEntry::NfsClient { permission, .. } => *permission,
        }
    }

    /// Share ACL form of this entry, `None` for NFS clients
    pub fn to_share_ace(&self) -> Option<ShareAce> {
        match self {
            AccessEntry::DomainUser { name, permission }
            | AccessEntry::DomainGroup { name, permission } => Some(ShareAce {
                principal_type: self.principal_type(),
                name: name.clone(),
                permission: *permission,
            }),
            AccessEntry::NfsClient { .. } => None,
        }
    }

    /// NFS trusted client form of this entry, `None` for domain principals
    pub fn to_nfs_client(&self) -> Option<NfsClient> {
        match self {
            AccessEntry::NfsClient {
                address,
                netmask,
                permission,
            } => Some(NfsClient {
                address: address.clone(),
                netmask: netmask.clone(),
                permission: *permission,
            }),
            _ => None,
        }
    }
}

/// Share access control entry as submitted to the filer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareAce {
    pub principal_type: PrincipalType,
    pub name: String,
    pub permission: Permission,
}

/// NFSv3 trusted client as submitted to the filer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfsClient {
    pub address: String,
    pub netmask: String,
    pub permission: Permission,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_resolution_ignores_case() {
        assert_eq!(Permission::resolve("rw"), Permission::ReadWrite);
        assert_eq!(Permission::resolve("RW"), Permission::ReadWrite);
        assert_eq!(Permission::resolve("Rw"), Permission::ReadWrite);
        assert_eq!(Permission::resolve("rW"), Permission::ReadWrite);
    }

    #[test]
    fn test_permission_defaults_to_read_only() {
        assert_eq!(Permission::resolve("RO"), Permission::ReadOnly);
        assert_eq!(Permission::resolve(""), Permission::ReadOnly);
        assert_eq!(Permission::resolve("write"), Permission::ReadOnly);
        assert_eq!(Permission::resolve("rwx"), Permission::ReadOnly);
        assert_eq!(Permission::default(), Permission::ReadOnly);
    }

    #[test]
    fn test_entry_conversions() {
        let group = AccessEntry::DomainGroup {
            name: "CORP\\eng".into(),
            permission: Permission::ReadWrite,
        };
        let ace = group.to_share_ace().unwrap();
        assert_eq!(ace.principal_type, PrincipalType::DomainGroup);
        assert_eq!(ace.name, "CORP\\eng");
        assert!(group.to_nfs_client().is_none());

        let nfs = AccessEntry::NfsClient {
            address: "10.0.0.0".into(),
            netmask: "255.255.255.0".into(),
            permission: Permission::ReadOnly,
        };
        assert!(nfs.to_share_ace().is_none());
        assert_eq!(nfs.to_nfs_client().unwrap().netmask, "255.255.255.0");
        assert_eq!(nfs.principal_type(), PrincipalType::NfsClient);
    }

    #[test]
    fn test_permission_serde_names() {
        let json = serde_json::to_string(&Permission::ReadWrite).unwrap();
        assert_eq!(json, "\"RW\"");
        let parsed: Permission = serde_json::from_str("\"RO\"").unwrap();
        assert_eq!(parsed, Permission::ReadOnly);
    }
}
