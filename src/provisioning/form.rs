//! Share form state
//!
//! The raw values a user supplies for one submission. Optional sections are a
//! [`Section`] so a disabled section has no field values at all.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use tracing::{debug, warn};

// =============================================================================
// Section
// =============================================================================

/// An optional part of the form that is either switched off or filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section<T> {
    Disabled,
    Enabled(T),
}

impl<T> Section<T> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Section::Enabled(_))
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Section::Enabled(fields) => Some(fields),
            Section::Disabled => None,
        }
    }

    /// Switch the section off, dropping whatever was entered
    pub fn disable(&mut self) {
        *self = Section::Disabled;
    }
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Section::Disabled
    }
}

impl<T> From<Option<T>> for Section<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(fields) => Section::Enabled(fields),
            None => Section::Disabled,
        }
    }
}

// A disabled section is `null` (or absent) in request files.
impl<T: Serialize> Serialize for Section<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Section<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Section::from)
    }
}

// =============================================================================
// Section Fields
// =============================================================================

fn default_permission() -> String {
    "RO".to_string()
}

/// AD user or AD group section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainPrincipalFields {
    /// `user@domain.com` or `DOMAIN\group`
    pub name: String,
    /// Raw permission field, `RW` or `RO`
    #[serde(default = "default_permission")]
    pub permission: String,
}

impl DomainPrincipalFields {
    pub fn new(name: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permission: permission.into(),
        }
    }
}

/// NFS section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfsFields {
    /// Client network address, e.g. `10.0.0.0`
    pub range: String,
    /// Client netmask, e.g. `255.255.255.0`
    pub mask: String,
    /// Raw permission field, `RW` or `RO`
    #[serde(default = "default_permission")]
    pub permission: String,
}

impl NfsFields {
    pub fn new(
        range: impl Into<String>,
        mask: impl Into<String>,
        permission: impl Into<String>,
    ) -> Self {
        Self {
            range: range.into(),
            mask: mask.into(),
            permission: permission.into(),
        }
    }
}

// =============================================================================
// Overrides
// =============================================================================

/// Values given outside a request file, e.g. on the command line.
///
/// An identity (`ad_user`, `ad_group`, `nfs_range`) enables its section. The
/// other section values only refine a section that is already enabled.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormOverrides {
    pub filer: Option<String>,
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
    pub base_path: Option<String>,
    pub share_name: Option<String>,
    pub ad_user: Option<String>,
    pub ad_user_permission: Option<String>,
    pub ad_group: Option<String>,
    pub ad_group_permission: Option<String>,
    pub nfs_range: Option<String>,
    pub nfs_mask: Option<String>,
    pub nfs_permission: Option<String>,
}

fn override_field(field: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *field = value.clone();
    }
}

fn override_domain(
    section: &mut Section<DomainPrincipalFields>,
    name: &Option<String>,
    permission: &Option<String>,
    permission_flag: &'static str,
    ignored: &mut Vec<&'static str>,
) {
    if !section.is_enabled() {
        if name.is_none() {
            if permission.is_some() {
                ignored.push(permission_flag);
            }
            return;
        }
        *section = Section::Enabled(DomainPrincipalFields::new("", default_permission()));
    }
    if let Section::Enabled(fields) = section {
        override_field(&mut fields.name, name);
        override_field(&mut fields.permission, permission);
    }
}

fn override_nfs(
    section: &mut Section<NfsFields>,
    overrides: &FormOverrides,
    ignored: &mut Vec<&'static str>,
) {
    if !section.is_enabled() {
        if overrides.nfs_range.is_none() {
            if overrides.nfs_mask.is_some() {
                ignored.push("nfs_mask");
            }
            if overrides.nfs_permission.is_some() {
                ignored.push("nfs_permission");
            }
            return;
        }
        *section = Section::Enabled(NfsFields::new("", "", default_permission()));
    }
    if let Section::Enabled(fields) = section {
        override_field(&mut fields.range, &overrides.nfs_range);
        override_field(&mut fields.mask, &overrides.nfs_mask);
        override_field(&mut fields.permission, &overrides.nfs_permission);
    }
}

// =============================================================================
// Share Form
// =============================================================================

/// Everything needed for one share provisioning submission
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareForm {
    /// Filer address
    #[serde(default)]
    pub filer: String,
    /// Admin username
    #[serde(default)]
    pub admin_user: String,
    /// Admin password; never read from or written to request files
    #[serde(skip)]
    pub admin_password: String,
    /// Base path, e.g. `cloud/users/Service Account/data1`
    #[serde(default)]
    pub base_path: String,
    /// Share name, also the name of the new folder
    #[serde(default)]
    pub share_name: String,
    #[serde(default)]
    pub ad_user: Section<DomainPrincipalFields>,
    #[serde(default)]
    pub ad_group: Section<DomainPrincipalFields>,
    #[serde(default)]
    pub nfs: Section<NfsFields>,
}

impl std::fmt::Debug for ShareForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareForm")
            .field("filer", &self.filer)
            .field("admin_user", &self.admin_user)
            .field("admin_password", &"********")
            .field("base_path", &self.base_path)
            .field("share_name", &self.share_name)
            .field("ad_user", &self.ad_user)
            .field("ad_group", &self.ad_group)
            .field("nfs", &self.nfs)
            .finish()
    }
}

impl ShareForm {
    /// Load a form from a YAML or JSON request file.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let request_file_error = |reason: String| Error::RequestFile {
            path: shown.clone(),
            reason,
        };

        let contents =
            std::fs::read_to_string(path).map_err(|e| request_file_error(e.to_string()))?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let form: ShareForm = if is_json {
            serde_json::from_str(&contents).map_err(|e| request_file_error(e.to_string()))?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| request_file_error(e.to_string()))?
        };

        debug!("Loaded request file {}: {:?}", shown, form);
        Ok(form)
    }

    /// Layer `overrides` on top of this form.
    ///
    /// Returns the names of values that were dropped because their section is
    /// neither enabled here nor enabled by an identity in `overrides`.
    pub fn apply_overrides(&mut self, overrides: &FormOverrides) -> Vec<&'static str> {
        override_field(&mut self.filer, &overrides.filer);
        override_field(&mut self.admin_user, &overrides.admin_user);
        override_field(&mut self.admin_password, &overrides.admin_password);
        override_field(&mut self.base_path, &overrides.base_path);
        override_field(&mut self.share_name, &overrides.share_name);

        let mut ignored = Vec::new();
        override_domain(
            &mut self.ad_user,
            &overrides.ad_user,
            &overrides.ad_user_permission,
            "ad_user_permission",
            &mut ignored,
        );
        override_domain(
            &mut self.ad_group,
            &overrides.ad_group,
            &overrides.ad_group_permission,
            "ad_group_permission",
            &mut ignored,
        );
        override_nfs(&mut self.nfs, overrides, &mut ignored);

        for name in &ignored {
            warn!("Ignoring {}: its section is not enabled", name);
        }
        ignored
    }

    /// Enabled flags of the AD user, AD group and NFS sections
    pub fn section_states(&self) -> (bool, bool, bool) {
        (
            self.ad_user.is_enabled(),
            self.ad_group.is_enabled(),
            self.nfs.is_enabled(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_disable_drops_values() {
        let mut section = Section::Enabled(DomainPrincipalFields::new("alice@corp.com", "RW"));
        assert!(section.is_enabled());

        section.disable();
        assert_eq!(section, Section::Disabled);
        assert!(section.as_option().is_none());
    }

    #[test]
    fn test_load_yaml_request_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "filer: edge.corp.local\n\
             admin_user: admin\n\
             base_path: cloud/users/svc/data1\n\
             share_name: proj1\n\
             ad_group:\n  name: CORP\\eng\n  permission: rw\n\
             nfs: null\n"
        )
        .unwrap();

        let form = ShareForm::load(file.path()).unwrap();
        assert_eq!(form.filer, "edge.corp.local");
        assert_eq!(form.share_name, "proj1");
        assert!(form.admin_password.is_empty());
        assert_eq!(form.section_states(), (false, true, false));
        assert_matches!(&form.ad_group, Section::Enabled(group) if group.permission == "rw");
    }

    #[test]
    fn test_load_json_request_file_defaults_permission() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"filer": "edge", "admin_user": "admin", "share_name": "s1",
                "nfs": {{"range": "10.0.0.0", "mask": "255.255.255.0"}}}}"#
        )
        .unwrap();

        let form = ShareForm::load(file.path()).unwrap();
        assert_matches!(&form.nfs, Section::Enabled(nfs) if nfs.permission == "RO");
        assert_eq!(form.ad_user, Section::Disabled);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ShareForm::load("/nonexistent/request.yaml").unwrap_err();
        assert_matches!(err, Error::RequestFile { .. });
    }

    #[test]
    fn test_identity_override_keeps_file_permission() {
        let mut form = ShareForm {
            ad_group: Section::Enabled(DomainPrincipalFields::new("CORP\\eng", "RW")),
            nfs: Section::Enabled(NfsFields::new("10.0.0.0", "255.255.255.0", "RW")),
            ..Default::default()
        };

        let ignored = form.apply_overrides(&FormOverrides {
            ad_group: Some("CORP\\ops".into()),
            nfs_range: Some("10.1.0.0".into()),
            ..Default::default()
        });

        assert!(ignored.is_empty());
        assert_eq!(
            form.ad_group,
            Section::Enabled(DomainPrincipalFields::new("CORP\\ops", "RW"))
        );
        assert_eq!(
            form.nfs,
            Section::Enabled(NfsFields::new("10.1.0.0", "255.255.255.0", "RW"))
        );
    }

    #[test]
    fn test_identity_override_enables_section() {
        let mut form = ShareForm::default();

        let ignored = form.apply_overrides(&FormOverrides {
            filer: Some("edge".into()),
            ad_user: Some("alice@corp.com".into()),
            ad_user_permission: Some("RW".into()),
            nfs_range: Some("10.0.0.0".into()),
            ..Default::default()
        });

        assert!(ignored.is_empty());
        assert_eq!(form.filer, "edge");
        assert_eq!(
            form.ad_user,
            Section::Enabled(DomainPrincipalFields::new("alice@corp.com", "RW"))
        );
        assert_eq!(form.nfs, Section::Enabled(NfsFields::new("10.0.0.0", "", "RO")));
        assert_eq!(form.ad_group, Section::Disabled);
    }

    #[test]
    fn test_permission_without_identity_is_reported() {
        let mut form = ShareForm::default();

        let ignored = form.apply_overrides(&FormOverrides {
            ad_user_permission: Some("RW".into()),
            ad_group_permission: Some("RW".into()),
            nfs_mask: Some("255.255.255.0".into()),
            ..Default::default()
        });

        assert_eq!(
            ignored,
            vec!["ad_user_permission", "ad_group_permission", "nfs_mask"]
        );
        assert_eq!(form.section_states(), (false, false, false));
    }

    #[test]
    fn test_permission_override_refines_file_section() {
        let mut form = ShareForm {
            ad_user: Section::Enabled(DomainPrincipalFields::new("alice@corp.com", "RO")),
            ..Default::default()
        };

        let ignored = form.apply_overrides(&FormOverrides {
            ad_user_permission: Some("RW".into()),
            ..Default::default()
        });

        assert!(ignored.is_empty());
        assert_matches!(&form.ad_user, Section::Enabled(user) if user.permission == "RW");
    }

    #[test]
    fn test_debug_hides_password() {
        let form = ShareForm {
            admin_password: "hunter2".into(),
            ..Default::default()
        };
        assert!(!format!("{:?}", form).contains("hunter2"));
    }
}
