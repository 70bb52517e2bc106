//! Host platform detection and the semanage flag compatibility shim.
//!
//! semanage's file-type flag changed shape across RHEL releases; the shim
//! here reproduces the historical forms so generated commands work on
//! RHEL-family hosts older than 7.0 as well as everything current.

use std::fs;

use crate::constants::OS_RELEASE_PATH;
use crate::mapping::FileTypeCode;

/// Platform family and version of the host, as reported by os-release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Normalized family name; RHEL derivatives report `rhel`
    pub family: String,
    /// Version string, e.g. `6.10` or `7.9.2009`
    pub version: String,
}

impl Platform {
    /// Build a platform descriptor from known values.
    pub fn new(family: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            version: version.into(),
        }
    }

    /// Detect the running host's platform from /etc/os-release.
    ///
    /// An unreadable os-release yields an empty descriptor, which selects
    /// the modern flag forms.
    pub fn detect() -> Self {
        Self::from_os_release(&fs::read_to_string(OS_RELEASE_PATH).unwrap_or_default())
    }

    fn from_os_release(content: &str) -> Self {
        let mut id = "";
        let mut id_like = "";
        let mut version = "";
        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            match key {
                "ID" => id = value,
                "ID_LIKE" => id_like = value,
                "VERSION_ID" => version = value,
                _ => {}
            }
        }
        let family = if id == "rhel" || id_like.split_whitespace().any(|like| like == "rhel") {
            "rhel"
        } else {
            id
        };
        Self::new(family, version)
    }

    /// Leading numeric component of the version string.
    ///
    /// Platform versions (`6.10`, `7.9.2009`) are not semver, so only the
    /// major component is compared.
    fn major_version(&self) -> Option<u32> {
        self.version.split(['.', '-']).next()?.parse().ok()
    }

    /// Whether this host takes the pre-7.0 RHEL semanage flag forms.
    pub fn legacy_semanage_flags(&self) -> bool {
        self.family.contains("rhel") && self.major_version().is_some_and(|major| major < 7)
    }
}

/// Compute the semanage file-type flag arguments for this host.
///
/// Old RHEL semanage was inconsistent: `a` took an empty flag value, `f` a
/// literal `--`, and every other type the letter prefixed with a dash.
/// Modern semanage takes the bare letter for every type. Both forms are
/// reproduced exactly.
pub fn semanage_file_type_args(platform: &Platform, file_type: FileTypeCode) -> Vec<String> {
    let value = if platform.legacy_semanage_flags() {
        match file_type.code() {
            'a' => String::new(),
            'f' => "--".to_string(),
            code => format!("-{code}"),
        }
    } else {
        file_type.code().to_string()
    };
    vec!["-f".to_string(), value]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_flag_matrix() {
        let legacy = Platform::new("rhel", "6.10");
        assert_eq!(
            semanage_file_type_args(&legacy, FileTypeCode::All),
            vec!["-f", ""]
        );
        assert_eq!(
            semanage_file_type_args(&legacy, FileTypeCode::Regular),
            vec!["-f", "--"]
        );
        assert_eq!(
            semanage_file_type_args(&legacy, FileTypeCode::Directory),
            vec!["-f", "-d"]
        );
    }

    #[test]
    fn test_modern_flag_matrix() {
        for platform in [
            Platform::new("rhel", "7.9.2009"),
            Platform::new("rhel", "9.3"),
            Platform::new("debian", "6.0"),
            Platform::new("fedora", "40"),
        ] {
            assert_eq!(
                semanage_file_type_args(&platform, FileTypeCode::Directory),
                vec!["-f", "d"]
            );
            assert_eq!(
                semanage_file_type_args(&platform, FileTypeCode::All),
                vec!["-f", "a"]
            );
        }
    }

    #[test]
    fn test_os_release_parsing() {
        let centos6 = "NAME=\"CentOS Linux\"\nID=\"centos\"\nID_LIKE=\"rhel fedora\"\nVERSION_ID=\"6.10\"\n";
        let platform = Platform::from_os_release(centos6);
        assert_eq!(platform, Platform::new("rhel", "6.10"));
        assert!(platform.legacy_semanage_flags());

        let rhel9 = "ID=\"rhel\"\nID_LIKE=\"fedora\"\nVERSION_ID=\"9.3\"\n";
        assert!(!Platform::from_os_release(rhel9).legacy_semanage_flags());

        let unknown = Platform::from_os_release("");
        assert_eq!(unknown, Platform::new("", ""));
        assert!(!unknown.legacy_semanage_flags());
    }
}
