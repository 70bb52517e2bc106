//! fcontext mapping data model.
//!
//! A mapping associates a filesystem path (or regex path pattern) and a file
//! type with a target SELinux context type. Mappings are transient request
//! values; the persistent state lives in the semanage policy store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::{SERANGE, SEROLE, SEUSER};

/// Error raised when a file-type letter code is not one semanage knows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown file type code '{0}' (expected one of a, f, d, c, b, s, l, p)")]
pub struct UnknownFileType(pub String);

/// File type selectors understood by `semanage fcontext`.
///
/// Each carries a single-letter wire code used on the command line and the
/// human-readable label printed by `semanage fcontext -l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileTypeCode {
    /// All file types
    #[serde(rename = "a")]
    All,
    /// Regular file
    #[serde(rename = "f")]
    Regular,
    /// Directory
    #[serde(rename = "d")]
    Directory,
    /// Character device
    #[serde(rename = "c")]
    CharDevice,
    /// Block device
    #[serde(rename = "b")]
    BlockDevice,
    /// Unix socket
    #[serde(rename = "s")]
    Socket,
    /// Symbolic link
    #[serde(rename = "l")]
    Symlink,
    /// Named pipe (FIFO)
    #[serde(rename = "p")]
    NamedPipe,
}

impl FileTypeCode {
    /// Single-letter code used in semanage command lines.
    pub fn code(&self) -> char {
        match self {
            FileTypeCode::All => 'a',
            FileTypeCode::Regular => 'f',
            FileTypeCode::Directory => 'd',
            FileTypeCode::CharDevice => 'c',
            FileTypeCode::BlockDevice => 'b',
            FileTypeCode::Socket => 's',
            FileTypeCode::Symlink => 'l',
            FileTypeCode::NamedPipe => 'p',
        }
    }

    /// Label this type carries in `semanage fcontext -l` output.
    pub fn label(&self) -> &'static str {
        match self {
            FileTypeCode::All => "all files",
            FileTypeCode::Regular => "regular file",
            FileTypeCode::Directory => "directory",
            FileTypeCode::CharDevice => "character device",
            FileTypeCode::BlockDevice => "block device",
            FileTypeCode::Socket => "socket",
            FileTypeCode::Symlink => "symbolic link",
            FileTypeCode::NamedPipe => "named pipe",
        }
    }

    /// Parse from the single-letter wire code.
    pub fn from_code(code: char) -> Result<Self, UnknownFileType> {
        match code {
            'a' => Ok(FileTypeCode::All),
            'f' => Ok(FileTypeCode::Regular),
            'd' => Ok(FileTypeCode::Directory),
            'c' => Ok(FileTypeCode::CharDevice),
            'b' => Ok(FileTypeCode::BlockDevice),
            's' => Ok(FileTypeCode::Socket),
            'l' => Ok(FileTypeCode::Symlink),
            'p' => Ok(FileTypeCode::NamedPipe),
            other => Err(UnknownFileType(other.to_string())),
        }
    }
}

impl fmt::Display for FileTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for FileTypeCode {
    type Err = UnknownFileType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => FileTypeCode::from_code(c),
            _ => Err(UnknownFileType(s.to_string())),
        }
    }
}

/// A desired fcontext mapping: path spec plus file type plus context type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMapping {
    /// Literal path or regex path pattern, e.g. `/srv/app(/.*)?`
    pub path_spec: String,
    /// File type the mapping applies to
    pub file_type: FileTypeCode,
    /// Target context type, e.g. `httpd_sys_content_t`
    pub security_type: String,
}

impl ContextMapping {
    /// Build a mapping request.
    pub fn new(
        path_spec: impl Into<String>,
        file_type: FileTypeCode,
        security_type: impl Into<String>,
    ) -> Self {
        Self {
            path_spec: path_spec.into(),
            file_type,
            security_type: security_type.into(),
        }
    }

    /// Full context string as it appears in policy dumps,
    /// e.g. `system_u:object_r:httpd_sys_content_t:s0`.
    pub fn context_string(&self) -> String {
        format!("{SEUSER}:{SEROLE}:{}:{SERANGE}", self.security_type)
    }
}

impl fmt::Display for ContextMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] -> {}",
            self.path_spec,
            self.file_type.label(),
            self.security_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for code in ['a', 'f', 'd', 'c', 'b', 's', 'l', 'p'] {
            let ft = FileTypeCode::from_code(code).unwrap();
            assert_eq!(ft.code(), code);
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!(FileTypeCode::from_code('x').is_err());
        assert!("fd".parse::<FileTypeCode>().is_err());
        assert!("".parse::<FileTypeCode>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(FileTypeCode::All.label(), "all files");
        assert_eq!(FileTypeCode::Directory.label(), "directory");
        assert_eq!(FileTypeCode::Symlink.label(), "symbolic link");
    }

    #[test]
    fn test_serde_uses_letter_codes() {
        let mapping = ContextMapping::new("/srv", FileTypeCode::Regular, "var_t");
        let json = serde_json::to_string(&mapping).unwrap();
        assert!(json.contains("\"file_type\":\"f\""), "json: {json}");
        let back: ContextMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mapping);
    }

    #[test]
    fn test_context_string() {
        let mapping = ContextMapping::new(
            "/srv/app(/.*)?",
            FileTypeCode::Directory,
            "httpd_sys_content_t",
        );
        assert_eq!(
            mapping.context_string(),
            "system_u:object_r:httpd_sys_content_t:s0"
        );
    }
}
