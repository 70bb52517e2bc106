//! Global constants for sefcontext
//!
//! Tool paths and fixed SELinux context components used throughout the crate.

// ============================================================================
// System Tools
// ============================================================================

/// Policy management tool, invoked by absolute path
pub const SEMANAGE_BIN: &str = "/usr/sbin/semanage";

/// Label restoration tool
pub const RESTORECON_BIN: &str = "restorecon";

/// Enforcement mode query tool
pub const GETENFORCE_BIN: &str = "getenforce";

// ============================================================================
// Host Probing
// ============================================================================

/// selinuxfs mount point; absent when the kernel has no SELinux support
pub const SELINUX_FS: &str = "/sys/fs/selinux";

/// File consulted for platform family and version
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

// ============================================================================
// Context Components
// ============================================================================

/// SELinux user component of managed file contexts
pub const SEUSER: &str = "system_u";

/// Role component of managed file contexts
pub const SEROLE: &str = "object_r";

/// MLS range component of managed file contexts
pub const SERANGE: &str = "s0";
