//! Relabel path resolution.
//!
//! fcontext path specs are often regex patterns (`/var/www(/.*)?`) rather
//! than literal paths, so restorecon cannot be pointed at them directly.
//! This module resolves the concrete filesystem root a relabel pass should
//! start from.

use std::path::{Path, PathBuf};

/// Filesystem queries needed by the ascent search. Seam for tests.
pub trait FsProbe {
    /// Whether the path exists at all.
    fn exists(&self, path: &Path) -> bool;
    /// Whether the path is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;
}

impl<T: FsProbe + ?Sized> FsProbe for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }
    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }
}

/// Probe backed by the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFs;

impl FsProbe for HostFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Where a relabel pass starts and whether it must recurse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelabelTarget {
    /// Existing path to hand to restorecon.
    pub root: PathBuf,
    /// True when the spec was a pattern and an ancestor directory was chosen.
    pub recursive: bool,
}

/// Resolve the restorecon root for a path spec.
///
/// A spec naming an existing path is restored in place, non-recursively.
/// Otherwise the spec is treated as a pattern: walk up one parent at a time
/// until an existing directory is found, then restore recursively from
/// there. The walk is bounded by the spec's separator count, so pathological
/// specs (no separators, nothing real on disk) cannot loop forever.
pub fn relabel_target(probe: &impl FsProbe, path_spec: &str) -> RelabelTarget {
    let cleaned = path_spec.trim_start_matches('\\');
    if probe.exists(Path::new(cleaned)) {
        return RelabelTarget {
            root: PathBuf::from(cleaned),
            recursive: false,
        };
    }

    let mut current = PathBuf::from(cleaned);
    for _ in 0..cleaned.matches('/').count() {
        current = match current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => break,
        };
        if probe.is_dir(&current) {
            break;
        }
    }
    RelabelTarget {
        root: current,
        recursive: true,
    }
}
