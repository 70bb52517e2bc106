//! External tool seams.
//!
//! The policy store and the relabel pass are owned by the system tools
//! semanage and restorecon. This module wraps them behind traits so the
//! reconciler stays testable on hosts without a policy store, and so a
//! failing tool surfaces as a typed error that aborts the reconciliation.

use std::path::Path;
use std::process::{Command, ExitStatus, Output};

use anyhow::Result;
use log::debug;
use thiserror::Error;

use crate::constants::{GETENFORCE_BIN, RESTORECON_BIN, SELINUX_FS, SEMANAGE_BIN};

/// Failure of an external tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool ran and reported a non-success exit status.
    #[error("{tool} failed ({status}): {stderr}")]
    Failed {
        /// Tool name
        tool: &'static str,
        /// Exit status reported by the tool
        status: ExitStatus,
        /// Captured standard error
        stderr: String,
    },
    /// The tool could not be spawned at all.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        /// Tool name
        tool: &'static str,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },
}

/// Policy store mutator and oracle (`semanage fcontext`).
pub trait PolicyStoreTool {
    /// Textual dump of all registered mappings, one per line.
    fn list(&self) -> Result<String>;
    /// Register a new mapping.
    fn add(&self, path_spec: &str, file_type_args: &[String], security_type: &str) -> Result<()>;
    /// Update the context type of an existing mapping.
    fn modify(&self, path_spec: &str, file_type_args: &[String], security_type: &str)
        -> Result<()>;
    /// Remove a registered mapping.
    fn delete(&self, path_spec: &str, file_type_args: &[String]) -> Result<()>;
}

impl<T: PolicyStoreTool + ?Sized> PolicyStoreTool for &T {
    fn list(&self) -> Result<String> {
        (**self).list()
    }
    fn add(&self, path_spec: &str, file_type_args: &[String], security_type: &str) -> Result<()> {
        (**self).add(path_spec, file_type_args, security_type)
    }
    fn modify(
        &self,
        path_spec: &str,
        file_type_args: &[String],
        security_type: &str,
    ) -> Result<()> {
        (**self).modify(path_spec, file_type_args, security_type)
    }
    fn delete(&self, path_spec: &str, file_type_args: &[String]) -> Result<()> {
        (**self).delete(path_spec, file_type_args)
    }
}

/// On-disk label restoration (`restorecon`).
pub trait RelabelTool {
    /// Restore labels at `path`, recursively when asked.
    fn restore(&self, path: &Path, recursive: bool) -> Result<()>;
}

impl<T: RelabelTool + ?Sized> RelabelTool for &T {
    fn restore(&self, path: &Path, recursive: bool) -> Result<()> {
        (**self).restore(path, recursive)
    }
}

/// Whether the kernel currently enforces SELinux. Gates every mutation.
pub trait EnforcementProbe {
    /// True when SELinux is enforcing or permissive.
    fn selinux_active(&self) -> bool;
}

impl<T: EnforcementProbe + ?Sized> EnforcementProbe for &T {
    fn selinux_active(&self) -> bool {
        (**self).selinux_active()
    }
}

fn run_checked(tool: &'static str, output: std::io::Result<Output>) -> Result<Output> {
    let output = output.map_err(|source| ToolError::Spawn { tool, source })?;
    if !output.status.success() {
        return Err(ToolError::Failed {
            tool,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into());
    }
    Ok(output)
}

fn mutation_args(
    action_flag: &str,
    path_spec: &str,
    file_type_args: &[String],
    security_type: Option<&str>,
) -> Vec<String> {
    let mut args = vec!["fcontext".to_string()];
    match security_type {
        // add/modify: semanage fcontext -a|-m <ftype flags> -t <type> <spec>
        Some(sectype) => {
            args.push(action_flag.to_string());
            args.extend(file_type_args.iter().cloned());
            args.push("-t".to_string());
            args.push(sectype.to_string());
        }
        // delete: semanage fcontext <ftype flags> -d <spec>
        None => {
            args.extend(file_type_args.iter().cloned());
            args.push(action_flag.to_string());
        }
    }
    args.push(path_spec.to_string());
    args
}

/// The real semanage binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct Semanage;

impl Semanage {
    fn run(&self, args: &[String]) -> Result<()> {
        debug!("{} {}", SEMANAGE_BIN, shell_words::join(args));
        run_checked("semanage", Command::new(SEMANAGE_BIN).args(args).output())?;
        Ok(())
    }
}

impl PolicyStoreTool for Semanage {
    fn list(&self) -> Result<String> {
        let output = run_checked(
            "semanage",
            Command::new(SEMANAGE_BIN).args(["fcontext", "-l"]).output(),
        )?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn add(&self, path_spec: &str, file_type_args: &[String], security_type: &str) -> Result<()> {
        self.run(&mutation_args("-a", path_spec, file_type_args, Some(security_type)))
    }

    fn modify(
        &self,
        path_spec: &str,
        file_type_args: &[String],
        security_type: &str,
    ) -> Result<()> {
        self.run(&mutation_args("-m", path_spec, file_type_args, Some(security_type)))
    }

    fn delete(&self, path_spec: &str, file_type_args: &[String]) -> Result<()> {
        self.run(&mutation_args("-d", path_spec, file_type_args, None))
    }
}

/// The real restorecon binary. Always passes `-i` to skip missing files.
#[derive(Debug, Default, Clone, Copy)]
pub struct Restorecon;

impl RelabelTool for Restorecon {
    fn restore(&self, path: &Path, recursive: bool) -> Result<()> {
        let mut cmd = Command::new(RESTORECON_BIN);
        cmd.arg("-i");
        if recursive {
            cmd.arg("-R");
        }
        cmd.arg(path);
        debug!(
            "{} {}",
            RESTORECON_BIN,
            shell_words::quote(&path.to_string_lossy())
        );
        run_checked("restorecon", cmd.output())?;
        Ok(())
    }
}

/// Live-kernel enforcement probe: selinuxfs must be mounted and getenforce
/// must report Enforcing or Permissive.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostEnforcement;

impl EnforcementProbe for HostEnforcement {
    fn selinux_active(&self) -> bool {
        if !Path::new(SELINUX_FS).exists() {
            return false;
        }
        match Command::new(GETENFORCE_BIN).output() {
            Ok(output) if output.status.success() => {
                let mode = String::from_utf8_lossy(&output.stdout).to_ascii_lowercase();
                mode.contains("enforcing") || mode.contains("permissive")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_add_args() {
        let args = mutation_args(
            "-a",
            "/srv/app(/.*)?",
            &flags(&["-f", "d"]),
            Some("httpd_sys_content_t"),
        );
        assert_eq!(
            args,
            flags(&[
                "fcontext",
                "-a",
                "-f",
                "d",
                "-t",
                "httpd_sys_content_t",
                "/srv/app(/.*)?",
            ])
        );
    }

    #[test]
    fn test_delete_args_omit_type() {
        let args = mutation_args("-d", "/srv/app(/.*)?", &flags(&["-f", "d"]), None);
        assert_eq!(args, flags(&["fcontext", "-f", "d", "-d", "/srv/app(/.*)?"]));
    }

    #[test]
    fn test_legacy_empty_flag_survives_rendering() {
        // The legacy `a` form carries an empty argv element; shell rendering
        // must keep it visible as ''.
        let args = mutation_args("-a", "/srv", &flags(&["-f", ""]), Some("var_t"));
        let rendered = shell_words::join(args.iter().map(String::as_str));
        assert!(rendered.contains("-f ''"), "rendered: {rendered}");
    }
}
