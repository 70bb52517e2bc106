//! Idempotent fcontext reconciliation.
//!
//! Each operation re-reads the policy store, decides between add, modify,
//! delete and no-op, performs at most one mutation, and relabels the
//! affected paths only when the store actually changed. SELinux being
//! inactive turns every operation into a silent no-op.

use anyhow::Result;
use log::{debug, info};

use crate::mapping::ContextMapping;
use crate::platform::{semanage_file_type_args, Platform};
use crate::query::PolicyQuery;
use crate::relabel::{relabel_target, FsProbe};
use crate::tools::{EnforcementProbe, PolicyStoreTool, RelabelTool};

/// What a reconciliation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A mutation ran and the affected paths were relabeled.
    Changed,
    /// Desired state already held, or SELinux is inactive.
    Unchanged,
}

impl Outcome {
    /// True when the call mutated the policy store.
    pub fn changed(self) -> bool {
        matches!(self, Outcome::Changed)
    }
}

/// Reconciles desired fcontext mappings against the semanage policy store.
///
/// All collaborators are injected, so every decision is a pure function of
/// the mapping, the platform, the enforcement flag and the current store
/// dump. Nothing is cached between calls.
pub struct ContextReconciler<S, R, F, E> {
    store: S,
    relabeler: R,
    fs: F,
    enforcement: E,
    platform: Platform,
}

impl<S, R, F, E> ContextReconciler<S, R, F, E>
where
    S: PolicyStoreTool,
    R: RelabelTool,
    F: FsProbe,
    E: EnforcementProbe,
{
    /// Build a reconciler from its collaborators.
    pub fn new(store: S, relabeler: R, fs: F, enforcement: E, platform: Platform) -> Self {
        Self {
            store,
            relabeler,
            fs,
            enforcement,
            platform,
        }
    }

    /// Whether the store currently has a matching mapping. `exact` includes
    /// the desired context type in the match; otherwise any registered type
    /// for the path/file-type counts.
    fn registered(&self, mapping: &ContextMapping, exact: bool) -> Result<bool> {
        let query = PolicyQuery::new(
            &mapping.path_spec,
            mapping.file_type,
            exact.then_some(mapping.security_type.as_str()),
        )?;
        let dump = self.store.list()?;
        Ok(query.matches(&dump))
    }

    fn file_type_args(&self, mapping: &ContextMapping) -> Vec<String> {
        semanage_file_type_args(&self.platform, mapping.file_type)
    }

    /// Register the mapping unless some mapping already covers the
    /// path/file-type. Never overwrites an existing entry, even a wrong one.
    pub fn add(&self, mapping: &ContextMapping) -> Result<Outcome> {
        if !self.enforcement.selinux_active() {
            debug!("selinux inactive, skipping add of {mapping}");
            return Ok(Outcome::Unchanged);
        }
        if self.registered(mapping, false)? {
            debug!("fcontext already registered for {}", mapping.path_spec);
            return Ok(Outcome::Unchanged);
        }
        self.store
            .add(&mapping.path_spec, &self.file_type_args(mapping), &mapping.security_type)?;
        info!("added fcontext {mapping}");
        self.relabel(&mapping.path_spec)?;
        Ok(Outcome::Changed)
    }

    /// Update a present-but-different mapping to the desired context type.
    /// Never creates; a missing or already-correct mapping is a no-op.
    pub fn modify(&self, mapping: &ContextMapping) -> Result<Outcome> {
        if !self.enforcement.selinux_active() {
            debug!("selinux inactive, skipping modify of {mapping}");
            return Ok(Outcome::Unchanged);
        }
        // Compare-and-swap: something must be registered for the path, and
        // it must not already be the desired triple.
        if !self.registered(mapping, false)? || self.registered(mapping, true)? {
            debug!("no modify needed for {}", mapping.path_spec);
            return Ok(Outcome::Unchanged);
        }
        self.store
            .modify(&mapping.path_spec, &self.file_type_args(mapping), &mapping.security_type)?;
        info!("modified fcontext {mapping}");
        self.relabel(&mapping.path_spec)?;
        Ok(Outcome::Changed)
    }

    /// Remove the mapping when the exact triple is registered.
    pub fn delete(&self, mapping: &ContextMapping) -> Result<Outcome> {
        if !self.enforcement.selinux_active() {
            debug!("selinux inactive, skipping delete of {mapping}");
            return Ok(Outcome::Unchanged);
        }
        if !self.registered(mapping, true)? {
            debug!("fcontext not registered, nothing to delete for {}", mapping.path_spec);
            return Ok(Outcome::Unchanged);
        }
        self.store
            .delete(&mapping.path_spec, &self.file_type_args(mapping))?;
        info!("deleted fcontext {mapping}");
        self.relabel(&mapping.path_spec)?;
        Ok(Outcome::Changed)
    }

    /// Create the mapping if absent, correct it if wrong, leave it alone if
    /// already right. Add then modify, each independently idempotent.
    pub fn add_or_modify(&self, mapping: &ContextMapping) -> Result<Outcome> {
        let added = self.add(mapping)?;
        let modified = self.modify(mapping)?;
        Ok(if added.changed() || modified.changed() {
            Outcome::Changed
        } else {
            Outcome::Unchanged
        })
    }

    /// Run a relabel pass for a path spec without touching the store.
    pub fn relabel(&self, path_spec: &str) -> Result<()> {
        let target = relabel_target(&self.fs, path_spec);
        self.relabeler.restore(&target.root, target.recursive)
    }
}
