use jdelta_diff::IdentityRules;
use jdelta_patch::PatchConfig;
use jdelta_types::{Change, Changeset, FlatChange, Value};
use tracing::debug;

use crate::error::SdkResult;

/// Identity rules and patch settings bundled for repeated use.
///
/// ```ignore
/// let delta = Delta::new().with_rules(IdentityRules::new().field("people", "id"));
/// let changes = delta.diff(&old, &new);
/// let restored = delta.reverted(&new, &changes)?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct Delta {
    rules: IdentityRules,
    config: PatchConfig,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, rules: IdentityRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_config(mut self, config: PatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Fail on missing elements instead of skipping them.
    pub fn strict(self) -> Self {
        self.with_config(PatchConfig::strict())
    }

    pub fn rules(&self) -> &IdentityRules {
        &self.rules
    }

    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    // ---- Diff ----

    pub fn diff(&self, old: &Value, new: &Value) -> Changeset {
        let changes = jdelta_diff::diff(old, new, &self.rules);
        debug!(nodes = changes.len(), rules = self.rules.len(), "computed changeset");
        changes
    }

    /// Diff and flatten in one step.
    pub fn diff_flat(&self, old: &Value, new: &Value) -> Vec<FlatChange> {
        jdelta_path::flatten(&self.diff(old, new))
    }

    // ---- Patch ----

    pub fn apply(&self, target: &mut Value, changes: &[Change]) -> SdkResult<()> {
        jdelta_patch::apply_with(target, changes, &self.config)?;
        Ok(())
    }

    pub fn revert(&self, target: &mut Value, changes: &[Change]) -> SdkResult<()> {
        jdelta_patch::revert_with(target, changes, &self.config)?;
        Ok(())
    }

    pub fn applied(&self, target: &Value, changes: &[Change]) -> SdkResult<Value> {
        crate::ops::applied(target, changes, &self.config)
    }

    pub fn reverted(&self, target: &Value, changes: &[Change]) -> SdkResult<Value> {
        crate::ops::reverted(target, changes, &self.config)
    }

    /// Rebuild flat entries and apply them to `target`.
    pub fn apply_flat(&self, target: &mut Value, entries: &[FlatChange]) -> SdkResult<()> {
        let changes = jdelta_path::unflatten(entries)?;
        self.apply(target, &changes)
    }
}
