use serde::{Deserialize, Serialize};

/// What to do when a change addresses an element the target no longer has.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Log a warning and skip the change; the rest of the changeset still applies.
    #[default]
    Warn,
    /// Abort with [`PatchError::MissingElement`](crate::PatchError::MissingElement).
    Fail,
}

/// Configuration for applying and reverting changesets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchConfig {
    /// Policy for removals and descents that find nothing to act on.
    #[serde(default)]
    pub on_missing: MissingPolicy,
}

impl PatchConfig {
    /// Fail on the first missing element instead of skipping it.
    ///
    /// Suits targets that are known to be exactly the diffed value; the
    /// default tolerates partially stale targets.
    pub fn strict() -> Self {
        Self {
            on_missing: MissingPolicy::Fail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_lenient() {
        assert_eq!(PatchConfig::default().on_missing, MissingPolicy::Warn);
        assert_eq!(PatchConfig::strict().on_missing, MissingPolicy::Fail);
    }

    #[test]
    fn deserializes_from_partial_input() {
        let config: PatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PatchConfig::default());
        let strict: PatchConfig = serde_json::from_str(r#"{"on_missing":"fail"}"#).unwrap();
        assert_eq!(strict, PatchConfig::strict());
    }
}
