use std::fs;
use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use jdelta_sdk::IdentityRules;
use serde::{Deserialize, Serialize};

/// Identity rules as written in a TOML rules file.
///
/// ```toml
/// [identity]
/// "." = "id"
/// "children" = "name"
///
/// [patterns]
/// "^items\\..*" = "sku"
/// ```
///
/// `identity` maps exact key paths to the identity field; `patterns` maps
/// regular expressions over key paths, tried in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesFile {
    #[serde(default)]
    pub identity: IndexMap<String, String>,
    #[serde(default)]
    pub patterns: IndexMap<String, String>,
}

impl RulesFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read rules file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid rules file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn into_rules(self) -> anyhow::Result<IdentityRules> {
        let mut rules = IdentityRules::new();
        for (path, field) in self.identity {
            rules = rules.field(path, field);
        }
        for (pattern, field) in self.patterns {
            rules = rules.pattern(&pattern, field)?;
        }
        Ok(rules)
    }
}
