//! Identity rules: how array elements are matched across versions.
//!
//! A rule maps a dotted key path (the object keys leading to an array,
//! without array positions) to an [`IdentityResolver`]. Paths are matched
//! exactly first, then against patterns in the order they were added.
//! Arrays without a matching rule are compared by position.
//!
//! Identity values must be unique within one array. Duplicates are not an
//! error: the later element wins and a warning is logged.

use std::fmt;
use std::sync::Arc;

use jdelta_types::{EmbeddedKey, Value};
use regex::Regex;

use crate::error::{DiffError, DiffResult};

/// Key path of the diffed value itself.
pub const ROOT_KEY_PATH: &str = ".";

/// Derives the identity of an array element.
pub trait IdentityResolver: Send + Sync {
    /// The field name recorded on the changeset, so that patching and path
    /// encoding can find elements again without the resolver.
    fn key_name(&self) -> &str;

    /// The element's identity, or `None` when it has none.
    fn resolve(&self, element: &Value) -> Option<String>;
}

/// Identity taken from a named object field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIdentity {
    field: String,
}

impl FieldIdentity {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl IdentityResolver for FieldIdentity {
    fn key_name(&self) -> &str {
        &self.field
    }

    fn resolve(&self, element: &Value) -> Option<String> {
        element
            .get(&self.field)
            .filter(|v| !v.is_undefined())
            .map(Value::identity_string)
    }
}

type ResolveFn = dyn Fn(&Value) -> Option<String> + Send + Sync;

/// Identity computed by a closure, recorded under `key_name`.
pub struct FnIdentity {
    key_name: String,
    resolve: Box<ResolveFn>,
}

impl FnIdentity {
    pub fn new<F>(key_name: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            key_name: key_name.into(),
            resolve: Box::new(resolve),
        }
    }
}

impl IdentityResolver for FnIdentity {
    fn key_name(&self) -> &str {
        &self.key_name
    }

    fn resolve(&self, element: &Value) -> Option<String> {
        (self.resolve)(element)
    }
}

impl fmt::Debug for FnIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnIdentity")
            .field("key_name", &self.key_name)
            .finish_non_exhaustive()
    }
}

/// The resolved way an array's elements are matched.
#[derive(Clone)]
pub enum IdentityStrategy {
    /// Match by position.
    Index,
    /// Match by a resolver-derived identity.
    Resolver(Arc<dyn IdentityResolver>),
}

impl IdentityStrategy {
    /// What the changeset records for this strategy.
    pub fn embedded_key(&self) -> EmbeddedKey {
        match self {
            IdentityStrategy::Index => EmbeddedKey::Index,
            IdentityStrategy::Resolver(r) => EmbeddedKey::Field(r.key_name().to_string()),
        }
    }
}

impl fmt::Debug for IdentityStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityStrategy::Index => f.write_str("Index"),
            IdentityStrategy::Resolver(r) => write!(f, "Resolver({:?})", r.key_name()),
        }
    }
}

#[derive(Clone)]
enum PathMatcher {
    Exact(String),
    Pattern(Regex),
}

impl PathMatcher {
    fn source(&self) -> &str {
        match self {
            PathMatcher::Exact(path) => path,
            PathMatcher::Pattern(re) => re.as_str(),
        }
    }
}

#[derive(Clone)]
struct Rule {
    matcher: PathMatcher,
    resolver: Arc<dyn IdentityResolver>,
}

/// Immutable-by-convention table of identity rules, supplied per diff.
#[derive(Clone, Default)]
pub struct IdentityRules {
    rules: Vec<Rule>,
}

impl IdentityRules {
    /// An empty table: every array is compared by position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match elements of the array at `path` by `field`.
    pub fn field(self, path: impl Into<String>, field: impl Into<String>) -> Self {
        self.resolver(path, Arc::new(FieldIdentity::new(field)))
    }

    /// Match elements of the array at `path` with a custom resolver.
    pub fn resolver(mut self, path: impl Into<String>, resolver: Arc<dyn IdentityResolver>) -> Self {
        self.rules.push(Rule {
            matcher: PathMatcher::Exact(path.into()),
            resolver,
        });
        self
    }

    /// Match elements of every array whose key path matches `pattern` by `field`.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` if `pattern` is not a valid regular expression.
    pub fn pattern(self, pattern: &str, field: impl Into<String>) -> DiffResult<Self> {
        self.pattern_resolver(pattern, Arc::new(FieldIdentity::new(field)))
    }

    /// Pattern rule with a custom resolver.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` if `pattern` is not a valid regular expression.
    pub fn pattern_resolver(
        mut self,
        pattern: &str,
        resolver: Arc<dyn IdentityResolver>,
    ) -> DiffResult<Self> {
        let re = Regex::new(pattern).map_err(|source| DiffError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.rules.push(Rule {
            matcher: PathMatcher::Pattern(re),
            resolver,
        });
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Resolve the strategy for the array at `key_path`.
    pub fn lookup(&self, key_path: &str) -> IdentityStrategy {
        let exact = self.rules.iter().find(|rule| match &rule.matcher {
            PathMatcher::Exact(path) => path == key_path,
            PathMatcher::Pattern(_) => false,
        });
        let matched = exact.or_else(|| {
            self.rules.iter().find(|rule| match &rule.matcher {
                PathMatcher::Exact(_) => false,
                PathMatcher::Pattern(re) => re.is_match(key_path),
            })
        });
        match matched {
            Some(rule) => IdentityStrategy::Resolver(Arc::clone(&rule.resolver)),
            None => IdentityStrategy::Index,
        }
    }
}

impl fmt::Debug for IdentityRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.rules
                    .iter()
                    .map(|rule| (rule.matcher.source(), rule.resolver.key_name())),
            )
            .finish()
    }
}

/// Join object keys into a rule lookup path.
pub(crate) fn key_path_string(keys: &[String]) -> String {
    if keys.is_empty() {
        ROOT_KEY_PATH.to_string()
    } else {
        keys.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key_name(strategy: &IdentityStrategy) -> Option<String> {
        match strategy {
            IdentityStrategy::Index => None,
            IdentityStrategy::Resolver(r) => Some(r.key_name().to_string()),
        }
    }

    #[test]
    fn empty_table_falls_back_to_index() {
        let rules = IdentityRules::new();
        assert!(matches!(rules.lookup("items"), IdentityStrategy::Index));
        assert_eq!(rules.lookup("items").embedded_key(), EmbeddedKey::Index);
    }

    #[test]
    fn exact_match_beats_earlier_pattern() {
        let rules = IdentityRules::new()
            .pattern("^items", "sku")
            .unwrap()
            .field("items", "id");
        assert_eq!(key_name(&rules.lookup("items")), Some("id".into()));
    }

    #[test]
    fn first_matching_pattern_wins() {
        let rules = IdentityRules::new()
            .pattern("children$", "name")
            .unwrap()
            .pattern(".*", "id")
            .unwrap();
        assert_eq!(key_name(&rules.lookup("a.children")), Some("name".into()));
        assert_eq!(key_name(&rules.lookup("a.other")), Some("id".into()));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = IdentityRules::new().pattern("(unclosed", "id").unwrap_err();
        assert!(matches!(err, DiffError::InvalidPattern { .. }));
    }

    #[test]
    fn field_identity_stringifies() {
        let id = FieldIdentity::new("id");
        assert_eq!(id.resolve(&Value::from(json!({"id": 7}))), Some("7".into()));
        assert_eq!(id.resolve(&Value::from(json!({"id": "x"}))), Some("x".into()));
        assert_eq!(id.resolve(&Value::from(json!({"other": 1}))), None);
        assert_eq!(id.resolve(&Value::from(json!(3))), None);
    }

    #[test]
    fn fn_identity_records_key_name() {
        let rules = IdentityRules::new().resolver(
            ".",
            Arc::new(FnIdentity::new("code", |v: &Value| {
                v.get("code").map(|c| c.identity_string().to_lowercase())
            })),
        );
        let strategy = rules.lookup(ROOT_KEY_PATH);
        assert_eq!(strategy.embedded_key(), EmbeddedKey::Field("code".into()));
    }

    #[test]
    fn key_path_joins_with_dots() {
        assert_eq!(key_path_string(&[]), ".");
        assert_eq!(key_path_string(&["a".into(), "b".into()]), "a.b");
    }
}
