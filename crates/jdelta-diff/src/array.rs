//! Array matcher: turns arrays into keyed members so that elements are
//! compared by identity instead of position.

use jdelta_types::{Change, Value};
use tracing::{debug, warn};

use crate::compare::{Comparator, Members};
use crate::identity::{key_path_string, IdentityStrategy};

/// Identity used for elements the strategy cannot key.
const MISSING_IDENTITY: &str = "undefined";

/// Key every element of `items` by `strategy`.
///
/// Positional keys are the decimal index. Resolver keys are the element's
/// rendered identity; when two elements share one, the later element
/// replaces the earlier and keeps the earlier slot in iteration order.
pub fn index_elements<'v>(items: &'v [Value], strategy: &IdentityStrategy) -> Members<'v> {
    match strategy {
        IdentityStrategy::Index => items
            .iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), item))
            .collect(),
        IdentityStrategy::Resolver(resolver) => {
            let mut members = Members::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let identity = resolver.resolve(item).unwrap_or_else(|| {
                    warn!(index, key = resolver.key_name(), "array element has no identity");
                    MISSING_IDENTITY.to_string()
                });
                if members.insert(identity.clone(), item).is_some() {
                    warn!(
                        %identity,
                        key = resolver.key_name(),
                        "duplicate array identity; later element wins"
                    );
                }
            }
            members
        }
    }
}

impl Comparator<'_> {
    /// Compare two arrays; yields at most one branch node carrying the
    /// resolved embedded key.
    ///
    /// Arrays that only differ by element order under an identity rule
    /// produce no changes.
    pub(crate) fn compare_array(
        &self,
        old: &[Value],
        new: &[Value],
        key: &str,
        key_path: &mut Vec<String>,
    ) -> Vec<Change> {
        let path = key_path_string(key_path);
        let strategy = self.rules.lookup(&path);
        debug!(%path, strategy = ?strategy, "matching array elements");

        let old_members = index_elements(old, &strategy);
        let new_members = index_elements(new, &strategy);
        let diffs = self.compare_members(&old_members, &new_members, key_path, false);
        if diffs.is_empty() {
            return Vec::new();
        }
        vec![Change::array_branch(key, strategy.embedded_key(), diffs)]
    }
}
