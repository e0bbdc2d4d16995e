//! In-memory rule graph.
//!
//! Maps target names to [`Rule`]s and remembers which target is built when
//! none is requested. The default target is stored by name and resolved by
//! lookup, so it can never dangle. Iteration follows insertion order.

mod dump;
mod rule;

pub use rule::Rule;

use indexmap::IndexMap;

/// Name of the pseudo-target whose dependencies are phony.
pub const PHONY_TARGET: &str = ".PHONY";

/// Mapping from target name to [`Rule`] plus the default target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleGraph {
    rules: IndexMap<String, Rule>,
    default_target: Option<String>,
}

impl RuleGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule for `target`, created empty on first reference.
    pub fn entry(&mut self, target: &str) -> &mut Rule {
        self.rules.entry(target.to_owned()).or_default()
    }

    /// Insert or replace the rule for `target`.
    pub fn insert(&mut self, target: impl Into<String>, rule: Rule) {
        self.rules.insert(target.into(), rule);
    }

    /// Look up the rule for `target`.
    #[must_use]
    pub fn get(&self, target: &str) -> Option<&Rule> {
        self.rules.get(target)
    }

    /// Mutable lookup of the rule for `target`.
    pub fn get_mut(&mut self, target: &str) -> Option<&mut Rule> {
        self.rules.get_mut(target)
    }

    /// Whether a rule exists for `target`.
    #[must_use]
    pub fn contains(&self, target: &str) -> bool {
        self.rules.contains_key(target)
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the graph has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over `(target, rule)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Name of the default target, if one has been designated.
    #[must_use]
    pub fn default_target(&self) -> Option<&str> {
        self.default_target
            .as_deref()
            .filter(|name| self.rules.contains_key(*name))
    }

    /// Designate `target` as the default unless one is already set.
    ///
    /// Returns `true` when the designation took effect. `target` must already
    /// have a rule and must not be [`PHONY_TARGET`].
    pub fn set_default_target(&mut self, target: &str) -> bool {
        if self.default_target().is_some()
            || target == PHONY_TARGET
            || !self.rules.contains_key(target)
        {
            return false;
        }
        self.default_target = Some(target.to_owned());
        true
    }

    /// Iterate with the default target first, then the rest in order.
    pub fn iter_default_first(&self) -> impl Iterator<Item = (&str, &Rule)> {
        let default = self.default_target();
        let head = default.and_then(|name| self.get(name).map(|rule| (name, rule)));
        head.into_iter()
            .chain(self.iter().filter(move |(name, _)| Some(*name) != default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_target_is_set_once() {
        let mut graph = RuleGraph::new();
        graph.entry("a");
        graph.entry("b");
        assert!(graph.set_default_target("a"));
        assert!(!graph.set_default_target("b"));
        assert_eq!(graph.default_target(), Some("a"));
    }

    #[test]
    fn default_target_requires_live_entry() {
        let mut graph = RuleGraph::new();
        assert!(!graph.set_default_target("ghost"));
        graph.entry(PHONY_TARGET);
        assert!(!graph.set_default_target(PHONY_TARGET));
        assert_eq!(graph.default_target(), None);
    }

    #[test]
    fn default_first_iteration() {
        let mut graph = RuleGraph::new();
        for name in ["x", "y", "z"] {
            graph.entry(name);
        }
        graph.set_default_target("y");
        let order: Vec<&str> = graph.iter_default_first().map(|(name, _)| name).collect();
        assert_eq!(order, ["y", "x", "z"]);
    }
}
