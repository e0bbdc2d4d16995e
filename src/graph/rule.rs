//! A single build rule.

use std::collections::HashSet;

/// Phony flag, dependencies and commands for one target.
///
/// Dependencies are ordered and unique. The sequence and its membership set
/// are only changed together, through [`Rule::push_dep`] and
/// [`Rule::push_implicit_dep`].
#[derive(Debug, Clone, Default)]
pub struct Rule {
    /// Target does not name a real file.
    pub phony: bool,
    /// Shell command lines, run in order.
    pub commands: Vec<String>,
    implicit_dep: bool,
    deps: Vec<String>,
    dep_set: HashSet<String>,
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.phony == other.phony
            && self.implicit_dep == other.implicit_dep
            && self.deps == other.deps
            && self.commands == other.commands
    }
}

impl Eq for Rule {}

impl Rule {
    /// Assemble a rule from stored parts, dropping repeated dependencies.
    ///
    /// Returns `None` when `implicit_dep` is set without any dependency to
    /// back it.
    #[must_use]
    pub fn from_parts(
        phony: bool,
        implicit_dep: bool,
        deps: impl IntoIterator<Item = String>,
        commands: Vec<String>,
    ) -> Option<Self> {
        let mut rule = Self {
            phony,
            commands,
            ..Self::default()
        };
        for dep in deps {
            rule.push_dep(dep);
        }
        if implicit_dep && rule.deps.is_empty() {
            return None;
        }
        rule.implicit_dep = implicit_dep;
        Some(rule)
    }

    /// Dependencies in declaration order, implicit one first.
    #[must_use]
    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    /// Whether the leading dependency was inferred rather than declared.
    #[must_use]
    pub const fn implicit_dep(&self) -> bool {
        self.implicit_dep
    }

    /// Append `dep` unless it is already present.
    ///
    /// Returns `true` when the dependency was added.
    pub fn push_dep(&mut self, dep: impl Into<String>) -> bool {
        let dep = dep.into();
        if self.dep_set.contains(&dep) {
            return false;
        }
        self.dep_set.insert(dep.clone());
        self.deps.push(dep);
        true
    }

    /// Insert `dep` as the first dependency and mark it implicit.
    ///
    /// A dependency that is already present is left where it is and the
    /// implicit flag is not touched.
    ///
    /// # Examples
    ///
    /// ```
    /// use mymake::graph::Rule;
    /// let mut rule = Rule::default();
    /// rule.push_dep("util.o");
    /// assert!(rule.push_implicit_dep("main.o"));
    /// assert_eq!(rule.deps(), ["main.o", "util.o"]);
    /// assert!(rule.implicit_dep());
    /// ```
    pub fn push_implicit_dep(&mut self, dep: impl Into<String>) -> bool {
        let dep = dep.into();
        if self.dep_set.contains(&dep) {
            return false;
        }
        self.dep_set.insert(dep.clone());
        self.deps.insert(0, dep);
        self.implicit_dep = true;
        true
    }
}
