//! Variable table and `$(NAME)` expansion.
//!
//! The table is seeded with the compiler defaults (`CC=cc`, `CXX=c++`).
//! Expansion rescans from the start after every substitution so values that
//! themselves contain references are expanded too. Self-referential values are
//! bounded by [`MAX_EXPANSIONS`].

use std::collections::HashMap;

/// Upper bound on substitutions performed by a single [`VariableTable::expand`].
pub const MAX_EXPANSIONS: usize = 1024;

/// Name/value bindings used while parsing a rule file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableTable {
    values: HashMap<String, String>,
}

impl Default for VariableTable {
    fn default() -> Self {
        let mut table = Self {
            values: HashMap::new(),
        };
        table.define("CC", "cc");
        table.define("CXX", "c++");
        table
    }
}

impl VariableTable {
    /// Create a table holding only the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the binding for `name`.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Value bound to `name`, or the empty string when unbound.
    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map_or("", String::as_str)
    }

    /// Replace every `$(NAME)` token in `text` with its bound value.
    ///
    /// Unbound names expand to nothing. An unterminated `$(` is left as is.
    ///
    /// # Examples
    ///
    /// ```
    /// use mymake::vars::VariableTable;
    /// let mut vars = VariableTable::new();
    /// vars.define("FLAGS", "-O2 $(EXTRA)");
    /// vars.define("EXTRA", "-g");
    /// assert_eq!(vars.expand("$(CXX) $(FLAGS)"), "c++ -O2 -g");
    /// assert_eq!(vars.expand("$(UNSET)x"), "x");
    /// ```
    #[must_use]
    pub fn expand(&self, text: &str) -> String {
        let mut expanded = text.to_owned();
        for _ in 0..MAX_EXPANSIONS {
            let Some((start, end, name)) = find_reference(&expanded) else {
                return expanded;
            };
            let value = self.get(name).to_owned();
            expanded.replace_range(start..end, &value);
        }
        tracing::debug!(text, "variable expansion limit reached");
        expanded
    }
}

/// Locate the first `$(NAME)` token, returning its byte range and the name.
fn find_reference(text: &str) -> Option<(usize, usize, &str)> {
    let start = text.find("$(")?;
    let rest = text.get(start + 2..)?;
    let close = rest.find(')')?;
    let name = rest.get(..close)?;
    Some((start, start + 2 + close + 1, name))
}
