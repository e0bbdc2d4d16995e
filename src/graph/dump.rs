//! Human-readable rendering of a [`RuleGraph`].

use std::fmt;

use super::{Rule, RuleGraph};

fn write_rule(f: &mut fmt::Formatter<'_>, target: &str, rule: &Rule) -> fmt::Result {
    if rule.phony {
        writeln!(f, "(phony)")?;
    }
    write!(f, "{target}:")?;
    for dep in rule.deps() {
        write!(f, " {dep}")?;
    }
    writeln!(f)?;
    for command in &rule.commands {
        writeln!(f, "\t{command}")?;
    }
    writeln!(f)
}

/// Renders the default target first, then every other rule in order.
///
/// ```
/// use mymake::graph::RuleGraph;
/// let mut graph = RuleGraph::new();
/// graph.entry("all").push_dep("main");
/// graph.entry("main").commands.push("cc -o main main.c".into());
/// graph.set_default_target("all");
/// assert_eq!(graph.to_string(), "all: main\n\nmain:\n\tcc -o main main.c\n\n");
/// ```
impl fmt::Display for RuleGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (target, rule) in self.iter_default_first() {
            write_rule(f, target, rule)?;
        }
        Ok(())
    }
}
