//! Rule file parser.
//!
//! Reads the rule file one line at a time, expanding variables and populating
//! a [`RuleGraph`]. Supported lines are comments (`#`), blanks, tab-indented
//! commands, `name=value` assignments and `targets: deps` rules. Dependencies
//! listed on a `.PHONY:` line are marked phony.
//!
//! ```
//! use mymake::parser::parse;
//!
//! let src = "CFLAGS = -Wall\nall: hello\n\techo $(CC)$(CFLAGS)\n";
//! let parsed = parse(src, "MyMakefile").expect("parse");
//! assert_eq!(parsed.graph.default_target(), Some("all"));
//! let all = parsed.graph.get("all").expect("rule");
//! assert_eq!(all.commands, ["echo cc -Wall"]);
//! ```

mod line;

use crate::error::ParseError;
use crate::graph::{PHONY_TARGET, RuleGraph};
use crate::vars::VariableTable;
use line::{Line, classify, strip_comment};

/// Output of [`parse`]: the rule graph and the final variable bindings.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    /// Declared rules.
    pub graph: RuleGraph,
    /// Variables as bound at the end of the file.
    pub vars: VariableTable,
}

/// Parse `source`, the contents of the rule file called `name`.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the first line that is an orphaned
/// command, an assignment with an empty name, a rule with no targets, or
/// unrecognised syntax.
pub fn parse(source: &str, name: &str) -> Result<Parsed, ParseError> {
    let mut parsed = Parsed::default();
    let mut active: Option<String> = None;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let fail = |reason| ParseError::new(name, source, line_no, reason);

        let expanded = parsed.vars.expand(&strip_comment(raw));
        if expanded.trim().is_empty() {
            continue;
        }

        match classify(&expanded) {
            Line::Command(command) => {
                let rule = active
                    .as_deref()
                    .and_then(|target| parsed.graph.get_mut(target))
                    .ok_or_else(|| fail("commands before first target"))?;
                rule.commands.push(command.to_owned());
            }
            Line::Assignment { name: var, value } => {
                if var.is_empty() {
                    return Err(fail("empty variable name"));
                }
                parsed.vars.define(var, value);
            }
            Line::Rule { targets, deps } => {
                let Some(first) = targets.first() else {
                    return Err(fail("empty target list"));
                };
                declare(&mut parsed.graph, &targets, &deps);
                if let Some(default) = targets.iter().find(|t| **t != PHONY_TARGET) {
                    parsed.graph.set_default_target(default);
                }
                active = Some((*first).to_owned());
            }
            Line::Unrecognized => return Err(fail("unrecognized syntax")),
        }
    }

    tracing::debug!(rules = parsed.graph.len(), "parsed rule file");
    Ok(parsed)
}

fn declare(graph: &mut RuleGraph, targets: &[&str], deps: &[&str]) {
    for target in targets {
        let is_phony_decl = *target == PHONY_TARGET;
        let rule = graph.entry(target);
        if is_phony_decl {
            rule.phony = true;
        }
        for dep in deps {
            rule.push_dep(*dep);
        }
        if is_phony_decl {
            for dep in deps {
                graph.entry(dep).phony = true;
            }
        }
    }
}
