//! Implicit rule synthesis.
//!
//! Fills in commands for non-phony rules that declare none, using the usual
//! C and C++ naming conventions:
//!
//! - `foo.o` compiles `foo.cpp` (preferred) or `foo.c`;
//! - `foo`, when a `foo.o` rule exists, links `foo.o` with its other
//!   dependencies;
//! - otherwise `foo` compiles and links `foo.cpp` or `foo.c` directly.
//!
//! The inferred source or object becomes the rule's implicit first
//! dependency.

use camino::Utf8Path;
use itertools::Itertools;

use crate::graph::{Rule, RuleGraph};
use crate::vars::VariableTable;
use crate::workspace::Workspace;

/// Source language of an inferred source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// `.cpp` sources, built with `CXX` and `CXXFLAGS`.
    Cxx,
    /// `.c` sources, built with `CC` and `CFLAGS`.
    C,
}

impl Language {
    /// Extensions in lookup priority order.
    pub const ALL: [Self; 2] = [Self::Cxx, Self::C];

    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Cxx => "cpp",
            Self::C => "c",
        }
    }

    const fn compiler_var(self) -> &'static str {
        match self {
            Self::Cxx => "CXX",
            Self::C => "CC",
        }
    }

    const fn flags_var(self) -> &'static str {
        match self {
            Self::Cxx => "CXXFLAGS",
            Self::C => "CFLAGS",
        }
    }
}

/// Candidate source files for `target`, in lookup priority order.
///
/// The stem keeps any directory part: `obj/foo.o` yields `obj/foo.cpp` then
/// `obj/foo.c`.
#[must_use]
pub fn source_candidates(target: &str) -> [(Language, String); 2] {
    let path = Utf8Path::new(target);
    Language::ALL.map(|lang| (lang, path.with_extension(lang.extension()).into_string()))
}

/// First candidate source for `target` that exists in `workspace`.
#[must_use]
pub fn find_source(workspace: &Workspace, target: &str) -> Option<(Language, String)> {
    source_candidates(target)
        .into_iter()
        .find(|(_, source)| workspace.exists(source))
}

/// Fill in implicit dependencies and commands across `graph`.
///
/// Only non-phony rules with no commands are touched, so running it again is a
/// no-op.
pub fn synthesize(graph: &mut RuleGraph, vars: &VariableTable, workspace: &Workspace) {
    let pending: Vec<String> = graph
        .iter()
        .filter(|(_, rule)| !rule.phony && rule.commands.is_empty())
        .map(|(target, _)| target.to_owned())
        .collect();

    for target in pending {
        let object = format!("{target}.o");
        let has_object_rule = graph.contains(&object);
        let Some(rule) = graph.get_mut(&target) else {
            continue;
        };
        if Utf8Path::new(&target).extension() == Some("o") {
            if let Some((lang, source)) = find_source(workspace, &target) {
                compile_object(rule, vars, &target, lang, source);
            }
        } else if has_object_rule {
            link_object(rule, vars, &target, object);
        } else if let Some((lang, source)) = find_source(workspace, &target) {
            compile_and_link(rule, vars, &target, lang, source);
        }
        if !rule.commands.is_empty() {
            tracing::debug!(
                rule = %target,
                command = ?rule.commands,
                "synthesized implicit rule"
            );
        }
    }
}

/// Join the non-empty parts of a command with single spaces.
fn command_line<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .join(" ")
}

fn other_deps<'a>(rule: &'a Rule, skip: &'a str) -> impl Iterator<Item = &'a str> {
    rule.deps()
        .iter()
        .map(String::as_str)
        .filter(move |dep| *dep != skip)
}

fn compile_object(
    rule: &mut Rule,
    vars: &VariableTable,
    target: &str,
    lang: Language,
    source: String,
) {
    let command = command_line([
        vars.get(lang.compiler_var()),
        vars.get(lang.flags_var()),
        "-c -o",
        target,
        source.as_str(),
    ]);
    rule.push_implicit_dep(source);
    rule.commands.push(command);
}

fn link_object(rule: &mut Rule, vars: &VariableTable, target: &str, object: String) {
    rule.push_implicit_dep(object.as_str());
    let command = command_line(
        [vars.get("CC"), vars.get("LDFLAGS"), object.as_str()]
            .into_iter()
            .chain(other_deps(rule, &object))
            .chain([vars.get("LDLIBS"), "-o", target]),
    );
    rule.commands.push(command);
}

fn compile_and_link(
    rule: &mut Rule,
    vars: &VariableTable,
    target: &str,
    lang: Language,
    source: String,
) {
    rule.push_implicit_dep(source.as_str());
    let command = command_line(
        [
            vars.get(lang.compiler_var()),
            vars.get(lang.flags_var()),
            vars.get("LDFLAGS"),
            source.as_str(),
        ]
        .into_iter()
        .chain(other_deps(rule, &source))
        .chain([vars.get("LDLIBS"), "-o", target]),
    );
    rule.commands.push(command);
}
