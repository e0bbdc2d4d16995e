//! Line-level helpers: comment stripping and classification.

/// Shape of a non-blank, variable-expanded rule file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Line<'a> {
    /// Tab-indented command for the active rule.
    Command(&'a str),
    /// `name=value` binding; the name is already trimmed.
    Assignment { name: &'a str, value: &'a str },
    /// `targets: deps` declaration, both sides whitespace-split.
    Rule {
        targets: Vec<&'a str>,
        deps: Vec<&'a str>,
    },
    /// Anything else.
    Unrecognized,
}

/// Remove everything from the first unescaped `#`; `\#` yields a literal `#`.
pub(super) fn strip_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'#') => {
                out.push('#');
                chars.next();
            }
            '#' => break,
            other => out.push(other),
        }
    }
    out
}

/// Classify `expanded`, which must not be blank.
///
/// Commands are recognised on the raw line; assignments and rules on the
/// trimmed line, assignments first.
pub(super) fn classify(expanded: &str) -> Line<'_> {
    if let Some(command) = expanded.strip_prefix('\t') {
        return Line::Command(command);
    }
    let trimmed = expanded.trim();
    if let Some((name, value)) = trimmed.split_once('=') {
        return Line::Assignment {
            name: name.trim(),
            value,
        };
    }
    if let Some((targets, deps)) = trimmed.split_once(':') {
        return Line::Rule {
            targets: targets.split_whitespace().collect(),
            deps: deps.split_whitespace().collect(),
        };
    }
    Line::Unrecognized
}
