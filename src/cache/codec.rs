//! Record codecs for the rule cache.
//!
//! A codec turns `(target, rule)` records into text and back. Decoding is
//! strict: anything other than trailing blank lines that does not fit the
//! format is a [`CodecError`], which the cache treats as "unusable".

use serde::{Deserialize, Serialize};
use std::iter::Enumerate;
use std::str::Lines;
use thiserror::Error;

use crate::graph::Rule;

/// One decoded cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    /// Target name.
    pub target: String,
    /// Rule stored for the target.
    pub rule: Rule,
}

/// Structural problems found while decoding a cache file.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input ended in the middle of a record.
    #[error("record truncated at line {line}")]
    Truncated {
        /// One-based line where more input was expected.
        line: usize,
    },
    /// The flag line is not two `0`/`1` values.
    #[error("malformed flags on line {line}")]
    BadFlags {
        /// One-based line number.
        line: usize,
    },
    /// A count line is not a non-negative integer.
    #[error("malformed count on line {line}")]
    BadCount {
        /// One-based line number.
        line: usize,
    },
    /// A target or dependency name is blank.
    #[error("blank name on line {line}")]
    BlankName {
        /// One-based line number.
        line: usize,
    },
    /// A rule is flagged implicit but has no dependency.
    #[error("rule '{target}' is marked implicit without a dependency")]
    UnbackedImplicit {
        /// Offending target.
        target: String,
    },
    /// A JSON record failed to deserialise.
    #[error("invalid JSON record on line {line}")]
    Json {
        /// One-based line number.
        line: usize,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Encoding and decoding of cache records.
pub trait RecordCodec {
    /// Append the encoding of one record to `out`.
    fn encode_record(&self, target: &str, rule: &Rule, out: &mut String);

    /// Decode every record in `text`, in order.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] describing the first structural anomaly.
    fn decode(&self, text: &str) -> Result<Vec<CacheRecord>, CodecError>;
}

fn build_rule(
    target: String,
    phony: bool,
    implicit_dep: bool,
    deps: Vec<String>,
    commands: Vec<String>,
) -> Result<CacheRecord, CodecError> {
    let rule = Rule::from_parts(phony, implicit_dep, deps, commands)
        .ok_or_else(|| CodecError::UnbackedImplicit {
            target: target.clone(),
        })?;
    Ok(CacheRecord { target, rule })
}

/// Plain line format.
///
/// Each record is the target name, a `phony implicit` flag line of `0`/`1`
/// values, a dependency count followed by that many names, and a command
/// count followed by that many command lines.
///
/// ```
/// use mymake::cache::{LineCodec, RecordCodec};
/// use mymake::graph::Rule;
///
/// let mut rule = Rule::default();
/// rule.push_implicit_dep("main.c");
/// rule.commands.push("cc -c -o main.o main.c".into());
/// let mut text = String::new();
/// LineCodec.encode_record("main.o", &rule, &mut text);
/// assert_eq!(text, "main.o\n0 1\n1\nmain.c\n1\ncc -c -o main.o main.c\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

struct Cursor<'a> {
    lines: Enumerate<Lines<'a>>,
    last: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            last: 0,
        }
    }

    fn rest_is_blank(&self) -> bool {
        self.lines.clone().all(|(_, line)| line.trim().is_empty())
    }

    fn next_line(&mut self) -> Result<(usize, &'a str), CodecError> {
        match self.lines.next() {
            Some((idx, line)) => {
                self.last = idx + 1;
                Ok((idx + 1, line))
            }
            None => Err(CodecError::Truncated {
                line: self.last + 1,
            }),
        }
    }

    fn name(&mut self) -> Result<String, CodecError> {
        let (line, text) = self.next_line()?;
        if text.trim().is_empty() {
            return Err(CodecError::BlankName { line });
        }
        Ok(text.to_owned())
    }

    fn count(&mut self) -> Result<usize, CodecError> {
        let (line, text) = self.next_line()?;
        text.trim()
            .parse()
            .map_err(|_| CodecError::BadCount { line })
    }

    fn flags(&mut self) -> Result<(bool, bool), CodecError> {
        let (line, text) = self.next_line()?;
        let bad = || CodecError::BadFlags { line };
        let mut parts = text.split_whitespace().map(|part| match part {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(bad()),
        });
        let phony = parts.next().ok_or_else(bad)??;
        let implicit_dep = parts.next().ok_or_else(bad)??;
        if parts.next().is_some() {
            return Err(bad());
        }
        Ok((phony, implicit_dep))
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

impl RecordCodec for LineCodec {
    fn encode_record(&self, target: &str, rule: &Rule, out: &mut String) {
        push_line(out, target);
        push_line(
            out,
            &format!("{} {}", u8::from(rule.phony), u8::from(rule.implicit_dep())),
        );
        push_line(out, &rule.deps().len().to_string());
        for dep in rule.deps() {
            push_line(out, dep);
        }
        push_line(out, &rule.commands.len().to_string());
        for command in &rule.commands {
            push_line(out, command);
        }
    }

    fn decode(&self, text: &str) -> Result<Vec<CacheRecord>, CodecError> {
        let mut cursor = Cursor::new(text);
        let mut records = Vec::new();
        while !cursor.rest_is_blank() {
            let target = cursor.name()?;
            let (phony, implicit_dep) = cursor.flags()?;
            let dep_count = cursor.count()?;
            let deps = (0..dep_count)
                .map(|_| cursor.name())
                .collect::<Result<Vec<_>, _>>()?;
            let command_count = cursor.count()?;
            let commands = (0..command_count)
                .map(|_| cursor.next_line().map(|(_, line)| line.to_owned()))
                .collect::<Result<Vec<_>, _>>()?;
            records.push(build_rule(target, phony, implicit_dep, deps, commands)?);
        }
        Ok(records)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonRecord {
    target: String,
    phony: bool,
    implicit_dep: bool,
    dependencies: Vec<String>,
    commands: Vec<String>,
}

/// One JSON object per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl RecordCodec for JsonCodec {
    fn encode_record(&self, target: &str, rule: &Rule, out: &mut String) {
        let record = JsonRecord {
            target: target.to_owned(),
            phony: rule.phony,
            implicit_dep: rule.implicit_dep(),
            dependencies: rule.deps().to_vec(),
            commands: rule.commands.clone(),
        };
        match serde_json::to_string(&record) {
            Ok(json) => {
                out.push_str(&json);
                out.push('\n');
            }
            Err(err) => tracing::debug!(error = %err, "skipping unserialisable cache record"),
        }
    }

    fn decode(&self, text: &str) -> Result<Vec<CacheRecord>, CodecError> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                let record: JsonRecord = serde_json::from_str(line).map_err(|source| {
                    CodecError::Json {
                        line: idx + 1,
                        source,
                    }
                })?;
                if record.target.trim().is_empty() {
                    return Err(CodecError::BlankName { line: idx + 1 });
                }
                build_rule(
                    record.target,
                    record.phony,
                    record.implicit_dep,
                    record.dependencies,
                    record.commands,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample() -> Vec<(String, Rule)> {
        let mut main_o = Rule::default();
        main_o.push_implicit_dep("main.cpp");
        main_o.commands.push("c++ -c -o main.o main.cpp".into());
        let mut clean = Rule::default();
        clean.phony = true;
        clean.commands.push("rm -f *.o".into());
        clean.commands.push("  echo   spaced  ".into());
        let mut app = Rule::default();
        app.push_dep("main.o");
        app.push_dep("util.o");
        vec![
            ("app".into(), app),
            ("main.o".into(), main_o),
            ("clean".into(), clean),
        ]
    }

    fn encode(codec: &dyn RecordCodec, records: &[(String, Rule)]) -> String {
        let mut out = String::new();
        for (target, rule) in records {
            codec.encode_record(target, rule, &mut out);
        }
        out
    }

    #[rstest]
    #[case::line(&LineCodec as &dyn RecordCodec)]
    #[case::json(&JsonCodec as &dyn RecordCodec)]
    fn decode_restores_encoded_records(#[case] codec: &dyn RecordCodec) {
        let records = sample();
        let text = encode(codec, &records) + "\n\n";
        let decoded = codec.decode(&text).expect("decode");
        let restored: Vec<(String, Rule)> = decoded
            .into_iter()
            .map(|record| (record.target, record.rule))
            .collect();
        assert_eq!(restored, records);
    }

    #[rstest]
    #[case::missing_commands("a\n0 0\n0\n", "record truncated at line 4")]
    #[case::bad_flag("a\n0 2\n0\n0\n", "malformed flags on line 2")]
    #[case::extra_flag("a\n0 0 0\n0\n0\n", "malformed flags on line 2")]
    #[case::one_flag("a\n1\n0\n0\n", "malformed flags on line 2")]
    #[case::bad_count("a\n0 0\nmany\n0\n", "malformed count on line 3")]
    #[case::short_deps("a\n0 0\n2\nb\n", "record truncated at line 5")]
    #[case::blank_dep("a\n0 0\n1\n\n0\n", "blank name on line 4")]
    #[case::blank_key("\na\n0 0\n0\n0\n", "blank name on line 1")]
    #[case::unbacked("a\n0 1\n0\n0\n", "rule 'a' is marked implicit without a dependency")]
    fn line_codec_rejects_anomalies(#[case] text: &str, #[case] message: &str) {
        let err = LineCodec.decode(text).expect_err("anomaly");
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn empty_input_decodes_to_nothing() {
        assert!(LineCodec.decode("\n\n").expect("decode").is_empty());
        assert!(JsonCodec.decode("").expect("decode").is_empty());
    }

    #[test]
    fn json_codec_rejects_garbage() {
        let err = JsonCodec.decode("{\"target\":\"a\"}\n").expect_err("anomaly");
        assert!(matches!(err, CodecError::Json { line: 1, .. }));
    }
}
