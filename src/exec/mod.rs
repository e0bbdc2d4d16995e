//! Build execution.
//!
//! The [`Executor`] walks the rule graph depth-first from a requested target,
//! building dependencies in declared order before deciding whether the
//! target itself needs its commands run. Each recursive call receives its own
//! copy of the chain of targets being built, so a target reached twice along
//! one chain is reported as circular and skipped, while diamonds are visited
//! once per path.
//!
//! Non-fatal outcomes of a dependency ("up to date", "nothing to be done")
//! are swallowed; fatal errors abort the whole build.

mod command;

pub use command::{CommandRunner, DryRunner, ShellRunner};

use std::collections::HashSet;
use tracing::debug;

use crate::error::MakeError;
use crate::graph::{Rule, RuleGraph};
use crate::status::BuildReporter;
use crate::workspace::Workspace;

/// Result of a build that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The target's rule was carried out, so dependants must rebuild.
    Built,
    /// The target was already on the current dependency chain.
    Circular,
}

impl BuildOutcome {
    /// Whether this build performed work dependants must account for.
    #[must_use]
    pub const fn did_work(self) -> bool {
        matches!(self, Self::Built)
    }
}

/// Builds targets of a [`RuleGraph`].
pub struct Executor<'a> {
    graph: &'a RuleGraph,
    workspace: &'a Workspace,
    runner: &'a dyn CommandRunner,
    reporter: &'a dyn BuildReporter,
    rule_file: String,
}

impl<'a> Executor<'a> {
    /// Executor over `graph`, probing files in `workspace`.
    #[must_use]
    pub fn new(
        graph: &'a RuleGraph,
        workspace: &'a Workspace,
        runner: &'a dyn CommandRunner,
        reporter: &'a dyn BuildReporter,
    ) -> Self {
        Self {
            graph,
            workspace,
            runner,
            reporter,
            rule_file: mymake_env::DEFAULT_RULE_FILE.to_owned(),
        }
    }

    /// Name the rule file in "no targets" errors.
    #[must_use]
    pub fn with_rule_file(mut self, name: impl Into<String>) -> Self {
        self.rule_file = name.into();
        self
    }

    /// Build `target`, or the graph's default target when `None`.
    ///
    /// # Errors
    ///
    /// Fatal errors: [`MakeError::NoRule`], [`MakeError::NoTargets`],
    /// [`MakeError::CommandFailed`] and [`MakeError::CommandSpawn`].
    /// Non-fatal outcomes for the requested target itself are returned as
    /// [`MakeError::UpToDate`] or [`MakeError::NothingToDo`].
    pub fn build(&self, target: Option<&str>) -> Result<BuildOutcome, MakeError> {
        let target = match target {
            Some(name) => name,
            None => self
                .graph
                .default_target()
                .ok_or_else(|| MakeError::NoTargets {
                    name: self.rule_file.clone(),
                })?,
        };
        self.build_target(target, &HashSet::new())
    }

    fn build_target(
        &self,
        target: &str,
        chain: &HashSet<String>,
    ) -> Result<BuildOutcome, MakeError> {
        let Some(rule) = self.graph.get(target) else {
            return Err(if self.workspace.exists(target) {
                MakeError::NothingToDo {
                    target: target.to_owned(),
                }
            } else {
                MakeError::NoRule {
                    target: target.to_owned(),
                }
            });
        };

        if chain.contains(target) {
            self.reporter.circular(target);
            return Ok(BuildOutcome::Circular);
        }
        let mut chain = chain.clone();
        chain.insert(target.to_owned());

        let mut rebuilt_dep = false;
        for dep in rule.deps() {
            match self.build_target(dep, &chain) {
                Ok(outcome) => rebuilt_dep |= outcome.did_work(),
                Err(err) if !err.is_fatal() => {
                    debug!(dependency = %dep, %err, "no work for dependency");
                }
                Err(err) => return Err(err),
            }
        }

        if !rule.phony && !rebuilt_dep && self.is_up_to_date(target, rule) {
            return Err(MakeError::UpToDate {
                target: target.to_owned(),
            });
        }
        if rule.commands.is_empty() && !rule.implicit_dep() && !rebuilt_dep {
            return Err(MakeError::NothingToDo {
                target: target.to_owned(),
            });
        }

        self.run_commands(target, rule)?;
        Ok(BuildOutcome::Built)
    }

    /// An existing target is up to date when no existing dependency is newer.
    fn is_up_to_date(&self, target: &str, rule: &Rule) -> bool {
        let Some(built_at) = self.workspace.modified(target) else {
            return false;
        };
        rule.deps()
            .iter()
            .filter_map(|dep| self.workspace.modified(dep))
            .all(|changed_at| changed_at <= built_at)
    }

    fn run_commands(&self, target: &str, rule: &Rule) -> Result<(), MakeError> {
        for command in &rule.commands {
            self.reporter.command(command);
            let code = self
                .runner
                .run(command)
                .map_err(|source| MakeError::CommandSpawn {
                    target: target.to_owned(),
                    command: command.clone(),
                    source,
                })?;
            if code != 0 {
                return Err(MakeError::CommandFailed {
                    target: target.to_owned(),
                    code,
                });
            }
        }
        debug!(rule = %target, commands = rule.commands.len(), "built target");
        Ok(())
    }
}
