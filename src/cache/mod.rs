//! Persistent rule cache.
//!
//! A cache hit lets a run skip parsing and synthesis entirely, so the cache
//! decides validity rather than mere existence. A cache is used only when:
//!
//! 1. it is at least as new as the rule file;
//! 2. every record decodes into a well-formed rule and the first record names
//!    a usable default target;
//! 3. every inferred source of a non-phony rule still exists;
//! 4. no commandless, non-implicit, non-phony rule has gained a source file
//!    that synthesis would now pick up.
//!
//! Anything else falls through to a full parse. Writing is best-effort.

mod codec;

pub use codec::{CacheRecord, CodecError, JsonCodec, LineCodec, RecordCodec};

use crate::graph::RuleGraph;
use crate::synth::find_source;
use crate::workspace::Workspace;
use tracing::debug;

pub use mymake_env::DEFAULT_CACHE_FILE;

/// Rule cache stored in one file of a [`Workspace`].
pub struct RuleCache<'a> {
    workspace: &'a Workspace,
    file: String,
    codec: Box<dyn RecordCodec>,
}

impl<'a> RuleCache<'a> {
    /// Cache stored at `file`, relative to the workspace, encoded with `codec`.
    #[must_use]
    pub fn new(
        workspace: &'a Workspace,
        file: impl Into<String>,
        codec: Box<dyn RecordCodec>,
    ) -> Self {
        Self {
            workspace,
            file: file.into(),
            codec,
        }
    }

    /// Load the cached graph if it is still valid for `rule_file`.
    ///
    /// Returns `None` on any failure or staleness; nothing half-loaded ever
    /// escapes.
    #[must_use]
    pub fn load(&self, rule_file: &str) -> Option<RuleGraph> {
        let cache_time = self.workspace.modified(&self.file)?;
        let rule_time = self.workspace.modified(rule_file)?;
        if cache_time < rule_time {
            debug!(cache = %self.file, "cache older than rule file");
            return None;
        }
        let graph = self.read()?;
        if let Some(reason) = self.staleness(&graph) {
            debug!(cache = %self.file, reason, "cache is stale");
            return None;
        }
        debug!(cache = %self.file, rules = graph.len(), "using cached rules");
        Some(graph)
    }

    fn read(&self) -> Option<RuleGraph> {
        let text = self
            .workspace
            .read_to_string(&self.file)
            .inspect_err(|err| debug!(cache = %self.file, error = %err, "cache unreadable"))
            .ok()?;
        let records = self
            .codec
            .decode(&text)
            .inspect_err(|err| debug!(cache = %self.file, error = %err, "cache malformed"))
            .ok()?;

        let mut graph = RuleGraph::new();
        let mut default = None;
        for record in records {
            if graph.contains(&record.target) {
                debug!(cache = %self.file, rule = %record.target, "duplicate cache record");
                return None;
            }
            default.get_or_insert_with(|| record.target.clone());
            graph.insert(record.target, record.rule);
        }
        let default = default?;
        if !graph.set_default_target(&default) {
            debug!(cache = %self.file, "cache has no usable default target");
            return None;
        }
        Some(graph)
    }

    fn staleness(&self, graph: &RuleGraph) -> Option<&'static str> {
        let missing_source = graph.iter().any(|(_, rule)| {
            !rule.phony
                && rule.implicit_dep()
                && rule
                    .deps()
                    .first()
                    .is_none_or(|source| !self.workspace.exists(source))
        });
        if missing_source {
            return Some("an inferred source file disappeared");
        }
        let new_source = graph.iter().any(|(target, rule)| {
            !rule.phony
                && rule.commands.is_empty()
                && !rule.implicit_dep()
                && find_source(self.workspace, target).is_some()
        });
        new_source.then_some("a new source file appeared")
    }

    /// Persist `graph`, default target first. Failures are logged and ignored.
    pub fn store(&self, graph: &RuleGraph) {
        let mut text = String::new();
        for (target, rule) in graph.iter_default_first() {
            self.codec.encode_record(target, rule, &mut text);
        }
        match self.workspace.write_atomic(&self.file, &text) {
            Ok(()) => debug!(cache = %self.file, rules = graph.len(), "wrote rule cache"),
            Err(err) => debug!(cache = %self.file, error = %err, "could not write rule cache"),
        }
    }
}
