//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point. A run
//! obtains the rule graph from the cache when it is still valid, otherwise
//! parses the rule file, fills in implicit rules and stores the result, then
//! either builds the requested targets or prints the graph.

use crate::cache::{JsonCodec, LineCodec, RecordCodec, RuleCache};
use crate::cli::{BuildArgs, CacheFormat, Cli, Commands};
use crate::error::MakeError;
use crate::exec::{CommandRunner, DryRunner, Executor, ShellRunner};
use crate::graph::RuleGraph;
use crate::parser;
use crate::status::{BuildReporter, ConsoleReporter};
use crate::synth;
use crate::workspace::Workspace;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::io::{self, Write};
use tracing::{debug, info};

/// Where a run's rule graph came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphSource {
    /// Loaded from a still-valid cache file.
    Cache,
    /// Parsed from the rule file and synthesized.
    RuleFile,
}

/// A rule graph ready to build.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    /// Rules with implicit commands filled in.
    pub graph: RuleGraph,
    /// How the graph was obtained.
    pub source: GraphSource,
}

/// Execute the parsed [`Cli`] command.
///
/// # Errors
///
/// Returns an error when the rule file cannot be loaded or a build fails
/// fatally. Fatal build errors are [`MakeError`]s and can be downcast.
pub fn run(cli: &Cli) -> Result<()> {
    let workspace = workspace_for(cli)?;
    let loaded = load_graph(cli, &workspace)?;
    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Commands::Build(BuildArgs::default()));
    match command {
        Commands::Build(args) => {
            let runner = make_runner(cli, &workspace);
            handle_build(
                cli,
                &args,
                &loaded.graph,
                &workspace,
                runner.as_ref(),
                &ConsoleReporter,
            )
        }
        Commands::Rules => {
            drop(write!(io::stdout(), "{}", loaded.graph));
            Ok(())
        }
    }
}

/// Resolve the project directory named by `-C`, defaulting to the current one.
///
/// # Errors
///
/// Returns an error when the directory is not valid UTF-8.
pub fn workspace_for(cli: &Cli) -> Result<Workspace> {
    let root = match &cli.directory {
        Some(dir) => Utf8PathBuf::from_path_buf(dir.clone()).map_err(|path| {
            anyhow::anyhow!("project directory {} is not valid UTF-8", path.display())
        })?,
        None => Utf8PathBuf::new(),
    };
    Ok(Workspace::new(root))
}

fn make_codec(format: CacheFormat) -> Box<dyn RecordCodec> {
    match format {
        CacheFormat::Text => Box::new(LineCodec),
        CacheFormat::Json => Box::new(JsonCodec),
    }
}

fn make_runner(cli: &Cli, workspace: &Workspace) -> Box<dyn CommandRunner> {
    if cli.dry_run {
        Box::new(DryRunner)
    } else {
        Box::new(ShellRunner::new(&cli.shell, workspace.root()))
    }
}

/// Obtain the rule graph for `cli`, preferring a valid cache.
///
/// # Errors
///
/// Returns [`MakeError::NoRuleFile`], a parse error or
/// [`MakeError::NoTargets`] when the rule file has to be read and is unusable.
pub fn load_graph(cli: &Cli, workspace: &Workspace) -> Result<LoadedGraph> {
    let cache = RuleCache::new(workspace, &cli.cache_file, make_codec(cli.cache_format));
    if !cli.no_cache {
        if let Some(graph) = cache.load(&cli.file) {
            return Ok(LoadedGraph {
                graph,
                source: GraphSource::Cache,
            });
        }
    }

    let graph = parse_rule_file(&cli.file, workspace)?;
    if cli.no_cache {
        debug!("rule cache disabled");
    } else {
        cache.store(&graph);
    }
    Ok(LoadedGraph {
        graph,
        source: GraphSource::RuleFile,
    })
}

/// Parse and synthesize the rule file `name` in `workspace`.
fn parse_rule_file(name: &str, workspace: &Workspace) -> Result<RuleGraph> {
    if !workspace.exists(name) {
        return Err(MakeError::NoRuleFile {
            name: name.to_owned(),
            path: workspace.resolve(name),
        }
        .into());
    }
    let source = workspace
        .read_to_string(name)
        .with_context(|| format!("reading rule file {}", workspace.resolve(name)))?;
    let parser::Parsed { mut graph, vars } =
        parser::parse(&source, name).map_err(MakeError::from)?;
    synth::synthesize(&mut graph, &vars, workspace);
    if graph.default_target().is_none() {
        return Err(MakeError::NoTargets {
            name: name.to_owned(),
        }
        .into());
    }
    info!(rules = graph.len(), file = name, "parsed rule file");
    Ok(graph)
}

/// Build each requested target in order, or the default target.
///
/// Non-fatal outcomes of a requested target are reported as notices.
fn handle_build(
    cli: &Cli,
    args: &BuildArgs,
    graph: &RuleGraph,
    workspace: &Workspace,
    runner: &dyn CommandRunner,
    reporter: &dyn BuildReporter,
) -> Result<()> {
    let executor = Executor::new(graph, workspace, runner, reporter).with_rule_file(&cli.file);
    let requested: Vec<Option<&str>> = if args.targets.is_empty() {
        vec![None]
    } else {
        args.targets.iter().map(|t| Some(t.as_str())).collect()
    };
    for target in requested {
        match executor.build(target) {
            Ok(outcome) => debug!(?outcome, "build finished"),
            Err(err) if !err.is_fatal() => reporter.notice(&err),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
