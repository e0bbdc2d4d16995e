//! Building parsed rule files with recorded commands.

use anyhow::{Context, Result, ensure};
use mymake::error::ErrorKind;
use mymake::exec::{BuildOutcome, Executor};
use mymake::graph::RuleGraph;
use mymake::{parser, synth};
use mymake_env::DEFAULT_RULE_FILE;
use rstest::{fixture, rstest};
use test_support::{Project, RecordingReporter, RecordingRunner};

#[fixture]
fn project() -> Project {
    Project::new().expect("project")
}

fn load(project: &Project, rules: &str) -> Result<RuleGraph> {
    project.rule_file(rules)?;
    let parsed = parser::parse(rules, DEFAULT_RULE_FILE)?;
    let mut graph = parsed.graph;
    synth::synthesize(&mut graph, &parsed.vars, &project.workspace());
    Ok(graph)
}

#[rstest]
fn cycle_completes_with_warning(project: Project) -> Result<()> {
    let graph = load(&project, "a: b\n\techo a\nb: a\n\techo b\n")?;
    let workspace = project.workspace();
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::new();

    let outcome = Executor::new(&graph, &workspace, &runner, &reporter).build(Some("a"))?;

    ensure!(outcome == BuildOutcome::Built, "{outcome:?}");
    ensure!(reporter.circular() == ["a"], "{:?}", reporter.circular());
    ensure!(
        runner.commands() == ["echo b", "echo a"],
        "{:?}",
        runner.commands()
    );
    Ok(())
}

#[rstest]
fn up_to_date_until_dependency_changes(project: Project) -> Result<()> {
    let graph = load(&project, "out: in\n\tcp in out\n")?;
    project.touch_aged("in", 100)?;
    project.touch_aged("out", 50)?;
    let workspace = project.workspace();
    let reporter = RecordingReporter::new();

    let idle = RecordingRunner::new();
    let err = Executor::new(&graph, &workspace, &idle, &reporter)
        .build(Some("out"))
        .expect_err("up to date");
    ensure!(err.kind() == ErrorKind::UpToDate, "{err}");
    ensure!(idle.commands().is_empty(), "{:?}", idle.commands());

    project.touch_aged("in", 0)?;
    let busy = RecordingRunner::new();
    Executor::new(&graph, &workspace, &busy, &reporter).build(Some("out"))?;
    ensure!(busy.commands() == ["cp in out"], "{:?}", busy.commands());
    Ok(())
}

#[rstest]
fn missing_dependency_files_do_not_make_target_stale(project: Project) -> Result<()> {
    let graph = load(&project, ".PHONY: opt\nout: opt\n\ttouch out\n")?;
    project.touch_aged("out", 10)?;
    let workspace = project.workspace();
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::new();

    let err = Executor::new(&graph, &workspace, &runner, &reporter)
        .build(Some("out"))
        .expect_err("up to date");

    ensure!(err.kind() == ErrorKind::UpToDate, "{err}");
    ensure!(!project.exists("opt"), "opt has no file");
    ensure!(runner.commands().is_empty(), "{:?}", runner.commands());
    Ok(())
}

#[rstest]
fn phony_clean_runs_even_when_file_exists(project: Project) -> Result<()> {
    let graph = load(&project, ".PHONY: clean\nclean:\n\trm -f *.o\n")?;
    project.write("clean", "")?;
    let workspace = project.workspace();
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::new();

    ensure!(
        graph.get("clean").is_some_and(|rule| rule.phony),
        "clean should be phony"
    );
    Executor::new(&graph, &workspace, &runner, &reporter).build(Some("clean"))?;
    ensure!(runner.commands() == ["rm -f *.o"], "{:?}", runner.commands());
    Ok(())
}

#[rstest]
fn second_build_of_compiled_program_is_up_to_date(project: Project) -> Result<()> {
    project.write("hello.c", "int main(void) { return 0; }")?;
    project.touch_aged("hello.c", 100)?;
    let graph = load(&project, "hello:\n")?;
    let workspace = project.workspace();
    let reporter = RecordingReporter::new();
    let command = "cc hello.c -o hello";
    let runner = RecordingRunner::new().produces(command, project.path("hello"));

    Executor::new(&graph, &workspace, &runner, &reporter).build(None)?;
    let err = Executor::new(&graph, &workspace, &runner, &reporter)
        .build(None)
        .expect_err("second build is idle");

    ensure!(err.kind() == ErrorKind::UpToDate, "{err}");
    ensure!(runner.commands() == [command], "{:?}", runner.commands());
    Ok(())
}

#[rstest]
fn object_then_link_order(project: Project) -> Result<()> {
    project.write("app.cpp", "")?;
    let graph = load(&project, "app: app.o\napp.o:\n")?;
    let workspace = project.workspace();
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::new();

    Executor::new(&graph, &workspace, &runner, &reporter).build(None)?;

    ensure!(
        runner.commands() == ["c++ -c -o app.o app.cpp", "cc app.o -o app"],
        "{:?}",
        runner.commands()
    );
    ensure!(
        reporter.commands() == runner.commands(),
        "every command is echoed"
    );
    Ok(())
}

#[rstest]
fn failing_command_aborts_with_exit_code(project: Project) -> Result<()> {
    let graph = load(&project, "all: broken\n\techo done\nbroken:\n\tfalse\n")?;
    let workspace = project.workspace();
    let runner = RecordingRunner::new().fail("false", 3);
    let reporter = RecordingReporter::new();

    let err = Executor::new(&graph, &workspace, &runner, &reporter)
        .build(None)
        .expect_err("fatal");

    ensure!(err.is_fatal(), "{err}");
    ensure!(
        err.to_string() == "Command for target 'broken' failed with exit status 3",
        "{err}"
    );
    ensure!(runner.commands() == ["false"], "{:?}", runner.commands());
    Ok(())
}

#[rstest]
fn missing_file_dependency_is_fatal(project: Project) -> Result<()> {
    let graph = load(&project, "report: data.csv\n\tsort data.csv\n")?;
    let workspace = project.workspace();
    let runner = RecordingRunner::new();
    let reporter = RecordingReporter::new();

    let err = Executor::new(&graph, &workspace, &runner, &reporter)
        .build(None)
        .expect_err("no rule");
    ensure!(err.kind() == ErrorKind::NoRule, "{err}");

    project.write("data.csv", "b\na\n")?;
    Executor::new(&graph, &workspace, &runner, &reporter)
        .build(None)
        .context("dependency now exists")?;
    ensure!(runner.commands() == ["sort data.csv"], "{:?}", runner.commands());
    Ok(())
}
