//! End-to-end tests of the `mymake` binary using `assert_cmd`.

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use mymake_env::{CACHE_FILE_ENV, DEFAULT_CACHE_FILE, RULE_FILE_ENV, SHELL_ENV};
use predicates::prelude::*;
use test_support::{FakeShell, Project};

fn mymake(project: &Project) -> Result<Command> {
    let mut cmd = Command::cargo_bin("mymake").context("locate mymake binary")?;
    cmd.current_dir(project.root())
        .env_remove(RULE_FILE_ENV)
        .env_remove(CACHE_FILE_ENV)
        .env_remove(SHELL_ENV);
    Ok(cmd)
}

#[test]
fn build_echoes_and_runs_commands() -> Result<()> {
    let project = Project::new()?;
    project.rule_file("greeting.txt:\n\techo hello > greeting.txt\n")?;

    mymake(&project)?
        .assert()
        .success()
        .stdout("echo hello > greeting.txt\n");

    ensure!(project.read("greeting.txt")? == "hello\n", "command output");
    ensure!(project.exists(DEFAULT_CACHE_FILE), "cache is written");
    Ok(())
}

#[test]
fn second_run_reports_up_to_date() -> Result<()> {
    let project = Project::new()?;
    project.rule_file("copy.txt: source.txt\n\tcp source.txt copy.txt\n")?;
    project.write("source.txt", "data")?;

    mymake(&project)?.assert().success();
    mymake(&project)?
        .arg("build")
        .arg("copy.txt")
        .assert()
        .success()
        .stdout("mymake: Target 'copy.txt' is up to date\n");
    Ok(())
}

#[test]
fn existing_file_without_rule_has_nothing_to_do() -> Result<()> {
    let project = Project::new()?;
    project.rule_file("all:\n\ttrue\n")?;
    project.write("notes.txt", "")?;

    mymake(&project)?
        .args(["build", "notes.txt"])
        .assert()
        .success()
        .stdout("mymake: Nothing to be done for target 'notes.txt'\n");
    Ok(())
}

#[test]
fn parse_error_names_the_line() -> Result<()> {
    let project = Project::new()?;
    project.rule_file("all:\n\ttrue\nthis is not a rule\n")?;

    mymake(&project)?
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error on line 3: unrecognized syntax"));
    Ok(())
}

#[test]
fn missing_rule_file_fails() -> Result<()> {
    let project = Project::new()?;

    mymake(&project)?
        .assert()
        .failure()
        .stderr(predicate::str::contains("No MyMakefile found"));
    Ok(())
}

#[test]
fn unknown_target_fails() -> Result<()> {
    let project = Project::new()?;
    project.rule_file("all:\n\ttrue\n")?;

    mymake(&project)?
        .args(["build", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No rule to make target 'nowhere'"));
    Ok(())
}

#[test]
fn cycle_warns_on_stderr() -> Result<()> {
    let project = Project::new()?;
    project.rule_file(".PHONY: a b\na: b\n\ttrue\nb: a\n\ttrue\n")?;

    mymake(&project)?
        .assert()
        .success()
        .stderr("mymake: Circular a dependency dropped.\n")
        .stdout("true\ntrue\n");
    Ok(())
}

#[test]
fn rules_prints_synthesized_graph() -> Result<()> {
    let project = Project::new()?;
    project.rule_file("main.o:\n.PHONY: clean\nclean:\n\trm -f main.o\n")?;
    project.write("main.c", "")?;

    mymake(&project)?
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "main.o: main.c\n\tcc -c -o main.o main.c\n",
        ))
        .stdout(predicate::str::contains("(phony)\nclean:\n\trm -f main.o\n"));
    Ok(())
}

#[test]
fn dry_run_prints_without_running() -> Result<()> {
    let project = Project::new()?;
    project.rule_file("made:\n\ttouch made\n")?;

    mymake(&project)?
        .arg("-n")
        .assert()
        .success()
        .stdout("touch made\n");

    ensure!(!project.exists("made"), "dry run must not run commands");
    Ok(())
}

#[test]
fn shell_exit_status_is_reported() -> Result<()> {
    let project = Project::new()?;
    let shell = FakeShell::new()?;
    project.rule_file("all:\n\techo first\n\texit 4\n\techo never\n")?;

    mymake(&project)?
        .env(SHELL_ENV, shell.path().as_str())
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Command for target 'all' failed with exit status 4",
        ));

    ensure!(
        shell.commands() == ["echo first", "exit 4"],
        "{:?}",
        shell.commands()
    );
    Ok(())
}

#[test]
fn directory_and_file_options_are_honoured() -> Result<()> {
    let outer = Project::new()?;
    outer.write("sub/rules.mk", "here.txt:\n\tpwd > here.txt\n")?;

    mymake(&outer)?
        .args(["-C", "sub", "--cache-file", "rules.cache"])
        .env(RULE_FILE_ENV, "rules.mk")
        .assert()
        .success();

    ensure!(outer.exists("sub/here.txt"), "command runs inside -C");
    ensure!(outer.exists("sub/rules.cache"), "cache lives in -C");
    ensure!(!outer.exists("here.txt"), "nothing written outside -C");
    Ok(())
}

#[test]
fn no_cache_leaves_no_file() -> Result<()> {
    let project = Project::new()?;
    project.rule_file(".PHONY: all\nall:\n\ttrue\n")?;

    mymake(&project)?.arg("--no-cache").assert().success();

    ensure!(!project.exists(DEFAULT_CACHE_FILE), "no cache file");
    Ok(())
}
