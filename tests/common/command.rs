use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository with one commit holding `1.txt`, `a/2.txt` and `a/b/3.txt`
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_mim_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three\n".to_string(),
    ));

    run_mim_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    mim_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_mim_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("mim").expect("Failed to find mim binary");
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("MIM_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn mim_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_mim_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("GIT_AUTHOR_NAME", "fake_user"),
        ("GIT_AUTHOR_EMAIL", "fake_email@email.com"),
        ("GIT_AUTHOR_DATE", "2023-01-01 12:00:00 +0000"),
    ]);
    cmd
}

/// Run a command that must succeed and return its stdout
pub fn stdout_of(mut cmd: Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("stdout is not UTF-8")
}

/// Full ID of the commit HEAD resolves to, read through `log`
pub fn head_commit_id(dir: &Path) -> String {
    let log = stdout_of(run_mim_command(dir, &["log", "-n", "1"]));
    log.lines()
        .next()
        .and_then(|line| line.strip_prefix("commit "))
        .expect("log has no commit line")
        .to_string()
}
