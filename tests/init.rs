use crate::common::command::{repository_dir, run_mim_command, stdout_of};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn init_repository_successfully(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let dir_absolute_path = repository_dir.path().canonicalize()?.display().to_string();

    run_mim_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^Initialized empty mim repository in .+\.mim\n$",
        )?)
        .stdout(predicate::str::contains(dir_absolute_path));

    assert!(repository_dir.path().join(".mim").join("HEAD").is_file());
    assert!(repository_dir.path().join(".mim").join("objects").is_dir());
    assert!(
        repository_dir
            .path()
            .join(".mim")
            .join("config")
            .join("settings.toml")
            .is_file()
    );

    Ok(())
}

#[rstest]
fn init_at_an_explicit_path(repository_dir: TempDir) {
    let target = repository_dir.path().join("nested").join("project");

    run_mim_command(repository_dir.path(), &["init", "nested/project"])
        .assert()
        .success();

    assert!(target.join(".mim").join("HEAD").is_file());
}

#[rstest]
fn init_twice_fails(repository_dir: TempDir) {
    run_mim_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_mim_command(repository_dir.path(), &["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already a repository"));
}

#[rstest]
fn fresh_repository_is_on_master_with_nothing_to_commit(repository_dir: TempDir) {
    run_mim_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    let status = stdout_of(run_mim_command(repository_dir.path(), &["status"]));

    assert_eq!(
        status,
        "On branch master\n\nNo commits yet\n\nnothing to commit, working tree clean\n"
    );
}

#[rstest]
fn commands_outside_a_repository_fail(repository_dir: TempDir) {
    run_mim_command(repository_dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid repository"));
}

#[rstest]
#[case("sha256", 64)]
#[case("sha1", 40)]
fn init_records_the_hash_function(
    repository_dir: TempDir,
    #[case] hash: &str,
    #[case] id_length: usize,
) {
    run_mim_command(repository_dir.path(), &["init", "--hash", hash])
        .assert()
        .success();
    std::fs::write(repository_dir.path().join("a.txt"), "x\n").unwrap();

    let object_id = stdout_of(run_mim_command(
        repository_dir.path(),
        &["hash-object", "a.txt"],
    ));

    assert_eq!(object_id.trim().len(), id_length);
}
