use crate::common::command::{
    head_commit_id, init_repository_dir, mim_commit, repository_dir, run_mim_command, stdout_of,
};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn first_commit_records_the_file_table(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_mim_command(dir, &["init"]).assert().success();
    write_file(FileSpec::new(dir.join("a.txt"), "x\n".to_string()));
    run_mim_command(dir, &["add", "a.txt"]).assert().success();

    mim_commit(dir, "c1")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[master \(root-commit\) [0-9a-f]{7}\] c1\n$").unwrap());

    let blob_id = stdout_of(run_mim_command(dir, &["hash-object", "a.txt"]));
    let head = head_commit_id(dir);
    let commit = stdout_of(run_mim_command(dir, &["cat-file", "-p", &head]));
    assert_eq!(
        commit,
        format!(
            "commit {head}\n\
             author fake_user <fake_email@email.com> 2023-01-01T12:00:00Z\n\
             committer fake_user <fake_email@email.com> 2023-01-01T12:00:00Z\n\
             \n\
             c1\n\
             \n\
             files:\n\
             a.txt\t{}\n",
            blob_id.trim()
        )
    );

    let history = stdout_of(run_mim_command(dir, &["log", "--oneline"]));
    assert_eq!(history.lines().count(), 1);
}

#[rstest]
fn commit_without_staged_files_fails_and_writes_nothing(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let head = head_commit_id(dir);
    let objects_before = walkdir_count(&dir.join(".mim").join("objects"));

    mim_commit(dir, "nothing here")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    assert_eq!(head_commit_id(dir), head);
    assert_eq!(walkdir_count(&dir.join(".mim").join("objects")), objects_before);
}

#[rstest]
fn commit_without_commits_or_staged_files_fails(repository_dir: TempDir) {
    run_mim_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    mim_commit(repository_dir.path(), "empty")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));
}

#[rstest]
fn second_commit_links_to_its_parent(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = head_commit_id(dir);
    write_file(FileSpec::new(dir.join("1.txt"), "uno\n".to_string()));
    run_mim_command(dir, &["add", "1.txt"]).assert().success();

    mim_commit(dir, "Second commit")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[master [0-9a-f]{7}\] Second commit\n$").unwrap());

    let second = head_commit_id(dir);
    let commit = stdout_of(run_mim_command(dir, &["cat-file", "-p", &second]));
    assert!(commit.contains(&format!("\nparent {first}\n")));
    // unchanged files carry over from the parent
    assert!(commit.contains("a/b/3.txt\t"));
}

#[rstest]
fn show_multiple_commits_in_medium_format(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = head_commit_id(dir);
    write_file(FileSpec::new(dir.join("1.txt"), "uno\n".to_string()));
    run_mim_command(dir, &["add", "1.txt"]).assert().success();
    mim_commit(dir, "Second commit\n\nWith a body").assert().success();
    let second = head_commit_id(dir);

    let log = stdout_of(run_mim_command(dir, &["log"]));

    assert_eq!(
        log,
        format!(
            "commit {second}\n\
             Author: fake_user <fake_email@email.com>\n\
             Date:   Sun Jan 1 12:00:00 2023 +0000\n\
             \n    Second commit\n    \n    With a body\n\
             \n\
             commit {first}\n\
             Author: fake_user <fake_email@email.com>\n\
             Date:   Sun Jan 1 12:00:00 2023 +0000\n\
             \n    Initial commit\n\
             \n"
        )
    );
}

#[rstest]
fn show_limited_history_in_oneline_format(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let mut ids = Vec::new();
    for content in ["2\n", "3\n"] {
        write_file(FileSpec::new(dir.join("1.txt"), content.to_string()));
        run_mim_command(dir, &["add", "1.txt"]).assert().success();
        mim_commit(dir, &format!("Set to {}", content.trim()))
            .assert()
            .success();
        ids.push(head_commit_id(dir));
    }

    let log = stdout_of(run_mim_command(dir, &["log", "--oneline", "-n", "2"]));

    assert_eq!(
        log,
        format!("{} Set to 3\n{} Set to 2\n", &ids[1][..7], &ids[0][..7])
    );
}

#[rstest]
fn show_log_with_no_commits(repository_dir: TempDir) {
    run_mim_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_mim_command(repository_dir.path(), &["log"])
        .assert()
        .success()
        .stdout("");
}

#[rstest]
fn write_blob_object_successfully(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_mim_command(dir, &["init"]).assert().success();
    write_file(FileSpec::new(dir.join("blob.txt"), "raw content".to_string()));

    let object_id = stdout_of(run_mim_command(dir, &["hash-object", "-w", "blob.txt"]));
    let object_id = object_id.trim();

    assert!(
        dir.join(".mim")
            .join("objects")
            .join(&object_id[..2])
            .join(&object_id[2..])
            .is_file()
    );
    run_mim_command(dir, &["cat-file", "-p", &object_id[..8]])
        .assert()
        .success()
        .stdout("raw content");
}

#[rstest]
fn hash_object_without_write_stores_nothing(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_mim_command(dir, &["init"]).assert().success();
    write_file(FileSpec::new(dir.join("blob.txt"), "raw content".to_string()));

    let object_id = stdout_of(run_mim_command(dir, &["hash-object", "blob.txt"]));

    run_mim_command(dir, &["cat-file", "-p", object_id.trim()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("object not found"));
}

#[rstest]
fn identical_content_is_stored_once(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_mim_command(dir, &["init"]).assert().success();
    write_file(FileSpec::new(dir.join("a.txt"), "same\n".to_string()));
    write_file(FileSpec::new(dir.join("b.txt"), "same\n".to_string()));

    run_mim_command(dir, &["add", "a.txt", "b.txt"])
        .assert()
        .success();

    assert_eq!(walkdir_count(&dir.join(".mim").join("objects")), 1);
}

fn walkdir_count(dir: &std::path::Path) -> usize {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count()
}
