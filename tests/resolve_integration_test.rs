/*!
 * Integration tests for manifest resolution
 *
 * Drives full load-resolve-persist sessions against real files in a
 * temporary directory, with operator answers scripted through an in-memory
 * reader.
 */

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::io::Cursor;

use dupsweep::{
    config::{MalformedPolicy, ResolveConfig, ResolveMode},
    core::dry_run::DryRunSimulator,
    error::DupError,
    resolve::{resolve_manifest, LocalFs, TerminalOperator},
    PersistOutcome, StopReason,
};

#[cfg(unix)]
use dupsweep::core::hardlink::is_same_file;

const H1: &str = "d41d8cd98f00b204e9800998ecf8427e";
const H2: &str = "0cc175b9c0f1b6a831c399e269772661";
const H3: &str = "92eb5ffee6ae2fec3ad71c777531578f";

fn line(file: &assert_fs::fixture::ChildPath, hash: &str, inode: u32) -> String {
    format!("{}!*END*! {} {} f\n", file.path().display(), hash, inode)
}

fn operator(input: &str) -> TerminalOperator<Cursor<Vec<u8>>, Vec<u8>> {
    TerminalOperator::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

fn link_config() -> ResolveConfig {
    ResolveConfig {
        mode: ResolveMode::Link,
        ..Default::default()
    }
}

#[cfg(unix)]
#[test]
fn test_preserve_and_link_two_member_group() {
    let temp = TempDir::new().unwrap();
    let a = temp.child("a.txt");
    let b = temp.child("b.txt");
    a.write_str("same").unwrap();
    b.write_str("same").unwrap();
    let manifest = temp.child("dups.txt");
    manifest
        .write_str(&(line(&a, H1, 100) + &line(&b, H1, 101)))
        .unwrap();

    let report =
        resolve_manifest(manifest.path(), &link_config(), operator("0\n"), LocalFs).unwrap();

    a.assert("same");
    b.assert("same");
    assert!(is_same_file(a.path(), b.path()).unwrap());

    assert_eq!(report.stop, StopReason::Exhausted);
    assert_eq!(report.stats.files_removed, 1);
    assert_eq!(report.stats.links_created, 1);
    assert_eq!(report.remaining_bytes, 0);
    manifest.assert("");
}

#[test]
fn test_delete_all_removes_every_member_even_in_link_mode() {
    let temp = TempDir::new().unwrap();
    let a = temp.child("a.txt");
    let b = temp.child("b.txt");
    a.write_str("same").unwrap();
    b.write_str("same").unwrap();
    let manifest = temp.child("dups.txt");
    manifest
        .write_str(&(line(&a, H1, 100) + &line(&b, H1, 101)))
        .unwrap();

    let report =
        resolve_manifest(manifest.path(), &link_config(), operator("-5\n"), LocalFs).unwrap();

    a.assert(predicate::path::missing());
    b.assert(predicate::path::missing());
    assert_eq!(report.stats.groups_deleted, 1);
    assert_eq!(report.persist, PersistOutcome::Rewritten { bytes: 0 });
    manifest.assert("");
}

#[test]
fn test_abort_persists_remaining_groups_verbatim() {
    let temp = TempDir::new().unwrap();
    let files: Vec<_> = ["a", "b", "c", "d", "e", "f"]
        .iter()
        .map(|name| {
            let child = temp.child(name);
            child.write_str(name).unwrap();
            child
        })
        .collect();

    let first = line(&files[0], H1, 1) + &line(&files[1], H1, 2);
    let second = line(&files[2], H2, 3) + &line(&files[3], H2, 4);
    // Odd spacing in the surviving group must come back unchanged
    let third = format!(
        "{}!*END*!\t{} 5 s\n{}!*END*!{} 6 f\n",
        files[4].path().display(),
        H3,
        files[5].path().display(),
        H3
    );

    let manifest = temp.child("dups.txt");
    manifest
        .write_str(&format!("{first}{second}{third}"))
        .unwrap();

    let config = ResolveConfig::default();
    let report =
        resolve_manifest(manifest.path(), &config, operator("1\n-1\n7\n"), LocalFs).unwrap();

    files[0].assert(predicate::path::missing());
    files[1].assert("b");
    for untouched in &files[2..] {
        untouched.assert(predicate::path::exists());
    }

    assert_eq!(report.stop, StopReason::Aborted);
    assert_eq!(report.stats.groups_seen, 3);
    assert_eq!(report.stats.groups_skipped, 1);
    manifest.assert(predicate::str::diff(third.clone()));
}

#[test]
fn test_abort_on_first_group_leaves_manifest_untouched() {
    let temp = TempDir::new().unwrap();
    let a = temp.child("a.txt");
    let b = temp.child("b.txt");
    a.write_str("x").unwrap();
    b.write_str("x").unwrap();
    let contents = line(&a, H1, 1) + &line(&b, H1, 2);
    let manifest = temp.child("dups.txt");
    manifest.write_str(&contents).unwrap();

    let config = ResolveConfig::default();
    let report = resolve_manifest(manifest.path(), &config, operator("q\n"), LocalFs).unwrap();

    // Non-numeric answer re-prompts; end of input then aborts
    assert_eq!(report.stop, StopReason::Aborted);
    assert_eq!(report.persist, PersistOutcome::Untouched);
    manifest.assert(predicate::str::diff(contents.clone()));
    a.assert(predicate::path::exists());
    b.assert(predicate::path::exists());
}

#[test]
fn test_missing_member_reported_and_group_continues() {
    let temp = TempDir::new().unwrap();
    let keep = temp.child("keep.txt");
    let gone = temp.child("gone.txt");
    let extra = temp.child("extra.txt");
    keep.write_str("x").unwrap();
    extra.write_str("x").unwrap();
    let manifest = temp.child("dups.txt");
    manifest
        .write_str(&(line(&keep, H1, 1) + &line(&gone, H1, 2) + &line(&extra, H1, 3)))
        .unwrap();

    let config = ResolveConfig::default();
    let report = resolve_manifest(manifest.path(), &config, operator("0\n"), LocalFs).unwrap();

    keep.assert(predicate::path::exists());
    extra.assert(predicate::path::missing());
    assert_eq!(report.stats.failures, 1);
    assert_eq!(report.stats.files_removed, 1);
    assert_eq!(report.stop, StopReason::Exhausted);
}

#[test]
fn test_malformed_line_stops_and_stays_in_tail() {
    let temp = TempDir::new().unwrap();
    let a = temp.child("a.txt");
    let b = temp.child("b.txt");
    a.write_str("x").unwrap();
    b.write_str("x").unwrap();
    let tail = format!("garbage without terminator\n{}", line(&a, H2, 9));
    let manifest = temp.child("dups.txt");
    manifest
        .write_str(&format!("{}{}{}", line(&a, H1, 1), line(&b, H1, 2), tail))
        .unwrap();

    let config = ResolveConfig::default();
    let report = resolve_manifest(manifest.path(), &config, operator("-1\n"), LocalFs).unwrap();

    assert_eq!(report.stop, StopReason::Malformed);
    assert_eq!(report.stats.malformed_lines, 1);
    manifest.assert(predicate::str::diff(tail.clone()));
}

#[test]
fn test_malformed_manifest_rejected_up_front() {
    let temp = TempDir::new().unwrap();
    let a = temp.child("a.txt");
    a.write_str("x").unwrap();
    let contents = format!("{}{}{}", line(&a, H1, 1), line(&a, H1, 2), "broken\n");
    let manifest = temp.child("dups.txt");
    manifest.write_str(&contents).unwrap();

    let config = ResolveConfig {
        on_malformed: MalformedPolicy::Reject,
        ..Default::default()
    };
    let err = resolve_manifest(manifest.path(), &config, operator("-5\n"), LocalFs).unwrap_err();

    assert!(matches!(err, DupError::MalformedRecord { line: 3, .. }));
    a.assert(predicate::path::exists());
    manifest.assert(predicate::str::diff(contents.clone()));
}

#[test]
fn test_dry_run_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let a = temp.child("a.txt");
    let b = temp.child("b.txt");
    a.write_str("x").unwrap();
    b.write_str("x").unwrap();
    let contents = line(&a, H1, 1) + &line(&b, H1, 2);
    let manifest = temp.child("dups.txt");
    manifest.write_str(&contents).unwrap();

    let config = ResolveConfig {
        mode: ResolveMode::Link,
        dry_run: true,
        ..Default::default()
    };
    let mut simulator = DryRunSimulator::new();
    let report =
        resolve_manifest(manifest.path(), &config, operator("0\n"), &mut simulator).unwrap();

    assert_eq!(report.persist, PersistOutcome::DryRun);
    assert_eq!(simulator.summary().remove_count, 1);
    assert_eq!(simulator.summary().link_count, 1);
    b.assert(predicate::path::exists());
    manifest.assert(predicate::str::diff(contents.clone()));
}

#[test]
fn test_missing_manifest_is_fatal() {
    let temp = TempDir::new().unwrap();
    let config = ResolveConfig::default();
    let err = resolve_manifest(
        temp.child("nope.txt").path(),
        &config,
        operator(""),
        LocalFs,
    )
    .unwrap_err();

    assert!(matches!(err, DupError::ManifestNotFound(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_directory_manifest_is_fatal() {
    let temp = TempDir::new().unwrap();
    let config = ResolveConfig::default();
    let err = resolve_manifest(temp.path(), &config, operator(""), LocalFs).unwrap_err();

    assert!(matches!(err, DupError::NotARegularFile(_)));
}

#[cfg(unix)]
#[test]
fn test_symlinked_manifest_keeps_link_and_updates_target() {
    let temp = TempDir::new().unwrap();
    let files: Vec<_> = ["a", "b", "c", "d"]
        .iter()
        .map(|name| {
            let child = temp.child(name);
            child.write_str(name).unwrap();
            child
        })
        .collect();
    let first = line(&files[0], H1, 1) + &line(&files[1], H1, 2);
    let second = line(&files[2], H2, 3) + &line(&files[3], H2, 4);

    let real = temp.child("real.txt");
    real.write_str(&format!("{first}{second}")).unwrap();
    let manifest = temp.child("dups.txt");
    manifest.symlink_to_file(real.path()).unwrap();

    let config = ResolveConfig::default();
    let report =
        resolve_manifest(manifest.path(), &config, operator("-1\n9\n"), LocalFs).unwrap();

    assert_eq!(report.stop, StopReason::Aborted);
    assert!(std::fs::symlink_metadata(manifest.path())
        .unwrap()
        .file_type()
        .is_symlink());
    real.assert(predicate::str::diff(second.clone()));
}
