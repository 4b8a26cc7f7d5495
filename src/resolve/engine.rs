/*!
 * Resolution engine
 *
 * Drives the session: partition the manifest, ask the operator about each
 * group, apply removals and links, and track the persistence cursor. The loop
 * has three exits: the manifest runs out, the operator aborts, or the
 * partitioner stops on a malformed or oversized group.
 */

use serde::Serialize;
use std::borrow::Cow;
use std::io;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::cli_style;
use crate::config::{MalformedPolicy, ResolveConfig};
use crate::error::{DupError, Result};
use crate::manifest::{
    check_manifest, load_manifest, persist_tail, Group, ManifestBuffer, Partitioner,
    PersistOutcome, Presence,
};
use crate::resolve::decision::Decision;
use crate::resolve::fs::FileOps;
use crate::resolve::operator::Operator;
use crate::stats::SessionStats;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every group was consumed
    Exhausted,
    /// The operator chose to quit, or input ran out
    Aborted,
    /// Scanning stopped at a malformed line
    Malformed,
    /// A group exceeded the size bound under the reject policy
    Overflow,
}

/// Result of running the engine over a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Offset of the first unresolved byte
    pub write_from: usize,
    pub stop: StopReason,
    pub stats: SessionStats,
}

/// Everything a caller needs after a full load-resolve-persist cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub stop: StopReason,
    pub stats: SessionStats,
    pub persist: PersistOutcome,
    /// Bytes of the manifest still unresolved
    pub remaining_bytes: usize,
}

/// Resolves duplicate groups one at a time
pub struct Resolver<'c, O, F> {
    config: &'c ResolveConfig,
    operator: O,
    fs: F,
    stats: SessionStats,
}

impl<'c, O: Operator, F: FileOps> Resolver<'c, O, F> {
    pub fn new(config: &'c ResolveConfig, operator: O, fs: F) -> Self {
        Self {
            config,
            operator,
            fs,
            stats: SessionStats::default(),
        }
    }

    /// Give back the filesystem seam, e.g. to inspect a dry run
    pub fn into_parts(self) -> (O, F) {
        (self.operator, self.fs)
    }

    /// Run the session over `buf`.
    ///
    /// Only a manifest refused by [`MalformedPolicy::Reject`] is an error;
    /// everything else is reported and reflected in the returned [`Session`].
    pub fn run(&mut self, buf: &[u8]) -> Result<Session> {
        if self.config.on_malformed == MalformedPolicy::Reject {
            let records = check_manifest(buf, self.config.path_terminator.as_bytes())?;
            debug!("Manifest passed validation with {} records", records);
        }

        let mut write_from = 0;
        let mut stop = StopReason::Exhausted;

        for item in Partitioner::new(buf, self.config) {
            let group = match item {
                Ok(group) => group,
                Err(err @ DupError::MalformedRecord { .. }) => {
                    self.stats.malformed_lines += 1;
                    report(&err);
                    if self.config.on_malformed == MalformedPolicy::Skip {
                        continue;
                    }
                    stop = StopReason::Malformed;
                    break;
                }
                Err(err @ DupError::GroupOverflow { .. }) => {
                    report(&err);
                    stop = StopReason::Overflow;
                    break;
                }
                Err(err) => return Err(err),
            };

            if group.excess() > 0 {
                self.stats.truncated_members += group.excess() as u64;
                report(&DupError::GroupOverflow {
                    hash: group.hash_str().into_owned(),
                    line: group.first_line(),
                    members: group.len() + group.excess(),
                    limit: self.config.max_group_size,
                });
            }

            self.stats.groups_seen += 1;
            let decision = match self.operator.choose(&group, self.config.mode) {
                // An index outside the group never selects a survivor
                Ok(Decision::Preserve(index)) if index >= group.len() => Decision::Abort,
                Ok(decision) => decision,
                Err(err) => {
                    report(&err);
                    Decision::Abort
                }
            };
            debug!(
                line = group.first_line(),
                hash = %group.hash_str(),
                ?decision,
                "Operator decision"
            );

            if !decision.consumes_group() {
                stop = StopReason::Aborted;
                break;
            }
            match decision {
                Decision::Skip => self.stats.groups_skipped += 1,
                Decision::DeleteAll => self.apply(&group, None),
                Decision::Preserve(index) => self.apply(&group, Some(index)),
                Decision::Abort => {}
            }

            write_from = group.end();
        }

        info!(
            ?stop,
            groups = self.stats.groups_consumed(),
            removed = self.stats.files_removed,
            linked = self.stats.links_created,
            "Session finished"
        );

        Ok(Session {
            write_from,
            stop,
            stats: self.stats.clone(),
        })
    }

    /// Remove every member except `preserved`, then relink if configured.
    ///
    /// All removals are attempted before the sync barrier and before any link.
    /// A failure on one member is reported and does not stop the others.
    fn apply(&mut self, group: &Group<'_>, preserved: Option<usize>) {
        let keep = preserved.map(|i| group.members()[i].path());
        let mut relink = Vec::with_capacity(group.len());

        for (index, record) in group.members().iter().enumerate() {
            if Some(index) == preserved {
                continue;
            }
            let path = record.path();
            if keep.as_deref() == Some(&*path) {
                warn!("{} is listed twice in its group; keeping it", path.display());
                cli_style::print_warning(&format!(
                    "{} is listed twice in its group; keeping it",
                    path.display()
                ));
                continue;
            }

            match self.fs.remove(&path) {
                Ok(()) => {
                    debug!("Removed {}", path.display());
                    self.stats.files_removed += 1;
                    relink.push(path);
                }
                Err(e) => {
                    self.member_failure("remove", &path, &e);
                    // Already gone: still give the path back as a link
                    if e.kind() == io::ErrorKind::NotFound {
                        relink.push(path);
                    }
                }
            }
        }

        if self.config.sync_after_remove {
            self.fs.sync();
        }

        let Some(keep) = keep else {
            self.stats.groups_deleted += 1;
            return;
        };
        self.stats.groups_preserved += 1;

        if self.config.mode.links() {
            self.relink(&keep, &relink);
        }
    }

    fn relink(&mut self, keep: &Path, paths: &[Cow<'_, Path>]) {
        for path in paths {
            match self.fs.hard_link(keep, path) {
                Ok(()) => {
                    debug!("Linked {} -> {}", path.display(), keep.display());
                    self.stats.links_created += 1;
                }
                Err(e) => self.member_failure("link", path, &e),
            }
        }
    }

    fn member_failure(&mut self, action: &str, path: &Path, err: &io::Error) {
        self.stats.failures += 1;
        error!(action, path = %path.display(), "{}", err);
        cli_style::print_error(&format!("{}: {}", path.display(), err), None);
    }
}

/// Load the manifest at `path`, run a session over it and write back the
/// unresolved tail.
///
/// The manifest is not rewritten in dry-run mode.
pub fn resolve_manifest<O: Operator, F: FileOps>(
    path: &Path,
    config: &ResolveConfig,
    operator: O,
    fs: F,
) -> Result<SessionReport> {
    resolve_manifest_with(path, config, operator, fs, persist_tail)
}

/// [`resolve_manifest`] with the final manifest rewrite supplied by the caller
pub(crate) fn resolve_manifest_with<O, F, P>(
    path: &Path,
    config: &ResolveConfig,
    operator: O,
    fs: F,
    persist: P,
) -> Result<SessionReport>
where
    O: Operator,
    F: FileOps,
    P: FnOnce(&ManifestBuffer, usize) -> Result<PersistOutcome>,
{
    config.validate()?;

    let manifest = load_manifest(path, Presence::Required)?
        .ok_or_else(|| DupError::ManifestNotFound(path.to_path_buf()))?;

    let session = Resolver::new(config, operator, fs).run(manifest.as_bytes())?;
    let persist = finish(&manifest, &session, config, persist)?;

    Ok(SessionReport {
        stop: session.stop,
        remaining_bytes: manifest.len() - session.write_from,
        stats: session.stats,
        persist,
    })
}

fn finish<P>(
    manifest: &ManifestBuffer,
    session: &Session,
    config: &ResolveConfig,
    persist: P,
) -> Result<PersistOutcome>
where
    P: FnOnce(&ManifestBuffer, usize) -> Result<PersistOutcome>,
{
    if config.dry_run {
        return Ok(PersistOutcome::DryRun);
    }
    let outcome = persist(manifest, session.write_from)?;
    if let PersistOutcome::Incomplete { expected, actual } = outcome {
        let err = DupError::ShortWrite {
            path: manifest.path().to_path_buf(),
            expected,
            actual,
        };
        cli_style::print_warning(&err.to_string());
    }
    Ok(outcome)
}

/// Diagnose a non-fatal condition to the log and the operator
fn report(err: &DupError) {
    warn!(category = %err.category(), "{}", err);
    cli_style::print_warning(&err.to_string());
}
