//! batch migration over a content store
//!
//! items are processed one at a time with no rollback across items: one
//! item's persistence failure must not abort the rest. a process-wide
//! "migration completed" flag gates the pending scan so repeated upgrade
//! checks short-circuit once nothing qualifies anywhere.

use serde::Serialize;

use super::legacy;
use super::marker;
use super::store::StoreError;

/// load/save seam to the external content store
pub trait ContentStore {
    /// ids of all items whose body contains the given substring
    fn list_matching(&self, needle: &str) -> Result<Vec<String>, StoreError>;
    fn load(&self, id: &str) -> Result<String, StoreError>;
    fn save(&self, id: &str, body: &str) -> Result<(), StoreError>;
}

/// read/write seam for the migration-completed flag
pub trait FlagStore {
    fn migration_done(&self) -> bool;
    fn set_migration_done(&self, done: bool) -> Result<(), StoreError>;
}

/// outcome counts of one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    /// items carrying the block marker
    pub scanned: usize,
    /// items rewritten (or that would be, in dry-run mode)
    pub migrated: usize,
    /// items whose load or save failed
    pub failed: usize,
}

/// migrate every item carrying the block marker
///
/// per-item failures are counted and reported, not propagated. when a run
/// finishes with no failures the completed flag is set: nothing pending
/// remains, so future scans can short-circuit. dry runs report what would
/// change without writing content or the flag.
pub fn run(
    content: &dyn ContentStore,
    flags: &dyn FlagStore,
    dry_run: bool,
) -> Result<MigrationSummary, StoreError> {
    let ids = content.list_matching(marker::BLOCK_NAME)?;

    let mut summary = MigrationSummary::default();
    for id in ids {
        summary.scanned += 1;

        let body = match content.load(&id) {
            Ok(body) => body,
            Err(e) => {
                eprintln!("warning: {}", e);
                summary.failed += 1;
                continue;
            }
        };

        let migrated = legacy::migrate_content(&body);
        if migrated == body {
            continue;
        }

        if dry_run {
            summary.migrated += 1;
            continue;
        }

        match content.save(&id, &migrated) {
            Ok(()) => summary.migrated += 1,
            Err(e) => {
                eprintln!("warning: {}", e);
                summary.failed += 1;
            }
        }
    }

    if !dry_run && summary.failed == 0 {
        flags.set_migration_done(true)?;
    }

    Ok(summary)
}

/// ids of items still carrying qualifying legacy markers
///
/// short-circuits to empty once the completed flag is set; sets the flag
/// when a full scan finds nothing pending.
pub fn pending(
    content: &dyn ContentStore,
    flags: &dyn FlagStore,
) -> Result<Vec<String>, StoreError> {
    if flags.migration_done() {
        return Ok(Vec::new());
    }

    let mut pending = Vec::new();
    for id in content.list_matching(marker::BLOCK_NAME)? {
        let body = content.load(&id)?;
        if legacy::has_pending(&body) {
            pending.push(id);
        }
    }

    if pending.is_empty() {
        flags.set_migration_done(true)?;
    }

    Ok(pending)
}
