use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use crate::migrations;
use crate::store::StoreResult;

const READERS: usize = 4;

/// The durable credential store.
///
/// Every mutation (user, toilet and review inserts, conditional deletes) goes
/// through the single writer, so SQLite constraint checks and the
/// `id AND founder_id` delete are serialized. Listing and lookups are spread
/// over read-only connections, which WAL lets run alongside the writer.
pub struct Database {
    writer: Mutex<Connection>,
    readers: ReaderPool,
}

/// Read-only connections handed out in turn.
struct ReaderPool {
    conns: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReaderPool {
    fn open(path: &Path, size: usize) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conns = (0..size)
            .map(|_| Connection::open_with_flags(path, flags).map(Mutex::new))
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("opening read-only connections")?;

        Ok(Self {
            conns,
            next: AtomicUsize::new(0),
        })
    }

    fn acquire(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        let conn = self.conns[idx]
            .lock()
            .map_err(|e| anyhow::anyhow!("reader {} poisoned: {}", idx, e))?;
        Ok(conn)
    }
}

impl Database {
    /// Opens (or creates) the file, migrates it and sets up the reader pool.
    /// Readers are opened after migrating so they see the tables.
    pub fn open(path: &Path) -> Result<Self> {
        let writer = Connection::open(path)
            .with_context(|| format!("opening database at {}", path.display()))?;
        writer.pragma_update(None, "journal_mode", "WAL")?;
        // Review and toilet references are enforced by SQLite itself.
        writer.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&writer)?;

        let readers = ReaderPool::open(path, READERS)?;
        info!("Toilet store ready at {} ({} readers)", path.display(), READERS);

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
        })
    }

    /// Runs a lookup on the next reader.
    pub(crate) fn read<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.readers.acquire()?;
        f(&conn)
    }

    /// Runs a mutation on the writer, holding it for the whole closure.
    pub(crate) fn write<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("writer poisoned: {}", e))?;
        f(&conn)
    }
}
