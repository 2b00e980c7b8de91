mod error;
mod events;
mod helpers;
mod missions;
mod repos;
mod runs;

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

pub use error::{DbError, Result};
pub use events::{EVENTS_DEFAULT_LIMIT, EVENTS_MAX_LIMIT, clamp_event_limit};
pub use missions::{MissionChanges, MissionFilter};
pub use runs::NewAgentRun;

pub const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");

pub const MIGRATIONS: &[(&str, &str)] = &[("0001_init", MIGRATION_0001)];

/// Whether a handle may write. Read paths open read-only handles so the
/// read/write split is enforced by the connection itself rather than by
/// calling convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

pub struct Db {
    conn: Connection,
    access: Access,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn,
            access: Access::ReadWrite,
        })
    }

    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self {
            conn,
            access: Access::ReadOnly,
        })
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (_name, sql) in MIGRATIONS {
            tx.execute_batch(sql)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
