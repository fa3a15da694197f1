//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! The controller calls store methods: it never executes SQL directly.

use crate::{error::SimResult, event::EventLogEntry, types::DrawIndex};
mod draw_log;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SimStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl SimStore {
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases this is a new, empty database.
    pub fn reopen(&self) -> SimResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Seed a run was started with, if the run exists.
    pub fn run_seed(&self, run_id: &str) -> SimResult<Option<u64>> {
        let seed = self
            .conn
            .query_row(
                "SELECT seed FROM run WHERE run_id = ?1",
                params![run_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(seed.map(|s| s as u64))
    }

    /// Drop every draw, event and snapshot recorded after `draw_index`.
    pub fn truncate_after(&self, run_id: &str, draw_index: DrawIndex) -> SimResult<()> {
        let n = draw_index as i64;
        self.conn.execute(
            "DELETE FROM draw_log WHERE run_id = ?1 AND draw_index > ?2",
            params![run_id, n],
        )?;
        self.conn.execute(
            "DELETE FROM event_log WHERE run_id = ?1 AND draw_index > ?2",
            params![run_id, n],
        )?;
        self.conn.execute(
            "DELETE FROM snapshot WHERE run_id = ?1 AND draw_index > ?2",
            params![run_id, n],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, draw_index, event_type, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.run_id,
                entry.draw_index as i64,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_run(&self, run_id: &str) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, draw_index, event_type, payload
             FROM event_log WHERE run_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    run_id: row.get(1)?,
                    draw_index: row.get::<_, i64>(2)? as u64,
                    event_type: row.get(3)?,
                    payload: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(&self, run_id: &str, draw_index: DrawIndex, state_json: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshot (run_id, draw_index, state_json) VALUES (?1, ?2, ?3)",
            params![run_id, draw_index as i64, state_json],
        )?;
        Ok(())
    }

    pub fn latest_snapshot(&self, run_id: &str) -> SimResult<Option<(DrawIndex, String)>> {
        let result = self
            .conn
            .query_row(
                "SELECT draw_index, state_json FROM snapshot
                 WHERE run_id = ?1
                 ORDER BY draw_index DESC LIMIT 1",
                params![run_id],
                |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(result)
    }
}
