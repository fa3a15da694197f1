//! Per-draw log. The full record is kept as JSON; the headline columns
//! are duplicated so the log can be queried without parsing it.

use rusqlite::params;

use super::SimStore;
use crate::{error::SimResult, simulation::DrawRecord};

impl SimStore {
    /// Insert a draw; a replayed draw with the same index overwrites it.
    pub fn append_draw(&self, run_id: &str, record: &DrawRecord) -> SimResult<()> {
        let payload = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO draw_log
                (run_id, draw_index, draw_date, game_id, spent, won, category, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run_id,
                record.draw_index as i64,
                record.date.to_string(),
                record.game_id,
                record.spent,
                record.won,
                record.category,
                payload,
            ],
        )?;
        Ok(())
    }

    pub fn draws_for_run(&self, run_id: &str) -> SimResult<Vec<DrawRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM draw_log WHERE run_id = ?1 ORDER BY draw_index ASC",
        )?;
        let payloads = stmt
            .query_map(params![run_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let mut records = Vec::with_capacity(payloads.len());
        for payload in payloads {
            records.push(serde_json::from_str(&payload)?);
        }
        Ok(records)
    }

    /// (draws, spent, won) for a run, straight from the log.
    pub fn draw_totals(&self, run_id: &str) -> SimResult<(u64, f64, f64)> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(spent), 0.0), COALESCE(SUM(won), 0.0)
             FROM draw_log WHERE run_id = ?1",
            params![run_id],
            |row| Ok((row.get::<_, i64>(0)? as u64, row.get(1)?, row.get(2)?)),
        )?)
    }
}
