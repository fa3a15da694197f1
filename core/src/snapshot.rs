//! Snapshot serialization: controller and engine state to/from JSON.
//!
//! A snapshot is taken every SNAPSHOT_INTERVAL draws of a persisted run.
//! It captures everything needed to resume the run from that draw
//! without replaying from the first one. Draw records are not part of
//! it; they are reloaded from the draw log.

use serde::{Deserialize, Serialize};

use crate::{
    clock::DrawClock,
    simulation::BiggestPrize,
    types::{DrawIndex, GameId, Money, RunId},
};

pub const SNAPSHOT_INTERVAL: DrawIndex = 104; // about a year of twice-weekly draws

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimSnapshot {
    pub run_id: RunId,
    pub draw_index: DrawIndex,
    pub game_id: GameId,
    pub clock: DrawClock,
    /// Opaque engine state from `DrawEngine::snapshot_state`.
    pub engine_state: serde_json::Value,
    pub total_draws: u64,
    pub total_spent: Money,
    pub total_won: Money,
    pub biggest_prize: Option<BiggestPrize>,
}

impl SimSnapshot {
    pub fn is_due(draw_index: DrawIndex) -> bool {
        draw_index > 0 && draw_index % SNAPSHOT_INTERVAL == 0
    }
}
