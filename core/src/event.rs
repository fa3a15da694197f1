//! Simulation events.
//!
//! RULE: the manager and controller report what happened only through
//! these events. Whoever drives the run (runner, IPC loop, tests)
//! decides whether to print, persist or ignore them.

use serde::{Deserialize, Serialize};

use crate::types::{DrawDate, DrawIndex, Money, RunId};

/// Variants are append-only; stored payloads must keep parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    GameChanged {
        previous: Option<String>,
        game_id: String,
        label: String,
    },
    DrawCompleted {
        draw_index: DrawIndex,
        date: DrawDate,
        game_id: String,
        spent: Money,
        won: Money,
        category: Option<String>,
    },
    JackpotWon {
        draw_index: DrawIndex,
        date: DrawDate,
        game_id: String,
        amount: Money,
        winners: u64,
        player_won: bool,
    },
    ReserveDebtIncurred {
        draw_index: DrawIndex,
        date: DrawDate,
        game_id: String,
        debt: Money,
    },
    RunCompleted {
        draws: u64,
        total_spent: Money,
        total_won: Money,
    },
}

impl SimEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. } => "run_initialized",
            Self::GameChanged { .. } => "game_changed",
            Self::DrawCompleted { .. } => "draw_completed",
            Self::JackpotWon { .. } => "jackpot_won",
            Self::ReserveDebtIncurred { .. } => "reserve_debt_incurred",
            Self::RunCompleted { .. } => "run_completed",
        }
    }

    /// Draw the event belongs to; 0 for run-level events.
    pub fn draw_index(&self) -> DrawIndex {
        match self {
            Self::DrawCompleted { draw_index, .. }
            | Self::JackpotWon { draw_index, .. }
            | Self::ReserveDebtIncurred { draw_index, .. } => *draw_index,
            _ => 0,
        }
    }
}

/// A persisted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub draw_index: DrawIndex,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}

impl EventLogEntry {
    pub fn from_event(run_id: &str, event: &SimEvent) -> serde_json::Result<Self> {
        Ok(Self {
            id: None,
            run_id: run_id.to_string(),
            draw_index: event.draw_index(),
            event_type: event.event_type().to_string(),
            payload: serde_json::to_string(event)?,
        })
    }

    pub fn event(&self) -> serde_json::Result<SimEvent> {
        serde_json::from_str(&self.payload)
    }
}
