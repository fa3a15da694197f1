//! Spanish lottery draw simulator.
//!
//! Nine games share one pipeline: a seeded draw, an estimate of how many
//! bets the world placed, prize pools split by category, and the
//! player's result. The controller repeats that over a draw calendar.

pub mod bonoloto_engine;
pub mod clock;
pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod eurodreams_engine;
pub mod euromillones_engine;
pub mod event;
pub mod gordo_engine;
pub mod investment;
pub mod loteria_engine;
pub mod lototurf_engine;
pub mod manager;
pub mod pools;
pub mod primitiva_engine;
pub mod quiniela_engine;
pub mod quinigol_engine;
pub mod registry;
pub mod rng;
pub mod selection;
pub mod side_game;
pub mod simulation;
pub mod six49;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod types;
pub mod ui;
