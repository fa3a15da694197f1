//! Shared primitive types used across the entire simulator.

/// A calendar draw date. Draws never carry a time of day.
pub type DrawDate = chrono::NaiveDate;

/// Euro amounts. Prize maths is done in floating point and never rounded
/// to cents inside the engines.
pub type Money = f64;

/// The canonical run identifier.
pub type RunId = String;

/// Canonical game identifier (`primitiva`, `loteria_nacional`, ...).
pub type GameId = String;

/// Position of a draw inside a simulation run, starting at 1.
pub type DrawIndex = u64;
