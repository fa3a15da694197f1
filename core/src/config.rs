//! Game configuration: immutable tables loaded once per run.
//!
//! Every struct is `#[serde(default)]` with the built-in tables as its
//! `Default`, so `data/catalog.json` only needs the fields it changes.
//! In tests, use `GameCatalog::default_catalog()`.

use std::path::Path;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::{
    economy::WorldBetsModel,
    error::{SimError, SimResult},
    types::Money,
};

pub mod bonoloto;
pub mod eurodreams;
pub mod euromillones;
pub mod gordo;
pub mod loteria;
pub mod lototurf;
pub mod primitiva;
pub mod quiniela;
pub mod quinigol;
pub mod side_games;

pub use bonoloto::BonolotoConfig;
pub use eurodreams::EuroDreamsConfig;
pub use euromillones::EuromillonesConfig;
pub use gordo::GordoConfig;
pub use loteria::LoteriaConfig;
pub use lototurf::LototurfConfig;
pub use primitiva::PrimitivaConfig;
pub use quiniela::QuinielaConfig;
pub use quinigol::QuinigolConfig;
pub use side_games::{ElMillonConfig, JokerConfig};

const UNIT_SUM_TOLERANCE: f64 = 1e-6;

/// Price, prize-fund share and participation model shared by every
/// pari-mutuel game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Economy {
    pub price_per_draw: Money,
    /// Fraction of revenue that becomes prize money.
    pub prize_fund_pct: f64,
    pub draw_days: Vec<Weekday>,
    pub world_bets: WorldBetsModel,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            price_per_draw: 1.0,
            prize_fund_pct: 0.55,
            draw_days: vec![Weekday::Sun],
            world_bets: WorldBetsModel::default(),
        }
    }
}

/// One category's share of whatever fund it is split from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryShare {
    pub id: String,
    pub share: f64,
}

/// Ordered category shares.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Shares(pub Vec<CategoryShare>);

impl Shares {
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(id, share)| CategoryShare {
                    id: (*id).to_string(),
                    share: *share,
                })
                .collect(),
        )
    }

    /// Share for `id`, 0 when the category is not listed.
    pub fn get(&self, id: &str) -> f64 {
        self.0.iter().find(|c| c.id == id).map(|c| c.share).unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.iter().map(|c| c.share).sum()
    }
}

/// Jackpot guarantee/cap knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JackpotRules {
    /// Minimum jackpot on the first draw of a cycle.
    pub guarantee: Money,
    /// Maximum jackpot; excess flows to the next category.
    pub cap: Option<Money>,
}

impl Default for JackpotRules {
    fn default() -> Self {
        Self {
            guarantee: 0.0,
            cap: None,
        }
    }
}

// ── Validation helpers ─────────────────────────────────────────────

pub(crate) fn invalid(game: &str, reason: impl Into<String>) -> SimError {
    SimError::InvalidConfig {
        game: game.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn check_fraction(game: &str, label: &str, value: f64) -> SimResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(game, format!("{label} = {value} is outside [0, 1]")));
    }
    Ok(())
}

pub(crate) fn check_unit_sum(game: &str, label: &str, total: f64) -> SimResult<()> {
    if (total - 1.0).abs() > UNIT_SUM_TOLERANCE {
        return Err(invalid(game, format!("{label} sum to {total:.6}, expected 1")));
    }
    Ok(())
}

pub(crate) fn check_at_most_one(game: &str, label: &str, total: f64) -> SimResult<()> {
    if total > 1.0 + UNIT_SUM_TOLERANCE {
        return Err(invalid(game, format!("{label} sum to {total:.6}, more than 1")));
    }
    Ok(())
}

pub(crate) fn check_economy(game: &str, economy: &Economy) -> SimResult<()> {
    if economy.price_per_draw <= 0.0 {
        return Err(invalid(game, "price_per_draw must be positive"));
    }
    check_fraction(game, "prize_fund_pct", economy.prize_fund_pct)?;
    if economy.draw_days.is_empty() {
        return Err(invalid(game, "no draw days"));
    }
    let bets = &economy.world_bets;
    if bets.clamp_min > bets.clamp_max || bets.noise_min > bets.noise_max {
        return Err(invalid(game, "world bets clamp bounds are reversed"));
    }
    Ok(())
}

// ── Catalog ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameCatalog {
    pub primitiva: PrimitivaConfig,
    pub bonoloto: BonolotoConfig,
    pub euromillones: EuromillonesConfig,
    pub gordo: GordoConfig,
    pub eurodreams: EuroDreamsConfig,
    pub loteria_nacional: LoteriaConfig,
    pub quiniela: QuinielaConfig,
    pub lototurf: LototurfConfig,
    pub quinigol: QuinigolConfig,
    pub joker: JokerConfig,
    pub el_millon: ElMillonConfig,
    /// Canonical ids of games switched off for this deployment.
    pub disabled: Vec<String>,
}

impl GameCatalog {
    /// Load from the data/ directory. A missing catalog file means
    /// "built-in tables"; a malformed one is an error.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/catalog.json");
        if !Path::new(&path).exists() {
            log::info!("No catalog at {path}; using built-in game tables");
            return Ok(Self::default_catalog());
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let catalog: GameCatalog = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Built-in tables, validated by construction.
    pub fn default_catalog() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, canonical_id: &str) -> bool {
        !self.disabled.iter().any(|d| d.replace('-', "_") == canonical_id)
    }

    /// Startup invariant check over every game table.
    pub fn validate(&self) -> SimResult<()> {
        self.primitiva.validate()?;
        self.bonoloto.validate()?;
        self.euromillones.validate()?;
        self.gordo.validate()?;
        self.eurodreams.validate()?;
        self.loteria_nacional.validate()?;
        self.quiniela.validate()?;
        self.lototurf.validate()?;
        self.quinigol.validate()?;
        self.joker.validate()?;
        self.el_millon.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_catalog_is_valid() {
        GameCatalog::default_catalog().validate().expect("built-in tables validate");
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let json = r#"{ "primitiva": { "jackpot": { "guarantee": 1000000.0 } }, "disabled": ["quinigol"] }"#;
        let catalog: GameCatalog = serde_json::from_str(json).expect("parse");
        assert_eq!(catalog.primitiva.jackpot.guarantee, 1_000_000.0);
        assert_eq!(catalog.primitiva.economy, PrimitivaConfig::default().economy);
        assert!(!catalog.is_enabled("quinigol"));
        assert!(catalog.is_enabled("primitiva"));
    }

    #[test]
    fn oversubscribed_shares_are_rejected() {
        let mut catalog = GameCatalog::default_catalog();
        catalog.primitiva.shares = Shares::from_pairs(&[("6", 0.9), ("4", 0.3)]);
        let err = catalog.validate().expect_err("shares over 1 must fail");
        assert!(matches!(err, SimError::InvalidConfig { .. }));
    }
}
