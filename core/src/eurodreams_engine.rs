//! EuroDreams draw engine.
//!
//! The two top categories pay fixed annuity totals out of a dedicated
//! allotment backed by a reserve. When both run dry the shortfall is
//! booked as reserve debt. Everything later bound for the reserve
//! (allotment surpluses, the contribution, unclaimed pools) repays it
//! before the reserve grows again. The reserve itself never goes
//! negative.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::{
    clock::DrawSchedule,
    config::{loteria::LoteriaKind, EuroDreamsConfig},
    engine::{
        resolve_player, selection_mismatch, DrawContext, DrawEngine, DrawOutcome, DrawResult, DrawStats,
        PlayerResult,
    },
    error::SimResult,
    pools::{self, Ledger, PrizeTier, Rollover, Sink},
    rng::DrawRng,
    selection::PlayerSelection,
    six49::fixed_tier_within,
    stats,
    types::Money,
};

pub const GAME_ID: &str = "eurodreams";

const PARIMUTUEL: [&str; 3] = ["5", "4", "3"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EuroDreamsDraw {
    pub numbers: Vec<u32>,
    pub dream: u32,
}

impl EuroDreamsDraw {
    pub fn generate(rng: &mut DrawRng) -> Self {
        Self {
            numbers: stats::pick_unique(rng, 6, 1, 40),
            dream: rng.range_inclusive(1, 5),
        }
    }

    pub fn score(&self, main: &[u32], dream: u32) -> (Option<&'static str>, u32) {
        let hits = main.iter().filter(|n| self.numbers.contains(n)).count() as u32;
        let category = match hits {
            6 if dream == self.dream => Some("6+1"),
            6 => Some("6"),
            5 => Some("5"),
            4 => Some("4"),
            3 => Some("3"),
            2 => Some("2"),
            _ => None,
        };
        (category, hits)
    }
}

/// Single-ticket probabilities for "6+1", "6", "5", "4", "3", "2".
pub fn category_probs() -> [f64; 6] {
    let six = stats::prob_hits(6, 6, 6, 40);
    [
        six * 0.2,
        six * 0.8,
        stats::prob_hits(5, 6, 6, 40),
        stats::prob_hits(4, 6, 6, 40),
        stats::prob_hits(3, 6, 6, 40),
        stats::prob_hits(2, 6, 6, 40),
    ]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EuroDreamsState {
    pub reserve: Money,
    /// Fixed-prize liability the allotment and reserve could not cover.
    pub reserve_debt: Money,
    /// Draws since "6+1" was last won.
    pub cycle_index: u64,
}

pub struct EuroDreamsEngine {
    config: EuroDreamsConfig,
    state: EuroDreamsState,
}

impl EuroDreamsEngine {
    pub fn new(config: EuroDreamsConfig) -> Self {
        let state = EuroDreamsState {
            reserve: config.initial_reserve,
            ..EuroDreamsState::default()
        };
        Self { config, state }
    }

    pub fn state(&self) -> &EuroDreamsState {
        &self.state
    }
}

/// "6+1" pays in full up to the winner cap; past it the capped total
/// is shared.
fn first_prize_tier(cfg: &EuroDreamsConfig, winners_world: u64, player_in: bool) -> PrizeTier {
    let tier = PrizeTier::fixed("6+1", cfg.first_prize, winners_world, player_in);
    if tier.winners_effective() <= cfg.first_prize_max_winners {
        tier
    } else {
        let capped = cfg.first_prize * cfg.first_prize_max_winners as f64;
        PrizeTier::parimutuel("6+1", capped, winners_world, player_in)
    }
}

/// Money bound for the reserve repays outstanding debt first; the
/// balance only grows once the debt is cleared.
fn pay_into_reserve(state: &mut EuroDreamsState, amount: Money) {
    let repay = amount.min(state.reserve_debt);
    state.reserve_debt -= repay;
    state.reserve += amount - repay;
}

fn run_draw(
    cfg: &EuroDreamsConfig,
    state: &mut EuroDreamsState,
    ticket: Option<(&[u32], u32)>,
    ctx: &DrawContext,
    rng: &mut DrawRng,
) -> (EuroDreamsDraw, DrawStats, PlayerResult) {
    let economy = &cfg.economy;
    let reserve_before = state.reserve;
    let cycle_index = state.cycle_index;
    let mut ledger = Ledger::default();

    let bets = economy.world_bets.estimate(ctx.date, cfg.first_prize, rng);
    let revenue = bets.bets_total as f64 * economy.price_per_draw;
    let prize_fund = revenue * economy.prize_fund_pct;
    let allotment = prize_fund * cfg.fixed_allotment_pct;
    let contribution = prize_fund * cfg.reserve_pct;
    let parimutuel_fund = prize_fund - allotment - contribution;
    ledger.prize_fund = prize_fund;

    let draw = EuroDreamsDraw::generate(rng);
    let (category, hits) = match ticket {
        Some((main, dream)) => draw.score(main, dream),
        None => (None, 0),
    };
    let is = |id: &str| category == Some(id);

    let counts = stats::exclusive_counts(rng, bets.bets_world, &category_probs());

    // Fixed top prizes: allotment, then reserve, then debt.
    let first = first_prize_tier(cfg, counts[0], is("6+1"));
    let second = PrizeTier::fixed("6", cfg.second_prize, counts[1], is("6"));
    let liability = first.pool + second.pool;
    let from_allotment = liability.min(allotment);
    let uncovered = liability - from_allotment;
    let from_reserve = uncovered.min(state.reserve);
    let borrowed = uncovered - from_reserve;
    state.reserve -= from_reserve;
    state.reserve_debt += borrowed;
    ledger.reserve_in = from_reserve;
    ledger.borrowed = borrowed;
    if borrowed > 0.0 {
        log::warn!(
            "eurodreams {}: fixed prizes exceed allotment and reserve; debt +{borrowed:.2} (total {:.2})",
            ctx.date,
            state.reserve_debt
        );
    }

    // Leftover allotment plus this draw's contribution.
    let leftover = (allotment - from_allotment) + contribution;
    pay_into_reserve(state, leftover);
    ledger.reserve_out += leftover;

    // Fixed "2" comes off the pari-mutuel fund before the split.
    let (two, remaining) = fixed_tier_within("2", cfg.fixed_two, counts[5], is("2"), parimutuel_fund);

    let mut tiers = vec![first, second];
    for (id, winners) in PARIMUTUEL.iter().zip(&counts[2..5]) {
        tiers.push(PrizeTier::parimutuel(*id, cfg.shares.get(id) * remaining, *winners, is(*id)));
    }
    tiers.push(two);

    let rule = Rollover::Nearest {
        upward: true,
        otherwise: Sink::Reserve,
    };
    let carry = pools::roll_unclaimed(&mut tiers, &[("5", rule), ("4", rule), ("3", rule)]);
    let categories = pools::settle(&tiers);

    ledger.paid_out = categories.iter().map(|c| c.payout).sum();
    ledger.record_carry(carry);
    pay_into_reserve(state, carry.to_reserve);
    let top_won = tiers[0].winners_effective() > 0;
    if top_won {
        state.cycle_index = 0;
    } else {
        state.cycle_index += 1;
    }

    let player = resolve_player(&categories, category, category.into_iter().collect(), hits, 0.0);

    log::debug!(
        "eurodreams {}: bets={} reserve {:.0} -> {:.0} debt {:.0}",
        ctx.date,
        bets.bets_total,
        reserve_before,
        state.reserve,
        state.reserve_debt
    );

    let stats = DrawStats {
        bets_total: bets.bets_total,
        bets_world: bets.bets_world,
        revenue,
        prize_fund,
        jackpot_before: 0.0,
        jackpot_after: 0.0,
        reserve_before,
        reserve_after: state.reserve,
        reserve_debt: state.reserve_debt,
        cycle_index,
        jackpot_category: top_won.then(|| "6+1".to_string()),
        categories,
        ledger,
    };
    (draw, stats, player)
}

impl DrawEngine for EuroDreamsEngine {
    fn game_id(&self) -> &'static str {
        GAME_ID
    }

    fn schedule(&self, _kind: Option<LoteriaKind>) -> DrawSchedule {
        DrawSchedule::Weekly(self.config.economy.draw_days.clone())
    }

    fn price_for(&self, _ctx: &DrawContext) -> Money {
        self.config.economy.price_per_draw
    }

    fn run_draw(&mut self, selection: &PlayerSelection, ctx: &DrawContext, rng: &mut DrawRng) -> SimResult<DrawResult> {
        let PlayerSelection::EuroDreams { main, dream } = selection else {
            return Err(selection_mismatch(GAME_ID, selection));
        };
        let ticket = if selection.is_complete() {
            Some((main.as_slice(), *dream))
        } else {
            log::warn!("eurodreams: malformed selection {main:?} dream {dream}; scoring as no match");
            None
        };
        let (draw, stats, player) = run_draw(&self.config, &mut self.state, ticket, ctx, rng);
        Ok(DrawResult {
            game_id: GAME_ID.to_string(),
            date: ctx.date,
            draw: DrawOutcome::EuroDreams(draw),
            stats,
            player,
        })
    }

    /// EuroDreams has no rolling jackpot.
    fn jackpot(&self) -> Money {
        0.0
    }

    fn reserve(&self) -> Money {
        self.state.reserve
    }

    fn snapshot_state(&self) -> SimResult<serde_json::Value> {
        Ok(serde_json::to_value(&self.state)?)
    }

    fn restore_state(&mut self, state: serde_json::Value) -> SimResult<()> {
        self.state = serde_json::from_value(state)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{config::Economy, economy::WorldBetsModel};

    #[test]
    fn winners_past_the_cap_share_the_capped_total() {
        let cfg = EuroDreamsConfig::default();
        let tier = first_prize_tier(&cfg, 9, true);
        assert_eq!(tier.winners_effective(), 10);
        assert!((tier.pool - cfg.first_prize * 5.0).abs() < 1e-6);
        assert!((tier.prize_per_winner() - cfg.first_prize / 2.0).abs() < 1e-6);

        let tier = first_prize_tier(&cfg, 2, false);
        assert_eq!(tier.fixed_prize, Some(cfg.first_prize));
        assert!((tier.pool - cfg.first_prize * 2.0).abs() < 1e-6);
    }

    /// One bet a draw and it is nobody's: every pari-mutuel pool goes
    /// unclaimed.
    fn unclaimed_config() -> EuroDreamsConfig {
        let base = EuroDreamsConfig::default();
        EuroDreamsConfig {
            economy: Economy {
                world_bets: WorldBetsModel::flat(1.0, 1.0, 1.0),
                ..base.economy.clone()
            },
            fixed_allotment_pct: 0.0,
            reserve_pct: 0.0,
            ..base
        }
    }

    #[test]
    fn unclaimed_pools_repay_debt_before_the_reserve_grows() {
        let cfg = unclaimed_config();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let mut state = EuroDreamsState {
            reserve: 0.0,
            reserve_debt: 1_000.0,
            cycle_index: 0,
        };
        let (_, stats, _) = run_draw(&cfg, &mut state, None, &DrawContext::on(day), &mut DrawRng::new(5));
        assert!(stats.categories.iter().all(|c| c.winners_world == 0), "{:?}", stats.categories);
        let carried = stats.ledger.reserve_out;
        assert!(carried > 0.0, "nothing carried: {:?}", stats.ledger);
        assert!((carried - stats.prize_fund).abs() < 1e-9);
        assert_eq!(state.reserve, 0.0, "reserve grew while in debt");
        assert!((state.reserve_debt - (1_000.0 - carried)).abs() < 1e-9);

        // A debt smaller than the carry is cleared and only the rest lands
        // in the reserve.
        let mut state = EuroDreamsState {
            reserve: 0.0,
            reserve_debt: 0.5,
            cycle_index: 0,
        };
        let (_, stats, _) = run_draw(&cfg, &mut state, None, &DrawContext::on(day), &mut DrawRng::new(5));
        assert_eq!(state.reserve_debt, 0.0);
        assert!((state.reserve - (stats.ledger.reserve_out - 0.5)).abs() < 1e-9);
    }

    #[test]
    fn dream_only_matters_with_six_hits() {
        let draw = EuroDreamsDraw {
            numbers: vec![1, 2, 3, 4, 5, 6],
            dream: 3,
        };
        assert_eq!(draw.score(&[1, 2, 3, 4, 5, 6], 3).0, Some("6+1"));
        assert_eq!(draw.score(&[1, 2, 3, 4, 5, 6], 4).0, Some("6"));
        assert_eq!(draw.score(&[1, 2, 30, 31, 32, 33], 3).0, Some("2"));
    }
}
