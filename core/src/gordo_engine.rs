//! El Gordo de la Primitiva draw engine.
//!
//! Five of 54 plus a key digit. Matching the key refunds the bet on
//! its own, on top of whatever the numbers win.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::{
    clock::DrawSchedule,
    config::{loteria::LoteriaKind, GordoConfig},
    engine::{
        resolve_player, selection_mismatch, DrawContext, DrawEngine, DrawOutcome, DrawResult, DrawStats,
        JackpotState, PlayerResult,
    },
    error::SimResult,
    pools::{self, Ledger, PrizeTier, Rollover, Sink},
    rng::DrawRng,
    selection::PlayerSelection,
    six49::{fixed_tier_within, settle_refund_fund},
    stats,
    types::Money,
};

pub const GAME_ID: &str = "gordo";

/// (id, numbers hit, key hit), top-down.
const CATEGORIES: [(&str, u64, bool); 8] = [
    ("5+1", 5, true),
    ("5+0", 5, false),
    ("4+1", 4, true),
    ("4+0", 4, false),
    ("3+1", 3, true),
    ("3+0", 3, false),
    ("2+1", 2, true),
    ("2+0", 2, false),
];

const ROLLOVER: [(&str, Rollover); 7] = [
    ("5+1", Rollover::Sink(Sink::Jackpot)),
    ("5+0", Rollover::Into("4+1")),
    ("4+1", Rollover::Into("4+0")),
    ("4+0", Rollover::Into("3+1")),
    ("3+1", Rollover::Into("3+0")),
    ("3+0", Rollover::Into("2+1")),
    // "2+0" is fixed, so the last pari-mutuel tier feeds the jackpot.
    ("2+1", Rollover::Sink(Sink::Jackpot)),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GordoDraw {
    pub numbers: Vec<u32>,
    pub key: u32,
}

impl GordoDraw {
    pub fn generate(rng: &mut DrawRng) -> Self {
        Self {
            numbers: stats::pick_unique(rng, 5, 1, 54),
            key: rng.range_inclusive(0, 9),
        }
    }

    /// (main category, numbers hit, key hit)
    pub fn score(&self, main: &[u32], key: u32) -> (Option<&'static str>, u32, bool) {
        let hits = main.iter().filter(|n| self.numbers.contains(n)).count() as u64;
        let key_hit = key == self.key;
        let category = CATEGORIES
            .iter()
            .find(|(_, h, k)| *h == hits && *k == key_hit)
            .map(|(id, _, _)| *id);
        (category, hits as u32, key_hit)
    }
}

pub fn category_probs() -> Vec<f64> {
    CATEGORIES
        .iter()
        .map(|(_, hits, key)| stats::prob_hits(*hits, 5, 5, 54) * if *key { 0.1 } else { 0.9 })
        .collect()
}

pub struct GordoEngine {
    config: GordoConfig,
    state: JackpotState,
}

impl GordoEngine {
    pub fn new(config: GordoConfig) -> Self {
        Self {
            config,
            state: JackpotState::default(),
        }
    }
}

fn run_draw(
    cfg: &GordoConfig,
    state: &mut JackpotState,
    ticket: Option<(&[u32], u32)>,
    ctx: &DrawContext,
    rng: &mut DrawRng,
) -> (GordoDraw, DrawStats, PlayerResult) {
    let economy = &cfg.economy;
    let jackpot_before = state.jackpot;
    let reserve_before = state.reserve;
    let cycle_index = state.cycle_index;
    let mut ledger = Ledger {
        jackpot_in: jackpot_before,
        topup: state.open_cycle(cfg.jackpot.guarantee),
        ..Ledger::default()
    };

    let bets = economy.world_bets.estimate(ctx.date, state.jackpot, rng);
    let revenue = bets.bets_total as f64 * economy.price_per_draw;
    let prize_fund = revenue * economy.prize_fund_pct;
    let reintegro_fund = revenue * cfg.reintegro_pct;
    ledger.prize_fund = prize_fund;

    let draw = GordoDraw::generate(rng);
    let (category, hits, key_hit) = match ticket {
        Some((main, key)) => draw.score(main, key),
        None => (None, 0, false),
    };

    let probs = category_probs();
    let counts: Vec<u64> = probs
        .iter()
        .map(|p| stats::poisson(rng, bets.bets_world as f64 * p))
        .collect();
    let world_keys = stats::binomial(rng, bets.bets_world, 0.1);

    let refund = if key_hit { economy.price_per_draw } else { 0.0 };
    let refunds = world_keys as f64 * economy.price_per_draw + refund;
    settle_refund_fund(state, reintegro_fund, refunds, &mut ledger);

    let split_fund = (prize_fund - reintegro_fund).max(0.0);
    let (two, remaining) = fixed_tier_within("2+0", cfg.fixed_two, counts[7], category == Some("2+0"), split_fund);

    let mut tiers: Vec<PrizeTier> = CATEGORIES[..7]
        .iter()
        .zip(&counts)
        .map(|((id, _, _), winners)| {
            PrizeTier::parimutuel(*id, cfg.shares.get(id) * remaining, *winners, category == Some(*id))
        })
        .collect();
    tiers[0].pool += state.jackpot;
    tiers.push(two);

    let carry = pools::roll_unclaimed(&mut tiers, &ROLLOVER);
    let categories = pools::settle(&tiers);

    let jackpot_won = tiers[0].winners_effective() > 0;
    ledger.paid_out = categories.iter().map(|c| c.payout).sum::<Money>() + refunds;
    ledger.record_carry(carry);
    state.reserve += carry.to_reserve;
    state.close_cycle(jackpot_won, carry.to_jackpot);

    let player = resolve_player(&categories, category, category.into_iter().collect(), hits, refund);

    log::debug!(
        "gordo {}: bets={} jackpot {:.0} -> {:.0}",
        ctx.date,
        bets.bets_total,
        jackpot_before,
        state.jackpot
    );

    let stats = DrawStats {
        bets_total: bets.bets_total,
        bets_world: bets.bets_world,
        revenue,
        prize_fund,
        jackpot_before,
        jackpot_after: state.jackpot,
        reserve_before,
        reserve_after: state.reserve,
        reserve_debt: 0.0,
        cycle_index,
        jackpot_category: jackpot_won.then(|| "5+1".to_string()),
        categories,
        ledger,
    };
    (draw, stats, player)
}

impl DrawEngine for GordoEngine {
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
        let PlayerSelection::Gordo { main, key } = selection else {
            return Err(selection_mismatch(GAME_ID, selection));
        };
        let ticket = if selection.is_complete() {
            Some((main.as_slice(), *key))
        } else {
            log::warn!("gordo: malformed selection {main:?} key {key}; scoring as no match");
            None
        };
        let (draw, stats, player) = run_draw(&self.config, &mut self.state, ticket, ctx, rng);
        Ok(DrawResult {
            game_id: GAME_ID.to_string(),
            date: ctx.date,
            draw: DrawOutcome::Gordo(draw),
            stats,
            player,
        })
    }

    fn jackpot(&self) -> Money {
        self.state.jackpot
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
    use super::*;

    #[test]
    fn key_alone_is_a_refund_not_a_category() {
        let draw = GordoDraw {
            numbers: vec![1, 2, 3, 4, 5],
            key: 7,
        };
        assert_eq!(draw.score(&[10, 11, 12, 13, 14], 7), (None, 0, true));
        assert_eq!(draw.score(&[1, 2, 12, 13, 14], 7), (Some("2+1"), 2, true));
        assert_eq!(draw.score(&[1, 2, 3, 4, 5], 0), (Some("5+0"), 5, false));
    }

    #[test]
    fn key_hit_refunds_the_bet_price() {
        let cfg = GordoConfig::default();
        let day = chrono::NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
        let mut refunds = 0;
        for seed in 0..100 {
            let mut state = JackpotState::default();
            let (draw, _, player) = run_draw(
                &cfg,
                &mut state,
                Some((&[1, 2, 3, 4, 5][..], 4)),
                &DrawContext::on(day),
                &mut DrawRng::new(seed),
            );
            let expected = if draw.key == 4 { cfg.economy.price_per_draw } else { 0.0 };
            assert_eq!(player.refund, expected, "seed {seed}: key {}", draw.key);
            if player.refund > 0.0 {
                refunds += 1;
            }
        }
        assert_eq!(cfg.economy.price_per_draw, 1.50);
        assert!(refunds > 0, "key never drawn in 100 seeds");
    }

    #[test]
    fn jackpot_odds_are_one_in_31_6_million() {
        let p = category_probs();
        assert!((1.0 / p[0] - 31_625_100.0).abs() < 5.0);
    }
}
