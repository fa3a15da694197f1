//! The 6/49 machinery shared by La Primitiva and Bonoloto.
//!
//! Both games draw six numbers, a complementario from the remaining
//! 43 and a reintegro digit; both pay a fixed "3" before splitting
//! the rest. They differ in prices, shares, the special "6R" pool and
//! how world winners are sampled.

use serde::{Deserialize, Serialize};

use crate::{
    config::{Economy, Shares},
    engine::{resolve_player, DrawContext, DrawStats, JackpotState, PlayerResult},
    pools::{self, Carry, Ledger, PrizeTier, Rollover, Sink},
    rng::DrawRng,
    stats,
    types::Money,
};

pub const POOL: u32 = 49;
pub const PICKED: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SixFortyNineDraw {
    pub numbers: Vec<u32>,
    pub complementario: u32,
    pub reintegro: u32,
}

impl SixFortyNineDraw {
    pub fn generate(rng: &mut DrawRng) -> Self {
        let numbers = stats::pick_unique(rng, PICKED, 1, POOL);
        let slot = rng.next_u64_below((POOL as usize - PICKED) as u64) as usize;
        let complementario = (1..=POOL).filter(|n| !numbers.contains(n)).nth(slot).unwrap_or(POOL);
        let reintegro = rng.range_inclusive(0, 9);
        Self {
            numbers,
            complementario,
            reintegro,
        }
    }

    /// Main category for a 6-number ticket, and the number of hits.
    pub fn score(&self, main: &[u32]) -> (Option<&'static str>, u32) {
        let hits = main.iter().filter(|n| self.numbers.contains(n)).count() as u32;
        let category = match hits {
            6 => Some("6"),
            5 if main.contains(&self.complementario) => Some("5C"),
            5 => Some("5"),
            4 => Some("4"),
            3 => Some("3"),
            _ => None,
        };
        (category, hits)
    }
}

/// Single-ticket probabilities for "6", "5C", "5", "4", "3".
pub fn category_probs() -> [f64; 5] {
    let combos = stats::n_choose_k(POOL as u64, PICKED as u64);
    let five_any = stats::prob_hits(5, 6, 6, 49);
    let five_c = 6.0 / combos;
    [
        1.0 / combos,
        five_c,
        five_any - five_c,
        stats::prob_hits(4, 6, 6, 49),
        stats::prob_hits(3, 6, 6, 49),
    ]
}

/// How world winners are sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampling {
    IndependentPoisson,
    ConditionalBinomial,
}

/// The per-game knobs of a 6/49 draw.
pub struct SixFortyNineRules<'a> {
    pub game: &'static str,
    pub economy: &'a Economy,
    pub reintegro_pct: f64,
    pub fixed_three: Money,
    pub shares: &'a Shares,
    pub guarantee: Money,
    /// Fraction of "6" winners also hitting the reintegro, when the
    /// game has a "6R" pool.
    pub special_rate: Option<f64>,
    pub sampling: Sampling,
}

pub struct SixFortyNineOutcome {
    pub draw: SixFortyNineDraw,
    pub stats: DrawStats,
    pub player: PlayerResult,
}

/// Refund `refunds` out of a dedicated fund. Surplus grows the reserve;
/// a shortfall is covered by the reserve, then by the operator.
pub(crate) fn settle_refund_fund(state: &mut JackpotState, fund: Money, refunds: Money, ledger: &mut Ledger) {
    let surplus = fund - refunds;
    if surplus >= 0.0 {
        state.reserve += surplus;
        ledger.reserve_out += surplus;
    } else {
        let need = -surplus;
        let from_reserve = need.min(state.reserve);
        state.reserve -= from_reserve;
        ledger.reserve_in += from_reserve;
        ledger.topup += need - from_reserve;
    }
}

/// Allot `fund` to a fixed tier, sharing the whole fund instead if the
/// fixed prizes would overrun it. Returns the tier and what is left.
pub(crate) fn fixed_tier_within(
    id: &'static str,
    prize: Money,
    winners_world: u64,
    player_in: bool,
    fund: Money,
) -> (PrizeTier, Money) {
    let tier = PrizeTier::fixed(id, prize, winners_world, player_in);
    if tier.pool <= fund {
        let left = fund - tier.pool;
        (tier, left)
    } else {
        (PrizeTier::parimutuel(id, fund, winners_world, player_in), 0.0)
    }
}

/// One full 6/49 draw against `state`. `ticket` is `None` for a
/// malformed selection, which then wins nothing.
pub fn run(
    rules: &SixFortyNineRules<'_>,
    state: &mut JackpotState,
    ticket: Option<(&[u32], u32)>,
    ctx: &DrawContext,
    rng: &mut DrawRng,
) -> SixFortyNineOutcome {
    let economy = rules.economy;
    let jackpot_before = state.jackpot;
    let reserve_before = state.reserve;
    let cycle_index = state.cycle_index;

    let mut ledger = Ledger {
        jackpot_in: jackpot_before,
        topup: state.open_cycle(rules.guarantee),
        ..Ledger::default()
    };

    let bets = economy.world_bets.estimate(ctx.date, state.jackpot, rng);
    let revenue = bets.bets_total as f64 * economy.price_per_draw;
    let prize_fund = revenue * economy.prize_fund_pct;
    let reintegro_fund = revenue * rules.reintegro_pct;
    ledger.prize_fund = prize_fund;

    let draw = SixFortyNineDraw::generate(rng);

    // Player
    let (category, hits, reintegro_hit) = match ticket {
        Some((main, reintegro)) => {
            let (category, hits) = draw.score(main);
            (category, hits, reintegro == draw.reintegro)
        }
        None => (None, 0, false),
    };
    let special = rules.special_rate.is_some() && category == Some("6") && reintegro_hit;

    // World winners
    let probs = category_probs();
    let counts: Vec<u64> = match rules.sampling {
        Sampling::IndependentPoisson => probs
            .iter()
            .map(|p| stats::poisson(rng, bets.bets_world as f64 * p))
            .collect(),
        Sampling::ConditionalBinomial => stats::exclusive_counts(rng, bets.bets_world, &probs),
    };
    let world_special = rules
        .special_rate
        .map(|rate| stats::binomial(rng, counts[0], rate))
        .unwrap_or(0);
    let world_reintegro = stats::binomial(rng, bets.bets_world, 0.1);

    // Refunds come out of their own fund.
    let refund = if reintegro_hit { economy.price_per_draw } else { 0.0 };
    let refunds = (world_reintegro as f64) * economy.price_per_draw + refund;
    settle_refund_fund(state, reintegro_fund, refunds, &mut ledger);

    // Fixed "3" first, then the percentage split.
    let split_fund = (prize_fund - reintegro_fund).max(0.0);
    let (three, remaining) = fixed_tier_within("3", rules.fixed_three, counts[4], category == Some("3"), split_fund);

    let share = |id: &str| rules.shares.get(id) * remaining;
    let mut tiers = Vec::with_capacity(6);
    if rules.special_rate.is_some() {
        tiers.push(PrizeTier::parimutuel("6R", share("6R"), world_special, special));
    }
    tiers.push(PrizeTier::parimutuel("6", share("6") + state.jackpot, counts[0], category == Some("6")));
    tiers.push(PrizeTier::parimutuel("5C", share("5C"), counts[1], category == Some("5C")));
    tiers.push(PrizeTier::parimutuel("5", share("5"), counts[2], category == Some("5")));
    tiers.push(PrizeTier::parimutuel("4", share("4"), counts[3], category == Some("4")));
    tiers.push(three);

    let mut carry = Carry::default();
    carry.add(pools::roll_unclaimed(
        &mut tiers,
        &[
            ("6R", Rollover::Sink(Sink::Jackpot)),
            ("6", Rollover::Sink(Sink::Jackpot)),
            ("5C", Rollover::Into("5")),
            ("5", Rollover::Into("4")),
            ("4", Rollover::Sink(Sink::Jackpot)),
        ],
    ));
    pools::enforce_monotonic(&mut tiers, &["6", "5C", "5", "4"]);
    let categories = pools::settle(&tiers);

    let jackpot_won = tiers.iter().any(|t| t.id == "6" && t.winners_effective() > 0);
    ledger.paid_out = categories.iter().map(|c| c.payout).sum::<Money>() + refunds;
    ledger.record_carry(carry);
    state.reserve += carry.to_reserve;
    state.close_cycle(jackpot_won, carry.to_jackpot);

    let (player_category, player_pools) = match category {
        Some("6") if special => (Some("6R"), vec!["6", "6R"]),
        Some(c) => (Some(c), vec![c]),
        None => (None, Vec::new()),
    };
    let player = resolve_player(&categories, player_category, player_pools, hits, refund);

    log::debug!(
        "{} {}: bets={} jackpot {:.0} -> {:.0}",
        rules.game,
        ctx.date,
        bets.bets_total,
        jackpot_before,
        state.jackpot
    );

    SixFortyNineOutcome {
        draw,
        stats: DrawStats {
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
            jackpot_category: jackpot_won.then(|| "6".to_string()),
            categories,
            ledger,
        },
        player,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complementario_is_never_a_main_number() {
        for seed in 0..200 {
            let draw = SixFortyNineDraw::generate(&mut DrawRng::new(seed));
            assert_eq!(draw.numbers.len(), 6);
            assert!(!draw.numbers.contains(&draw.complementario));
            assert!((1..=49).contains(&draw.complementario));
            assert!(draw.reintegro <= 9);
        }
    }

    #[test]
    fn five_plus_complementario_beats_plain_five() {
        let draw = SixFortyNineDraw {
            numbers: vec![1, 2, 3, 4, 5, 6],
            complementario: 7,
            reintegro: 0,
        };
        assert_eq!(draw.score(&[1, 2, 3, 4, 5, 7]), (Some("5C"), 5));
        assert_eq!(draw.score(&[1, 2, 3, 4, 5, 8]), (Some("5"), 5));
        assert_eq!(draw.score(&[1, 2, 30, 40, 41, 42]), (None, 2));
    }

    #[test]
    fn category_probs_match_known_odds() {
        let p = category_probs();
        assert!((1.0 / p[0] - 13_983_816.0).abs() < 1.0);
        assert!((p[2] * 13_983_816.0 - 252.0).abs() < 1e-6);
        assert!((p[3] * 13_983_816.0 - 13_545.0).abs() < 1e-6);
    }
}
