//! Prize pools, rollover cascades and money bookkeeping.
//!
//! Tiers are always ordered from the top category down. Engines
//! allot money to tiers, then apply (in this order) their rollover
//! rules, minimum-unit forfeits and monotonic merges, and finally
//! `settle` to get per-winner prizes. Every euro that enters a draw
//! is recorded on a `Ledger`; `imbalance()` must stay at zero.

use serde::{Deserialize, Serialize};

use crate::{stats::safe_divide, types::Money};

#[derive(Debug, Clone, PartialEq)]
pub struct PrizeTier {
    pub id: &'static str,
    pub pool: Money,
    pub winners_world: u64,
    pub player_in: bool,
    /// Fixed per-winner amount. Fixed tiers are never rolled, merged
    /// or forfeited; their pool is simply `fixed × winners`.
    pub fixed_prize: Option<Money>,
}

impl PrizeTier {
    pub fn parimutuel(id: &'static str, pool: Money, winners_world: u64, player_in: bool) -> Self {
        Self {
            id,
            pool,
            winners_world,
            player_in,
            fixed_prize: None,
        }
    }

    pub fn fixed(id: &'static str, prize: Money, winners_world: u64, player_in: bool) -> Self {
        let winners = winners_world + u64::from(player_in);
        Self {
            id,
            pool: prize * winners as f64,
            winners_world,
            player_in,
            fixed_prize: Some(prize),
        }
    }

    pub fn winners_effective(&self) -> u64 {
        self.winners_world + u64::from(self.player_in)
    }

    pub fn prize_per_winner(&self) -> Money {
        match self.fixed_prize {
            Some(prize) => prize,
            None => safe_divide(self.pool, self.winners_effective() as f64),
        }
    }
}

/// Where money with no winner ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Jackpot,
    Reserve,
}

/// Rollover target for a tier with no winners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    Into(&'static str),
    Sink(Sink),
    /// Nearest tier in the given direction that has winners,
    /// otherwise the sink.
    Nearest { upward: bool, otherwise: Sink },
}

/// Money carried out of the current draw's tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Carry {
    pub to_jackpot: Money,
    pub to_reserve: Money,
}

impl Carry {
    fn push(&mut self, sink: Sink, amount: Money) {
        match sink {
            Sink::Jackpot => self.to_jackpot += amount,
            Sink::Reserve => self.to_reserve += amount,
        }
    }

    pub fn add(&mut self, other: Carry) {
        self.to_jackpot += other.to_jackpot;
        self.to_reserve += other.to_reserve;
    }
}

fn index_of(tiers: &[PrizeTier], id: &str) -> Option<usize> {
    tiers.iter().position(|t| t.id == id)
}

fn claimable(tier: &PrizeTier) -> bool {
    tier.fixed_prize.is_none() && tier.winners_effective() > 0
}

/// Nearest pari-mutuel tier with winners in the given direction.
fn nearest_with_winners(tiers: &[PrizeTier], from: usize, upward: bool) -> Option<usize> {
    if upward {
        (0..from).rev().find(|&i| claimable(&tiers[i]))
    } else {
        (from + 1..tiers.len()).find(|&i| claimable(&tiers[i]))
    }
}

/// Move the pools of unclaimed tiers along their rollover rule.
/// Rules are applied in the order given, so chains like
/// `5C → 5 → 4 → jackpot` must be listed top-down.
pub fn roll_unclaimed(tiers: &mut [PrizeTier], rules: &[(&'static str, Rollover)]) -> Carry {
    let mut carry = Carry::default();
    for &(id, rule) in rules {
        let Some(i) = index_of(tiers, id) else { continue };
        if tiers[i].fixed_prize.is_some() || tiers[i].winners_effective() > 0 || tiers[i].pool <= 0.0 {
            continue;
        }
        let amount = std::mem::take(&mut tiers[i].pool);
        match rule {
            Rollover::Into(target) => match index_of(tiers, target) {
                Some(j) => tiers[j].pool += amount,
                None => carry.push(Sink::Jackpot, amount),
            },
            Rollover::Sink(sink) => carry.push(sink, amount),
            Rollover::Nearest { upward, otherwise } => match nearest_with_winners(tiers, i, upward) {
                Some(j) => tiers[j].pool += amount,
                None => carry.push(otherwise, amount),
            },
        }
    }
    carry
}

/// Forfeit pari-mutuel tiers whose unit prize is below `min_unit`.
/// Walks against the flow so forfeited money can lift the next tier
/// over the threshold before that tier is checked.
pub fn enforce_min_unit(tiers: &mut [PrizeTier], min_unit: Money, upward: bool, otherwise: Sink) -> Carry {
    let mut carry = Carry::default();
    let order: Vec<usize> = if upward {
        (0..tiers.len()).rev().collect()
    } else {
        (0..tiers.len()).collect()
    };
    for i in order {
        let tier = &tiers[i];
        if tier.fixed_prize.is_some() || tier.winners_effective() == 0 || tier.pool <= 0.0 {
            continue;
        }
        if tier.prize_per_winner() >= min_unit {
            continue;
        }
        let amount = std::mem::take(&mut tiers[i].pool);
        match nearest_with_winners(tiers, i, upward) {
            Some(j) => tiers[j].pool += amount,
            None => carry.push(otherwise, amount),
        }
    }
    carry
}

/// Forfeited tiers keep their winners on record but pay nothing.
pub fn forfeited(tier: &PrizeTier) -> bool {
    tier.fixed_prize.is_none() && tier.winners_effective() > 0 && tier.pool <= 0.0
}

/// Merge adjacent pari-mutuel tiers (among `ids`, top-down) until no
/// lower tier pays more per winner than the tier above it. Merged
/// tiers share one unit prize; total money is unchanged.
pub fn enforce_monotonic(tiers: &mut [PrizeTier], ids: &[&'static str]) {
    // (first tier position in `members`, pool, winners)
    let members: Vec<usize> = ids
        .iter()
        .filter_map(|id| index_of(tiers, id))
        .filter(|&i| tiers[i].fixed_prize.is_none() && tiers[i].winners_effective() > 0 && tiers[i].pool > 0.0)
        .collect();
    let mut blocks: Vec<(usize, usize, Money, u64)> = Vec::new(); // (start, end, pool, winners)
    for (pos, &i) in members.iter().enumerate() {
        blocks.push((pos, pos, tiers[i].pool, tiers[i].winners_effective()));
        while blocks.len() >= 2 {
            let (_, _, lower_pool, lower_w) = blocks[blocks.len() - 1];
            let (_, _, upper_pool, upper_w) = blocks[blocks.len() - 2];
            let lower_unit = safe_divide(lower_pool, lower_w as f64);
            let upper_unit = safe_divide(upper_pool, upper_w as f64);
            if lower_unit <= upper_unit {
                break;
            }
            let (_, end, pool, winners) = blocks.pop().unwrap_or((0, 0, 0.0, 0));
            if let Some(last) = blocks.last_mut() {
                last.1 = end;
                last.2 += pool;
                last.3 += winners;
            }
        }
    }
    for (start, end, pool, winners) in blocks {
        if start == end {
            continue;
        }
        let unit = safe_divide(pool, winners as f64);
        for &i in &members[start..=end] {
            tiers[i].pool = unit * tiers[i].winners_effective() as f64;
        }
    }
}

/// Final per-category figures for one draw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryStats {
    pub id: String,
    pub pool: Money,
    pub winners_world: u64,
    pub winners_effective: u64,
    pub prize_per_winner: Money,
    pub payout: Money,
}

pub fn settle(tiers: &[PrizeTier]) -> Vec<CategoryStats> {
    tiers
        .iter()
        .map(|t| {
            let winners = t.winners_effective();
            let prize = if winners > 0 { t.prize_per_winner().max(0.0) } else { 0.0 };
            CategoryStats {
                id: t.id.to_string(),
                pool: t.pool,
                winners_world: t.winners_world,
                winners_effective: winners,
                prize_per_winner: prize,
                payout: prize * winners as f64,
            }
        })
        .collect()
}

/// Money in, money out, for a single draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// Revenue share entering the prize split.
    pub prize_fund: Money,
    /// Carried jackpot put into play.
    pub jackpot_in: Money,
    /// Operator money guaranteeing a minimum jackpot or covering a refund shortfall.
    pub topup: Money,
    /// Reserve balance drawn into play.
    pub reserve_in: Money,
    /// New reserve debt taken on to pay fixed prizes.
    pub borrowed: Money,
    pub paid_out: Money,
    /// Carried to the next draw's jackpot.
    pub jackpot_out: Money,
    /// Added to the reserve (including debt repayments).
    pub reserve_out: Money,
}

impl Ledger {
    pub fn inflow(&self) -> Money {
        self.prize_fund + self.jackpot_in + self.topup + self.reserve_in + self.borrowed
    }

    pub fn outflow(&self) -> Money {
        self.paid_out + self.jackpot_out + self.reserve_out
    }

    pub fn imbalance(&self) -> Money {
        self.inflow() - self.outflow()
    }

    pub fn record_carry(&mut self, carry: Carry) {
        self.jackpot_out += carry.to_jackpot;
        self.reserve_out += carry.to_reserve;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(tiers: &[PrizeTier]) -> Money {
        tiers.iter().map(|t| t.pool).sum()
    }

    #[test]
    fn rollover_chain_follows_rule_order() {
        let mut tiers = vec![
            PrizeTier::parimutuel("6", 100.0, 0, false),
            PrizeTier::parimutuel("5C", 10.0, 0, false),
            PrizeTier::parimutuel("5", 20.0, 0, false),
            PrizeTier::parimutuel("4", 30.0, 4, false),
        ];
        let carry = roll_unclaimed(
            &mut tiers,
            &[
                ("6", Rollover::Sink(Sink::Jackpot)),
                ("5C", Rollover::Into("5")),
                ("5", Rollover::Into("4")),
                ("4", Rollover::Sink(Sink::Jackpot)),
            ],
        );
        assert_eq!(carry.to_jackpot, 100.0);
        assert_eq!(tiers[3].pool, 60.0);
        assert_eq!(total(&tiers) + carry.to_jackpot, 160.0);
    }

    #[test]
    fn nearest_rollover_skips_empty_tiers() {
        let mut tiers = vec![
            PrizeTier::parimutuel("14", 50.0, 2, false),
            PrizeTier::parimutuel("13", 20.0, 0, false),
            PrizeTier::parimutuel("12", 30.0, 0, false),
        ];
        let rule = Rollover::Nearest { upward: true, otherwise: Sink::Jackpot };
        let carry = roll_unclaimed(&mut tiers, &[("12", rule), ("13", rule)]);
        assert_eq!(carry, Carry::default());
        assert_eq!(tiers[0].pool, 100.0);
    }

    #[test]
    fn min_unit_forfeit_rolls_upward() {
        let mut tiers = vec![
            PrizeTier::parimutuel("11", 5_000.0, 100, false),
            PrizeTier::parimutuel("10", 900.0, 1_000, true),
        ];
        let carry = enforce_min_unit(&mut tiers, 1.0, true, Sink::Jackpot);
        assert_eq!(carry, Carry::default());
        assert_eq!(tiers[1].pool, 0.0);
        assert!(forfeited(&tiers[1]));
        assert_eq!(tiers[0].pool, 5_900.0);
    }

    #[test]
    fn monotonic_merge_levels_violators() {
        let mut tiers = vec![
            PrizeTier::parimutuel("5", 1_000.0, 10, false), // 100 each
            PrizeTier::parimutuel("4", 3_000.0, 20, false), // 150 each
            PrizeTier::parimutuel("3", 500.0, 100, false),  // 5 each
        ];
        enforce_monotonic(&mut tiers, &["5", "4", "3"]);
        let units: Vec<Money> = tiers.iter().map(|t| t.prize_per_winner()).collect();
        assert!((units[0] - units[1]).abs() < 1e-9);
        assert!(units[1] >= units[2]);
        assert!((total(&tiers) - 4_500.0).abs() < 1e-9);
    }

    #[test]
    fn settle_pays_prize_times_winners() {
        let tiers = vec![
            PrizeTier::parimutuel("A", 900.0, 2, true),
            PrizeTier::fixed("B", 8.0, 10, false),
            PrizeTier::parimutuel("C", 0.0, 0, false),
        ];
        let stats = settle(&tiers);
        assert_eq!(stats[0].winners_effective, 3);
        assert_eq!(stats[0].prize_per_winner, 300.0);
        assert_eq!(stats[1].payout, 80.0);
        assert_eq!(stats[2].payout, 0.0);
    }

    #[test]
    fn ledger_balances() {
        let mut ledger = Ledger {
            prize_fund: 100.0,
            jackpot_in: 50.0,
            paid_out: 120.0,
            ..Ledger::default()
        };
        ledger.record_carry(Carry { to_jackpot: 30.0, to_reserve: 0.0 });
        assert_eq!(ledger.imbalance(), 0.0);
    }
}
