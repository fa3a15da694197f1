//! Side bets sold with a main game: Joker (Primitiva) and El Millón
//! (Euromillones). Each one is priced and settled on the same draw
//! date as its main game.

use serde::{Deserialize, Serialize};

use crate::{
    config::{ElMillonConfig, JokerConfig},
    engine::{DrawContext, DrawResult},
    rng::DrawRng,
    types::Money,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SideResult {
    pub game_id: String,
    pub price: Money,
    pub prize: Money,
    pub detail: String,
}

pub trait SideGame: Send {
    fn id(&self) -> &'static str;

    fn price(&self) -> Money;

    /// Settle one side bet against the main game's draw.
    fn play(&mut self, ctx: &DrawContext, main: &DrawResult, rng: &mut DrawRng) -> SideResult;
}

pub const JOKER_DIGITS: usize = 7;

pub struct Joker {
    config: JokerConfig,
}

impl Joker {
    pub fn new(config: JokerConfig) -> Self {
        Self { config }
    }

    /// Longest run of equal digits from the front or from the back.
    pub fn matched_digits(ticket: &[u8; JOKER_DIGITS], drawn: &[u8; JOKER_DIGITS]) -> usize {
        let prefix = ticket.iter().zip(drawn).take_while(|(a, b)| a == b).count();
        let suffix = ticket.iter().rev().zip(drawn.iter().rev()).take_while(|(a, b)| a == b).count();
        prefix.max(suffix)
    }

    pub fn prize_for(&self, matched: usize) -> Money {
        match matched {
            0 => 0.0,
            n => self.config.prizes[n.min(JOKER_DIGITS) - 1],
        }
    }
}

fn joker_number(rng: &mut DrawRng) -> [u8; JOKER_DIGITS] {
    let mut digits = [0u8; JOKER_DIGITS];
    for d in digits.iter_mut() {
        *d = rng.range_inclusive(0, 9) as u8;
    }
    digits
}

fn render(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

impl SideGame for Joker {
    fn id(&self) -> &'static str {
        "joker"
    }

    fn price(&self) -> Money {
        self.config.price
    }

    fn play(&mut self, _ctx: &DrawContext, _main: &DrawResult, rng: &mut DrawRng) -> SideResult {
        let ticket = joker_number(rng);
        let drawn = joker_number(rng);
        let matched = Self::matched_digits(&ticket, &drawn);
        SideResult {
            game_id: self.id().to_string(),
            price: self.config.price,
            prize: self.prize_for(matched),
            detail: format!("ticket {} drawn {} matched {matched}", render(&ticket), render(&drawn)),
        }
    }
}

pub struct ElMillon {
    config: ElMillonConfig,
}

impl ElMillon {
    pub fn new(config: ElMillonConfig) -> Self {
        Self { config }
    }

    /// Chance the player's code is the one drawn among Spanish bets.
    pub fn win_probability(&self, main_bets: u64) -> f64 {
        let spanish = (main_bets as f64 * self.config.spanish_share).round().max(1.0);
        1.0 / spanish
    }
}

impl SideGame for ElMillon {
    fn id(&self) -> &'static str {
        "el_millon"
    }

    fn price(&self) -> Money {
        self.config.price
    }

    fn play(&mut self, _ctx: &DrawContext, main: &DrawResult, rng: &mut DrawRng) -> SideResult {
        let p = self.win_probability(main.stats.bets_total);
        let won = rng.chance(p);
        SideResult {
            game_id: self.id().to_string(),
            price: self.config.price,
            prize: if won { self.config.prize } else { 0.0 },
            detail: format!("1 in {:.0}", 1.0 / p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joker_matches_from_either_end() {
        let drawn = [1, 2, 3, 4, 5, 6, 7];
        assert_eq!(Joker::matched_digits(&[1, 2, 3, 0, 0, 0, 0], &drawn), 3);
        assert_eq!(Joker::matched_digits(&[0, 0, 0, 0, 5, 6, 7], &drawn), 3);
        assert_eq!(Joker::matched_digits(&[1, 0, 0, 0, 0, 6, 7], &drawn), 2);
        assert_eq!(Joker::matched_digits(&drawn, &drawn), 7);
        assert_eq!(Joker::matched_digits(&[0, 2, 3, 4, 5, 6, 0], &drawn), 0);
    }

    #[test]
    fn joker_prize_table() {
        let joker = Joker::new(JokerConfig::default());
        assert_eq!(joker.prize_for(0), 0.0);
        assert_eq!(joker.prize_for(1), 1.0);
        assert_eq!(joker.prize_for(7), 1_000_000.0);
    }

    #[test]
    fn el_millon_odds_scale_with_spanish_bets() {
        let millon = ElMillon::new(ElMillonConfig::default());
        assert!((millon.win_probability(4_000_000) - 1.0 / 1_000_000.0).abs() < 1e-12);
        assert_eq!(millon.win_probability(0), 1.0);
    }
}
