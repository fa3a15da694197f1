//! What the player picked, one shape per game.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    config::lototurf::MAX_HORSES,
    rng::DrawRng,
    stats,
};

/// Quiniela sign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sign {
    #[serde(rename = "1")]
    Home,
    #[serde(rename = "X")]
    Draw,
    #[serde(rename = "2")]
    Away,
}

impl Sign {
    pub const ALL: [Sign; 3] = [Sign::Home, Sign::Draw, Sign::Away];

    pub fn index(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Draw => 1,
            Self::Away => 2,
        }
    }
}

/// Goals scored by one team, bucketed the way the coupons print them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Goals {
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "M")]
    More,
}

impl Goals {
    pub const ALL: [Goals; 4] = [Goals::Zero, Goals::One, Goals::Two, Goals::More];

    pub fn index(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Two => 2,
            Self::More => 3,
        }
    }
}

/// A match result as (home goals, away goals).
pub type Score = (Goals, Goals);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum PlayerSelection {
    Primitiva { main: Vec<u32>, reintegro: u32 },
    Bonoloto { main: Vec<u32>, reintegro: u32 },
    Euromillones { main: Vec<u32>, stars: Vec<u32> },
    Gordo { main: Vec<u32>, key: u32 },
    #[serde(rename = "eurodreams")]
    EuroDreams { main: Vec<u32>, dream: u32 },
    LoteriaNacional { number: u32 },
    Quiniela { signs: Vec<Sign>, pleno: Score },
    Lototurf { main: Vec<u32>, horse: u32, reintegro: u32 },
    Quinigol { scores: Vec<Score> },
}

/// `count` distinct values in [min, max].
pub fn valid_numbers(values: &[u32], count: usize, min: u32, max: u32) -> bool {
    let distinct: BTreeSet<u32> = values.iter().copied().collect();
    values.len() == count && distinct.len() == count && values.iter().all(|v| (min..=max).contains(v))
}

impl PlayerSelection {
    /// Canonical id of the game this selection belongs to.
    pub fn game_id(&self) -> &'static str {
        match self {
            Self::Primitiva { .. } => "primitiva",
            Self::Bonoloto { .. } => "bonoloto",
            Self::Euromillones { .. } => "euromillones",
            Self::Gordo { .. } => "gordo",
            Self::EuroDreams { .. } => "eurodreams",
            Self::LoteriaNacional { .. } => "loteria_nacional",
            Self::Quiniela { .. } => "quiniela",
            Self::Lototurf { .. } => "lototurf",
            Self::Quinigol { .. } => "quinigol",
        }
    }

    /// Whether the selection has the full shape its game needs. Engines
    /// still accept incomplete selections and score them as no match.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Primitiva { main, reintegro } | Self::Bonoloto { main, reintegro } => {
                valid_numbers(main, 6, 1, 49) && *reintegro <= 9
            }
            Self::Euromillones { main, stars } => valid_numbers(main, 5, 1, 50) && valid_numbers(stars, 2, 1, 12),
            Self::Gordo { main, key } => valid_numbers(main, 5, 1, 54) && *key <= 9,
            Self::EuroDreams { main, dream } => valid_numbers(main, 6, 1, 40) && (1..=5).contains(dream),
            Self::LoteriaNacional { number } => *number < 100_000,
            Self::Quiniela { signs, .. } => signs.len() == 14,
            Self::Lototurf { main, horse, reintegro } => {
                valid_numbers(main, 6, 1, 31) && (1..=MAX_HORSES).contains(horse) && *reintegro <= 9
            }
            Self::Quinigol { scores } => scores.len() == 6,
        }
    }

    /// Random complete selection for `game_id`, like a terminal's
    /// "automática". `None` for an unknown id.
    pub fn quick_pick(game_id: &str, rng: &mut DrawRng) -> Option<Self> {
        let digit = |rng: &mut DrawRng| rng.range_inclusive(0, 9);
        let selection = match game_id {
            "primitiva" => Self::Primitiva {
                main: stats::pick_unique(rng, 6, 1, 49),
                reintegro: digit(rng),
            },
            "bonoloto" => Self::Bonoloto {
                main: stats::pick_unique(rng, 6, 1, 49),
                reintegro: digit(rng),
            },
            "euromillones" => Self::Euromillones {
                main: stats::pick_unique(rng, 5, 1, 50),
                stars: stats::pick_unique(rng, 2, 1, 12),
            },
            "gordo" => Self::Gordo {
                main: stats::pick_unique(rng, 5, 1, 54),
                key: digit(rng),
            },
            "eurodreams" => Self::EuroDreams {
                main: stats::pick_unique(rng, 6, 1, 40),
                dream: rng.range_inclusive(1, 5),
            },
            "loteria_nacional" => Self::LoteriaNacional {
                number: rng.range_inclusive(0, 99_999),
            },
            "quiniela" => Self::Quiniela {
                signs: (0..14).map(|_| Sign::ALL[rng.next_u64_below(3) as usize]).collect(),
                pleno: (
                    Goals::ALL[rng.next_u64_below(4) as usize],
                    Goals::ALL[rng.next_u64_below(4) as usize],
                ),
            },
            "lototurf" => Self::Lototurf {
                main: stats::pick_unique(rng, 6, 1, 31),
                horse: rng.range_inclusive(1, MAX_HORSES),
                reintegro: digit(rng),
            },
            "quinigol" => Self::Quinigol {
                scores: (0..6)
                    .map(|_| {
                        (
                            Goals::ALL[rng.next_u64_below(4) as usize],
                            Goals::ALL[rng.next_u64_below(4) as usize],
                        )
                    })
                    .collect(),
            },
            _ => return None,
        };
        Some(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_picks_are_complete_for_every_game() {
        let mut rng = DrawRng::new(8);
        for id in [
            "primitiva",
            "bonoloto",
            "euromillones",
            "gordo",
            "eurodreams",
            "loteria_nacional",
            "quiniela",
            "lototurf",
            "quinigol",
        ] {
            let pick = PlayerSelection::quick_pick(id, &mut rng).expect("known game");
            assert_eq!(pick.game_id(), id);
            assert!(pick.is_complete(), "{id} quick pick incomplete: {pick:?}");
        }
        assert!(PlayerSelection::quick_pick("bingo", &mut rng).is_none());
    }

    #[test]
    fn duplicates_and_out_of_range_are_incomplete() {
        let dup = PlayerSelection::Primitiva { main: vec![1, 1, 2, 3, 4, 5], reintegro: 0 };
        let range = PlayerSelection::Primitiva { main: vec![1, 2, 3, 4, 5, 50], reintegro: 0 };
        let short = PlayerSelection::Euromillones { main: vec![1, 2, 3, 4, 5], stars: vec![1] };
        assert!(!dup.is_complete());
        assert!(!range.is_complete());
        assert!(!short.is_complete());
    }

    #[test]
    fn selections_round_trip_through_tagged_json() {
        let json = r#"{"game":"quiniela","signs":["1","X","2","1","1","1","X","2","2","1","X","1","1","2"],"pleno":["2","M"]}"#;
        let pick: PlayerSelection = serde_json::from_str(json).expect("parse");
        match &pick {
            PlayerSelection::Quiniela { signs, pleno } => {
                assert_eq!(signs[1], Sign::Draw);
                assert_eq!(*pleno, (Goals::Two, Goals::More));
            }
            other => panic!("unexpected {other:?}"),
        }
        let eurodreams: PlayerSelection =
            serde_json::from_str(r#"{"game":"eurodreams","main":[1,2,3,4,5,6],"dream":2}"#).expect("parse");
        assert_eq!(eurodreams.game_id(), "eurodreams");
    }
}
