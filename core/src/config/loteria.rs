//! Lotería Nacional: fixed prizes per décimo on numbers 00000–99999.
//!
//! Four draw kinds share one engine but each has its own emission and
//! prize table shape.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::invalid;
use crate::{economy::WorldBetsModel, error::SimResult, types::Money};

pub const NUMBERS: u32 = 100_000;
pub const DECIMOS_PER_BILLETE: u64 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LoteriaKind {
    Jueves,
    Sabado,
    Navidad,
    Nino,
}

impl LoteriaKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Jueves => "jueves",
            Self::Sabado => "sabado",
            Self::Navidad => "navidad",
            Self::Nino => "nino",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jueves" | "thursday" => Some(Self::Jueves),
            "sabado" | "sábado" | "saturday" => Some(Self::Sabado),
            "navidad" | "christmas" => Some(Self::Navidad),
            "nino" | "niño" | "el_nino" | "el-nino" => Some(Self::Nino),
            _ => None,
        }
    }
}

/// How many décimos exist and how many are sold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Emission {
    pub price: Money,
    pub series: u64,
    /// Décimos sold per draw (the world bets model, in décimos).
    pub sold: WorldBetsModel,
}

impl Default for Emission {
    fn default() -> Self {
        Self {
            price: 3.0,
            series: 10,
            sold: WorldBetsModel::flat(6_000_000.0, 1_000_000.0, 10_000_000.0).with_jackpot_bump(1.0, 0.0),
        }
    }
}

impl Emission {
    fn new(price: Money, series: u64, sold_base: f64) -> Self {
        let issued = Self::issued_for(series) as f64;
        Self {
            price,
            series,
            sold: WorldBetsModel::flat(sold_base, sold_base * 0.5, issued).with_jackpot_bump(1.0, 0.0),
        }
    }

    fn issued_for(series: u64) -> u64 {
        NUMBERS as u64 * series * DECIMOS_PER_BILLETE
    }

    /// Décimos printed for one draw.
    pub fn issued(&self) -> u64 {
        Self::issued_for(self.series)
    }

    /// Décimos printed for a single number.
    pub fn decimos_per_number(&self) -> u64 {
        self.series * DECIMOS_PER_BILLETE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrdinaryPrizes {
    pub first: Money,
    pub second: Money,
    pub approx_first: Money,
    pub approx_second: Money,
    pub centena_first: Money,
    pub centena_second: Money,
    pub last3_first: Money,
    pub last2_first: Money,
    pub reintegro: Money,
    /// Extra reintegro digits drawn besides the last digit of the first prize.
    pub extra_reintegros: usize,
}

impl Default for OrdinaryPrizes {
    fn default() -> Self {
        Self::for_price(3.0)
    }
}

impl OrdinaryPrizes {
    /// Thursday table scaled to a décimo price.
    pub fn for_price(price: Money) -> Self {
        let k = price / 3.0;
        Self {
            first: 30_000.0 * k,
            second: 6_000.0 * k,
            approx_first: 600.0 * k,
            approx_second: 390.0 * k,
            centena_first: 30.0 * k,
            centena_second: 30.0 * k,
            last3_first: 60.0 * k,
            last2_first: 30.0 * k,
            reintegro: price,
            extra_reintegros: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrdinaryDraw {
    pub weekday: Weekday,
    pub emission: Emission,
    pub prizes: OrdinaryPrizes,
}

impl Default for OrdinaryDraw {
    fn default() -> Self {
        Self {
            weekday: Weekday::Thu,
            emission: Emission::new(3.0, 10, 6_000_000.0),
            prizes: OrdinaryPrizes::for_price(3.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavidadPrizes {
    pub first: Money,
    pub second: Money,
    pub third: Money,
    pub fourth: Money,
    pub fifth: Money,
    pub pedrea: Money,
    pub approx_first: Money,
    pub approx_second: Money,
    pub approx_third: Money,
    /// Centenas of the first to fourth prizes.
    pub centena: Money,
    /// Last two digits of the first to third prizes.
    pub last2: Money,
    pub reintegro: Money,
    pub fourth_count: usize,
    pub fifth_count: usize,
    pub pedrea_count: usize,
}

impl Default for NavidadPrizes {
    fn default() -> Self {
        Self {
            first: 400_000.0,
            second: 125_000.0,
            third: 50_000.0,
            fourth: 20_000.0,
            fifth: 6_000.0,
            pedrea: 100.0,
            approx_first: 2_000.0,
            approx_second: 1_250.0,
            approx_third: 960.0,
            centena: 100.0,
            last2: 100.0,
            reintegro: 20.0,
            fourth_count: 2,
            fifth_count: 8,
            pedrea_count: 1_794,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NinoPrizes {
    pub first: Money,
    pub second: Money,
    pub third: Money,
    pub four_digit: Money,
    pub three_digit: Money,
    pub two_digit: Money,
    pub four_digit_count: usize,
    pub three_digit_count: usize,
    pub two_digit_count: usize,
    pub approx_first: Money,
    pub approx_second: Money,
    pub reintegro: Money,
    pub reintegro_count: usize,
}

impl Default for NinoPrizes {
    fn default() -> Self {
        Self {
            first: 200_000.0,
            second: 75_000.0,
            third: 25_000.0,
            four_digit: 350.0,
            three_digit: 100.0,
            two_digit: 40.0,
            four_digit_count: 2,
            three_digit_count: 14,
            two_digit_count: 5,
            approx_first: 1_200.0,
            approx_second: 610.0,
            reintegro: 20.0,
            reintegro_count: 3,
        }
    }
}

/// Christmas draw on a fixed calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavidadDraw {
    pub month: u32,
    pub day: u32,
    pub emission: Emission,
    pub prizes: NavidadPrizes,
}

impl Default for NavidadDraw {
    fn default() -> Self {
        Self {
            month: 12,
            day: 22,
            emission: Emission::new(20.0, 180, 160_000_000.0),
            prizes: NavidadPrizes::default(),
        }
    }
}

/// Epiphany draw on a fixed calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NinoDraw {
    pub month: u32,
    pub day: u32,
    pub emission: Emission,
    pub prizes: NinoPrizes,
}

impl Default for NinoDraw {
    fn default() -> Self {
        Self {
            month: 1,
            day: 6,
            emission: Emission::new(20.0, 100, 75_000_000.0),
            prizes: NinoPrizes::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoteriaConfig {
    pub jueves: OrdinaryDraw,
    pub sabado: OrdinaryDraw,
    pub navidad: NavidadDraw,
    pub nino: NinoDraw,
    /// Kind used when a draw date matches none of the calendars.
    pub default_kind: LoteriaKind,
}

impl Default for LoteriaConfig {
    fn default() -> Self {
        Self {
            jueves: OrdinaryDraw::default(),
            sabado: OrdinaryDraw {
                weekday: Weekday::Sat,
                emission: Emission::new(6.0, 10, 5_000_000.0),
                prizes: OrdinaryPrizes::for_price(6.0),
            },
            navidad: NavidadDraw::default(),
            nino: NinoDraw::default(),
            default_kind: LoteriaKind::Jueves,
        }
    }
}

impl LoteriaConfig {
    pub fn emission(&self, kind: LoteriaKind) -> &Emission {
        match kind {
            LoteriaKind::Jueves => &self.jueves.emission,
            LoteriaKind::Sabado => &self.sabado.emission,
            LoteriaKind::Navidad => &self.navidad.emission,
            LoteriaKind::Nino => &self.nino.emission,
        }
    }

    pub fn price(&self, kind: LoteriaKind) -> Money {
        self.emission(kind).price
    }

    pub fn validate(&self) -> SimResult<()> {
        const GAME: &str = "loteria_nacional";
        for kind in [LoteriaKind::Jueves, LoteriaKind::Sabado, LoteriaKind::Navidad, LoteriaKind::Nino] {
            let emission = self.emission(kind);
            if emission.price <= 0.0 || emission.series == 0 {
                return Err(invalid(GAME, format!("{} emission needs a price and series", kind.name())));
            }
            if emission.sold.clamp_max > emission.issued() as f64 {
                return Err(invalid(GAME, format!("{} sells more décimos than it prints", kind.name())));
            }
        }
        let navidad = &self.navidad.prizes;
        let distinct = 3 + navidad.fourth_count + navidad.fifth_count + navidad.pedrea_count;
        if distinct > NUMBERS as usize / 2 {
            return Err(invalid(GAME, "navidad draws too many distinct numbers"));
        }
        for (label, month, day) in [("navidad", self.navidad.month, self.navidad.day), ("nino", self.nino.month, self.nino.day)] {
            if chrono::NaiveDate::from_ymd_opt(2024, month, day).is_none() {
                return Err(invalid(GAME, format!("{label} date {month}/{day} does not exist")));
            }
        }
        Ok(())
    }
}
