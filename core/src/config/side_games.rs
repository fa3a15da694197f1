//! Add-on bets sold next to a main game.

use serde::{Deserialize, Serialize};

use super::{check_fraction, invalid};
use crate::{error::SimResult, types::Money};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JokerConfig {
    pub price: Money,
    /// Prize by matched digits, index 0 = 1 digit … index 6 = all 7.
    pub prizes: [Money; 7],
}

impl Default for JokerConfig {
    fn default() -> Self {
        Self {
            price: 1.0,
            prizes: [1.0, 5.0, 50.0, 300.0, 1_000.0, 10_000.0, 1_000_000.0],
        }
    }
}

impl JokerConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.price <= 0.0 {
            return Err(invalid("joker", "price must be positive"));
        }
        if self.prizes.windows(2).any(|w| w[0] > w[1]) {
            return Err(invalid("joker", "prizes must grow with matched digits"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ElMillonConfig {
    pub price: Money,
    pub prize: Money,
    /// Fraction of Euromillones bets placed in Spain; one code among
    /// them wins.
    pub spanish_share: f64,
}

impl Default for ElMillonConfig {
    fn default() -> Self {
        Self {
            price: 0.30,
            prize: 1_000_000.0,
            spanish_share: 0.25,
        }
    }
}

impl ElMillonConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.price <= 0.0 {
            return Err(invalid("el_millon", "price must be positive"));
        }
        check_fraction("el_millon", "spanish_share", self.spanish_share)
    }
}
