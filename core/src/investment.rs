//! Investment comparison: what the money spent on tickets would be
//! worth in a stock index instead.
//!
//! Each draw's spend is deposited in the month it happened. The balance
//! compounds monthly at the twelfth root of that calendar year's index
//! return. Years outside the table reuse it cyclically.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::types::{DrawDate, Money};

/// IBEX 35 annual price returns, 2000–2024.
pub const IBEX35_ANNUAL_RETURNS: [(i32, f64); 25] = [
    (2000, -0.2168),
    (2001, -0.0781),
    (2002, -0.2810),
    (2003, 0.2827),
    (2004, 0.1737),
    (2005, 0.1820),
    (2006, 0.3179),
    (2007, 0.0731),
    (2008, -0.3943),
    (2009, 0.2984),
    (2010, -0.1743),
    (2011, -0.1311),
    (2012, -0.0466),
    (2013, 0.2170),
    (2014, 0.0366),
    (2015, -0.0720),
    (2016, -0.0201),
    (2017, 0.0740),
    (2018, -0.1495),
    (2019, 0.1182),
    (2020, -0.1545),
    (2021, 0.0793),
    (2022, -0.0555),
    (2023, 0.2276),
    (2024, 0.1478),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexReturns {
    pub name: String,
    pub first_year: i32,
    pub annual: Vec<f64>,
}

impl Default for IndexReturns {
    fn default() -> Self {
        Self {
            name: "IBEX 35".to_string(),
            first_year: IBEX35_ANNUAL_RETURNS[0].0,
            annual: IBEX35_ANNUAL_RETURNS.iter().map(|(_, r)| *r).collect(),
        }
    }
}

impl IndexReturns {
    /// Return for a calendar year, cycling the table in both directions.
    pub fn for_year(&self, year: i32) -> f64 {
        if self.annual.is_empty() {
            return 0.0;
        }
        let len = self.annual.len() as i32;
        let idx = (year - self.first_year).rem_euclid(len);
        self.annual[idx as usize]
    }

    pub fn monthly_factor(&self, year: i32) -> f64 {
        (1.0 + self.for_year(year)).powf(1.0 / 12.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InvestmentComparison {
    pub index: String,
    pub invested: Money,
    pub final_value: Money,
    pub gain: Money,
    /// Lottery winnings minus spend over the same period.
    pub lottery_net: Money,
}

fn month_key(date: DrawDate) -> (i32, u32) {
    (date.year(), date.month())
}

fn next_month((year, month): (i32, u32)) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Invest every `(date, amount)` flow in the index up to the end of the
/// month of the last flow. Flows need not be sorted.
pub fn compare(
    returns: &IndexReturns,
    flows: &[(DrawDate, Money)],
    total_won: Money,
) -> InvestmentComparison {
    let invested: Money = flows.iter().map(|(_, m)| *m).sum();
    let lottery_net = total_won - invested;

    let (Some(first), Some(last)) = (
        flows.iter().map(|(d, _)| month_key(*d)).min(),
        flows.iter().map(|(d, _)| month_key(*d)).max(),
    ) else {
        return InvestmentComparison {
            index: returns.name.clone(),
            lottery_net,
            ..InvestmentComparison::default()
        };
    };

    let mut balance = 0.0;
    let mut month = first;
    loop {
        balance += flows
            .iter()
            .filter(|(d, _)| month_key(*d) == month)
            .map(|(_, m)| *m)
            .sum::<Money>();
        balance *= returns.monthly_factor(month.0);
        if month == last {
            break;
        }
        month = next_month(month);
    }

    InvestmentComparison {
        index: returns.name.clone(),
        invested,
        final_value: balance,
        gain: balance - invested,
        lottery_net,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> DrawDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn table_cycles_outside_its_range() {
        let r = IndexReturns::default();
        assert_eq!(r.for_year(2008), -0.3943);
        assert_eq!(r.for_year(2025), r.for_year(2000));
        assert_eq!(r.for_year(1999), r.for_year(2024));
    }

    #[test]
    fn one_year_of_deposits_compounds_at_that_years_return() {
        let r = IndexReturns::default();
        // A single deposit in January 2003 held through December.
        let flows = vec![(date(2003, 1, 4), 100.0), (date(2003, 12, 27), 0.0)];
        let cmp = compare(&r, &flows, 0.0);
        assert!((cmp.final_value - 128.27).abs() < 1e-6, "got {}", cmp.final_value);
        assert_eq!(cmp.invested, 100.0);
        assert_eq!(cmp.lottery_net, -100.0);
    }

    #[test]
    fn no_flows_means_nothing_invested() {
        let cmp = compare(&IndexReturns::default(), &[], 50.0);
        assert_eq!(cmp.invested, 0.0);
        assert_eq!(cmp.final_value, 0.0);
        assert_eq!(cmp.lottery_net, 50.0);
    }
}
