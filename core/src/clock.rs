//! Draw calendar: which dates a game draws on, and a cursor over them.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::DrawDate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DrawSchedule {
    Weekly(Vec<Weekday>),
    /// Once a year on a fixed day.
    Annual { month: u32, day: u32 },
    /// Weekly draws plus fixed yearly days, whatever weekday they fall on.
    Calendar {
        weekdays: Vec<Weekday>,
        annual: Vec<(u32, u32)>,
    },
}

impl DrawSchedule {
    pub fn is_draw_day(&self, date: DrawDate) -> bool {
        match self {
            Self::Weekly(days) => days.contains(&date.weekday()),
            Self::Annual { month, day } => date.month() == *month && date.day() == *day,
            Self::Calendar { weekdays, annual } => {
                weekdays.contains(&date.weekday())
                    || annual.iter().any(|&(m, d)| date.month() == m && date.day() == d)
            }
        }
    }

    /// First draw date strictly after `after`. `None` only for a
    /// schedule that never draws (no weekdays, or an impossible day).
    pub fn next_after(&self, after: DrawDate) -> Option<DrawDate> {
        match self {
            Self::Weekly(days) => next_weekday(days, after),
            Self::Annual { month, day } => next_annual(*month, *day, after),
            Self::Calendar { weekdays, annual } => annual
                .iter()
                .filter_map(|&(month, day)| next_annual(month, day, after))
                .chain(next_weekday(weekdays, after))
                .min(),
        }
    }
}

fn next_weekday(days: &[Weekday], after: DrawDate) -> Option<DrawDate> {
    (1..=7)
        .map(|offset| after + Duration::days(offset))
        .find(|d| days.contains(&d.weekday()))
}

/// 29 Feb only exists in leap years, hence the eight-year window.
fn next_annual(month: u32, day: u32, after: DrawDate) -> Option<DrawDate> {
    (after.year()..=after.year() + 8)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
        .find(|d| *d > after)
}

/// Cursor over a schedule. The cursor sits on the last date drawn
/// (or the day before the run starts).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawClock {
    pub schedule: DrawSchedule,
    pub cursor: DrawDate,
    /// Draws handed out so far.
    pub draws: u64,
}

impl DrawClock {
    /// Clock whose first draw is on or after `start`.
    pub fn starting(schedule: DrawSchedule, start: DrawDate) -> Self {
        Self {
            schedule,
            cursor: start - Duration::days(1),
            draws: 0,
        }
    }

    /// Advance to the next draw date.
    pub fn next_draw(&mut self) -> Option<DrawDate> {
        let next = self.schedule.next_after(self.cursor)?;
        self.cursor = next;
        self.draws += 1;
        Some(next)
    }

    /// Date `years` calendar years after `from` (29 Feb clamps to 28).
    pub fn years_after(from: DrawDate, years: u32) -> DrawDate {
        let year = from.year() + years as i32;
        NaiveDate::from_ymd_opt(year, from.month(), from.day())
            .or_else(|| NaiveDate::from_ymd_opt(year, from.month(), 28))
            .unwrap_or(from)
    }
}
