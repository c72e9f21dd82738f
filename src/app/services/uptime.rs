use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Calendar distance between a reference date and a later date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uptime {
    pub years: i32,
    pub months: u32,
    pub days: u32,
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} years, {:02} months, {:02} days",
            self.years, self.months, self.days
        )
    }
}

/// Number of days in the month before the one `date` falls in.
fn days_in_previous_month(date: NaiveDate) -> u32 {
    let first_of_month = date.with_day(1).unwrap_or(date);
    first_of_month.pred_opt().map(|d| d.day()).unwrap_or(31)
}

/// Years, months and days such that `since` plus the result lands on `today`.
///
/// Days borrow from the month before `today`; months borrow from the year.
/// Returns `None` when `since` is after `today`.
pub fn calculate_uptime(since: NaiveDate, today: NaiveDate) -> Option<Uptime> {
    if since > today {
        return None;
    }

    let mut years = today.year() - since.year();
    let mut months = today.month() as i32 - since.month() as i32;
    if months < 0 {
        years -= 1;
        months += 12;
    }

    let days = if today.day() >= since.day() {
        today.day() - since.day()
    } else {
        if months == 0 {
            years -= 1;
            months = 11;
        } else {
            months -= 1;
        }
        // A reference day past the end of the short month clamps to its last day.
        today.day() + days_in_previous_month(today).saturating_sub(since.day())
    };

    Some(Uptime {
        years,
        months: months as u32,
        days,
    })
}
