//! Date arguments accepted on the command line.

use anyhow::Result;
use chrono::{Days, NaiveDate};

/// Parse `today`, `tomorrow`, `+N` (days from today) or `YYYY-MM-DD`.
pub fn parse_date_arg(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return days_after(today, 1),
        _ => {}
    }

    if let Some(n) = s.strip_prefix('+') {
        if let Ok(days) = n.parse::<u64>() {
            return days_after(today, days);
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{}'. Expected YYYY-MM-DD", s))
}

/// `date` moved forward by `days`, or an error past the last representable date.
pub fn days_after(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| anyhow::anyhow!("Date out of range: {date} + {days} days"))
}
