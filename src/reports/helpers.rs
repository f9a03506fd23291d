//! Calendar arithmetic for the reporting endpoints.

use chrono::{Datelike, NaiveDate};

/// Accepted year/month ranges for reporting queries.
pub fn valid_year_month(year: i32, month: u32) -> bool {
    (1900..=9999).contains(&year) && (1..=12).contains(&month)
}

/// First and last day of a month, inclusive.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next_first.pred_opt()?;
    Some((first, last))
}

/// Resolve optional `year`/`month` query strings, defaulting to today.
pub fn resolve_year_month(
    year: Option<&str>,
    month: Option<&str>,
    today: NaiveDate,
) -> Result<(i32, u32), String> {
    const INVALID: &str = "Invalid year or month.";

    let year = match year {
        Some(raw) => raw.parse::<i32>().map_err(|_| INVALID.to_string())?,
        None => today.year(),
    };
    let month = match month {
        Some(raw) => raw.parse::<u32>().map_err(|_| INVALID.to_string())?,
        None => today.month(),
    };

    if !valid_year_month(year, month) {
        return Err(INVALID.to_string());
    }
    Ok((year, month))
}

/// The `n` days ending at `today`, oldest first.
pub fn last_n_days(today: NaiveDate, n: u32) -> Vec<NaiveDate> {
    (0..n)
        .map(|i| today - chrono::Duration::days((n - 1 - i) as i64))
        .collect()
}

/// The `n` calendar months ending at `today`'s month, oldest first.
pub fn last_n_months(today: NaiveDate, n: u32) -> Vec<(i32, u32)> {
    let mut year = today.year();
    let mut month = today.month();
    let mut months = Vec::with_capacity(n as usize);
    for _ in 0..n {
        months.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    months.reverse();
    months
}

/// Every day of a month in order. Empty for an invalid month.
pub fn days_of_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    if let Some((first, last)) = month_bounds(year, month) {
        let mut day = first;
        while day <= last {
            days.push(day);
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
    }
    days
}
