use chrono::{Datelike, NaiveDate};

/// Day of the month the recurring tax obligation falls due.
pub const DUE_DAY: u32 = 20;

/// Next occurrence of the due day: the 20th of the reference month if the
/// reference day has not passed it, otherwise the 20th of the following
/// month, rolling the year over at December.
pub fn next_due_date(reference: NaiveDate) -> NaiveDate {
    if reference.day() <= DUE_DAY {
        NaiveDate::from_ymd_opt(reference.year(), reference.month(), DUE_DAY).unwrap()
    } else if reference.month() == 12 {
        NaiveDate::from_ymd_opt(reference.year() + 1, 1, DUE_DAY).unwrap()
    } else {
        NaiveDate::from_ymd_opt(reference.year(), reference.month() + 1, DUE_DAY).unwrap()
    }
}

/// Whole days from `reference` to `due_date`; negative once overdue.
pub fn days_until(due_date: NaiveDate, reference: NaiveDate) -> i64 {
    (due_date - reference).num_days()
}

/// Period key for a date's own year and month, formatted `YYYY-MM`.
pub fn period_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Period key of the month after the reference month, rolling the year.
pub fn next_period_key(reference: NaiveDate) -> String {
    if reference.month() == 12 {
        format!("{:04}-{:02}", reference.year() + 1, 1)
    } else {
        format!("{:04}-{:02}", reference.year(), reference.month() + 1)
    }
}

/// Parse a `YYYY-MM` period key into the first day of that month.
pub fn parse_period_key(key: &str) -> Option<NaiveDate> {
    let (year, month) = key.split_once('-')?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// Due date for a competence period: the 20th of the month that follows it.
pub fn due_date_for(competence: &str) -> Option<NaiveDate> {
    let first = parse_period_key(competence)?;
    if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, DUE_DAY)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, DUE_DAY)
    }
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    next_month.unwrap() - chrono::Duration::days(1)
}

pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap()
}

pub fn year_end(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap()
}
