use chrono::{Datelike, NaiveDate, Weekday};

fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekdays in the half-open range `[start, end)`. No holiday calendar.
///
/// When `end` precedes `start` the count of `[end, start)` is returned
/// negated, so swapping the arguments flips the sign.
pub fn business_days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return -business_days_between(end, start);
    }
    let span = (end - start).num_days();
    let full_weeks = span / 7;
    let mut count = full_weeks * 5;

    let mut current = start + chrono::Duration::days(full_weeks * 7);
    while current < end {
        if is_business_day(current) {
            count += 1;
        }
        current = current.succ_opt().unwrap_or(end);
    }
    count
}

/// Aging between two optional anchors; a missing endpoint propagates.
pub fn aging(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<i64> {
    Some(business_days_between(start?, end?))
}
