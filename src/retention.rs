use chrono::{Datelike, Duration, NaiveDate};

/// Grandfather-father-son retention decision.
///
/// An artifact is kept as soon as any tier matches, evaluated in order:
/// 1. recency — created within the last `retention` days
/// 2. weekly — created on one of the last `retention` Sundays
/// 3. monthly — created on one of the last `retention` month anchors
///    (fixed 30-day steps back from `today`, each snapped to the first of
///    the month it lands in)
///
/// Returns `true` when no tier protects the artifact. The decision is a
/// pure function of the three arguments; it never looks at artifact
/// identity or backend.
pub fn should_delete(created: NaiveDate, today: NaiveDate, retention: u32) -> bool {
    if (today - created).num_days() <= i64::from(retention) {
        return false;
    }
    if weekly_anchors(today, retention).contains(&created) {
        return false;
    }
    if monthly_anchors(today, retention).contains(&created) {
        return false;
    }
    true
}

/// The `retention` most recent Sundays before `today`.
fn weekly_anchors(today: NaiveDate, retention: u32) -> Vec<NaiveDate> {
    let offset = i64::from(today.weekday().num_days_from_monday()) + 1;
    (0..i64::from(retention))
        .map(|i| today - Duration::days(offset + 7 * i))
        .collect()
}

/// First-of-month anchors, stepping back a fixed 30 days per anchor.
///
/// The 30-day step is deliberate: months of unequal length make some
/// anchors repeat and others skip, and existing deployments depend on
/// exactly this arithmetic.
fn monthly_anchors(today: NaiveDate, retention: u32) -> Vec<NaiveDate> {
    (0..i64::from(retention))
        .map(|i| first_of_month(today - Duration::days(30 * i)))
        .collect()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month.
    date.with_day(1).unwrap_or(date)
}
