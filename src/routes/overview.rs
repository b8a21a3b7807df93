use axum::extract::{Query, State};
use axum::Json;
use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    pub period: Option<String>,
}

/// Inclusive date range for a named period. Weeks start on Sunday.
fn period_range(period: &str, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    match period {
        "day" => Some((today, today)),
        "week" => {
            let start = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
            Some((start, start + Duration::days(6)))
        }
        "month" => {
            let start = today.with_day(1)?;
            let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
            Some((start, end))
        }
        _ => None,
    }
}

/// Combined dashboard feed: events inside the period plus open tasks.
/// Undated tasks always show up so they are not forgotten.
pub async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Json<Value> {
    let today = Local::now().date_naive();
    let period = query.period.as_deref().unwrap_or("week");
    let range = period_range(period, today).unwrap_or((today, today + Duration::days(6)));

    let doc = state.doc.read().await;

    let mut events: Vec<_> = doc
        .events
        .iter()
        .filter(|e| e.date >= range.0 && e.date <= range.1)
        .cloned()
        .collect();
    events.sort_by_key(|e| e.occurs_at());

    let mut tasks: Vec<_> = doc
        .tasks
        .iter()
        .filter(|t| {
            !t.completed
                && t.due_date
                    .map(|d| d >= range.0 && d <= range.1)
                    .unwrap_or(true)
        })
        .cloned()
        .collect();
    tasks.sort_by_key(|t| (t.due_at().is_none(), t.due_at()));

    Json(json!({
        "period": period,
        "start": range.0,
        "end": range.1,
        "events": events,
        "tasks": tasks,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_range_is_single_day() {
        let today = date(2024, 1, 10);
        assert_eq!(period_range("day", today), Some((today, today)));
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-01-10 is a Wednesday.
        let range = period_range("week", date(2024, 1, 10)).unwrap();
        assert_eq!(range, (date(2024, 1, 7), date(2024, 1, 13)));

        // A Sunday is its own week start.
        let range = period_range("week", date(2024, 1, 7)).unwrap();
        assert_eq!(range, (date(2024, 1, 7), date(2024, 1, 13)));
    }

    #[test]
    fn month_range_handles_varying_lengths() {
        let range = period_range("month", date(2024, 2, 15)).unwrap();
        assert_eq!(range, (date(2024, 2, 1), date(2024, 2, 29)));

        let range = period_range("month", date(2024, 12, 31)).unwrap();
        assert_eq!(range, (date(2024, 12, 1), date(2024, 12, 31)));
    }

    #[test]
    fn unknown_period_is_none() {
        assert_eq!(period_range("year", date(2024, 1, 1)), None);
    }
}
