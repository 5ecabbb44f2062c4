//! Current academic week, cached per calendar day.
//!
//! The week table is fetched at most once per local calendar day, whether or
//! not the fetch succeeds. The lookup uses tomorrow's date so the week rolls
//! over ahead of the university's own cutoff. The cache lock is never held
//! across the fetch; two requests racing on a stale cache may both fetch, and
//! both store the same result.

use crate::http::HttpFetcher;
use apollo_shared::term::{find_week, WeekTable};
use apollo_shared::TermWeek;
use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Source of "now" in local time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock for tests
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
            .lock()
            .map(|guard| *guard)
            .unwrap_or_else(|_| Local::now().naive_local())
    }
}

#[derive(Debug, Default)]
struct TermWeekState {
    last_checked: Option<NaiveDateTime>,
    current: Option<TermWeek>,
}

pub struct TermWeekCalculator {
    http: Arc<dyn HttpFetcher>,
    weeks_url: String,
    clock: Arc<dyn Clock>,
    state: Mutex<TermWeekState>,
}

impl TermWeekCalculator {
    pub fn new(http: Arc<dyn HttpFetcher>, weeks_url: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            http,
            weeks_url: weeks_url.to_string(),
            clock,
            state: Mutex::new(TermWeekState::default()),
        }
    }

    /// The current academic week, or `None` outside the published table or
    /// when the table could not be fetched today.
    pub async fn current(&self) -> Option<TermWeek> {
        let now = self.clock.now();
        let midnight = now.date().and_time(NaiveTime::MIN);

        if let Ok(mut state) = self.state.lock() {
            if state.last_checked.is_some_and(|checked| checked >= midnight) {
                return state.current.clone();
            }
            // A failed fetch still counts as today's check
            state.last_checked = Some(now);
            state.current = None;
        }

        let table = self.fetch_table().await?;
        let reference = (now + Duration::days(1)).date();
        let current = find_week(&table.weeks, reference);

        match &current {
            Some(week) => info!(
                "Academic week refreshed: {} week {} (wb {})",
                week.academic_year,
                week.week_number,
                week.week_start_label()
            ),
            None => info!("No academic week covers {}", reference),
        }

        if let Ok(mut state) = self.state.lock() {
            state.current = current.clone();
        }
        current
    }

    async fn fetch_table(&self) -> Option<WeekTable> {
        let body = match self.http.get_json(&self.weeks_url, &[]).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Week table fetch failed: {}", e);
                return None;
            }
        };
        match serde_json::from_value::<WeekTable>(body) {
            Ok(table) => Some(table),
            Err(e) => {
                warn!("Week table has unexpected shape: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FakeFetcher;
    use chrono::NaiveDate;
    use serde_json::json;

    const WEEKS_URL: &str = "https://tabula.test/api/v1/termdates/weeks";

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M").unwrap()
    }

    fn weeks() -> serde_json::Value {
        json!({"weeks": [
            {"academicYear": "24/25", "weekNumber": 1, "start": "2024-09-30", "end": "2024-10-06"},
            {"academicYear": "24/25", "weekNumber": 2, "start": "2024-10-07", "end": "2024-10-13"},
            {"academicYear": "24/25", "weekNumber": 3, "start": "2024-10-14", "end": "2024-10-20"}
        ]})
    }

    fn calculator(clock: Arc<FixedClock>) -> (Arc<FakeFetcher>, TermWeekCalculator) {
        let fake = Arc::new(FakeFetcher::new().with_json(WEEKS_URL, weeks()));
        let calc = TermWeekCalculator::new(fake.clone(), WEEKS_URL, clock);
        (fake, calc)
    }

    #[tokio::test]
    async fn test_same_day_uses_cache() {
        let clock = Arc::new(FixedClock::new(at("2024-10-08", "09:00")));
        let (fake, calc) = calculator(clock.clone());

        let first = calc.current().await.unwrap();
        clock.set(at("2024-10-08", "23:59"));
        let second = calc.current().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.week_number, 2);
        assert_eq!(fake.count(WEEKS_URL), 1);
    }

    #[tokio::test]
    async fn test_next_day_refetches_once() {
        let clock = Arc::new(FixedClock::new(at("2024-10-08", "23:00")));
        let (fake, calc) = calculator(clock.clone());

        calc.current().await;
        clock.set(at("2024-10-09", "00:01"));
        calc.current().await;
        calc.current().await;

        assert_eq!(fake.count(WEEKS_URL), 2);
    }

    #[tokio::test]
    async fn test_uses_tomorrow_as_reference() {
        // Sunday 13th: tomorrow is Monday 14th, the start of week 3, which is excluded
        let clock = Arc::new(FixedClock::new(at("2024-10-13", "12:00")));
        let (_, calc) = calculator(clock.clone());
        assert_eq!(calc.current().await, None);

        // Saturday 12th: tomorrow is Sunday 13th, still week 2
        let clock = Arc::new(FixedClock::new(at("2024-10-12", "12:00")));
        let (_, calc) = calculator(clock);
        let week = calc.current().await.unwrap();
        assert_eq!(week.week_number, 2);
        assert_eq!(week.week_start, NaiveDate::from_ymd_opt(2024, 10, 7).unwrap());
    }

    #[tokio::test]
    async fn test_fetch_failure_waits_for_next_day() {
        let clock = Arc::new(FixedClock::new(at("2024-10-08", "09:00")));
        let fake = Arc::new(FakeFetcher::new());
        let calc = TermWeekCalculator::new(fake.clone(), WEEKS_URL, clock.clone());

        for _ in 0..5 {
            assert_eq!(calc.current().await, None);
        }
        fake.set_json(WEEKS_URL, weeks());
        assert_eq!(calc.current().await, None);
        assert_eq!(fake.count(WEEKS_URL), 1);

        clock.set(at("2024-10-09", "08:00"));
        assert_eq!(calc.current().await.map(|w| w.week_number), Some(2));
        assert_eq!(fake.count(WEEKS_URL), 2);
    }
}
