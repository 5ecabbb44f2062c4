//! Term and week arithmetic for room timetable links.
//!
//! The university publishes a table of academic weeks, ascending by start
//! date. Week 1 is the first week of term 1; the table runs to week 52 and then
//! the next academic year starts again at week 1. Timetable pages are addressed
//! by a four-digit year code ("2425" for 24/25) and a week number or range.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One row of the published week table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRecord {
    /// "24/25"
    pub academic_year: String,
    pub week_number: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Top-level shape of the week table response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekTable {
    #[serde(default)]
    pub weeks: Vec<WeekRecord>,
}

/// The academic week a reference date falls in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermWeek {
    pub academic_year: String,
    pub week_number: u32,
    pub week_start: NaiveDate,
}

impl TermWeek {
    pub fn from_record(record: &WeekRecord) -> Self {
        Self {
            academic_year: record.academic_year.clone(),
            week_number: record.week_number,
            week_start: record.start,
        }
    }

    /// "07 Oct"
    pub fn week_start_label(&self) -> String {
        self.week_start.format("%d %b").to_string()
    }

    pub fn next_week_start_label(&self) -> String {
        (self.week_start + Duration::weeks(1))
            .format("%d %b")
            .to_string()
    }

    /// "24/25" -> "2425"
    pub fn year_code(&self) -> String {
        self.academic_year.replace('/', "")
    }
}

/// Find the week whose `(start, end]` interval contains `reference`.
///
/// Relies on `weeks` being sorted by start date: the scan stops at the first
/// record starting after `reference`.
pub fn find_week(weeks: &[WeekRecord], reference: NaiveDate) -> Option<TermWeek> {
    for week in weeks {
        if week.start < reference && reference <= week.end {
            return Some(TermWeek::from_record(week));
        }
        if reference < week.start {
            break;
        }
    }
    None
}

/// Year code of the following academic year: "2425" -> "2526".
///
/// Codes that are not two two-digit components are returned unchanged.
pub fn next_year_code(code: &str) -> String {
    match code.get(..2).and_then(|s| s.parse::<u32>().ok()) {
        Some(first) if code.len() == 4 => {
            let next = (first + 1) % 100;
            format!("{:02}{:02}", next, (next + 1) % 100)
        }
        _ => code.to_string(),
    }
}

/// Portion of the academic year a week number falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermPeriod {
    Term1,
    Christmas,
    Term2,
    Easter,
    Term3,
    Summer,
}

impl TermPeriod {
    pub fn of_week(week: u32) -> Self {
        match week {
            1..=10 => TermPeriod::Term1,
            11..=14 => TermPeriod::Christmas,
            15..=24 => TermPeriod::Term2,
            25..=29 => TermPeriod::Easter,
            30..=39 => TermPeriod::Term3,
            _ => TermPeriod::Summer,
        }
    }

    pub fn in_term(self) -> bool {
        matches!(self, TermPeriod::Term1 | TermPeriod::Term2 | TermPeriod::Term3)
    }

    /// Week range of the current term, or of the next one during a break
    pub fn term_weeks(self) -> &'static str {
        match self {
            TermPeriod::Term1 | TermPeriod::Summer => "1-10",
            TermPeriod::Christmas | TermPeriod::Term2 => "15-24",
            TermPeriod::Easter | TermPeriod::Term3 => "30-39",
        }
    }
}

/// A labelled timetable page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableLink {
    pub label: String,
    pub url: String,
}

/// This week, next week and this/next term links for a timetabled room.
///
/// `base` is the timetabling host, e.g.
/// `https://timetablingmanagement.warwick.ac.uk`.
pub fn timetable_links(base: &str, current: &TermWeek, room_id: &str) -> [TimetableLink; 3] {
    let year = current.year_code();
    let room = urlencoding::encode(room_id);
    let page = |year: &str, week: &str| {
        format!(
            "{}/SWS{}/roomtimetable.asp?id={}&week={}",
            base.trim_end_matches('/'),
            year,
            room,
            week
        )
    };

    let (next_week_year, next_week) = if current.week_number < 52 {
        (year.clone(), current.week_number + 1)
    } else {
        (next_year_code(&year), 1)
    };

    let period = TermPeriod::of_week(current.week_number);
    let term_year = if period == TermPeriod::Summer {
        next_year_code(&year)
    } else {
        year.clone()
    };

    [
        TimetableLink {
            label: format!("This Week (wb {})", current.week_start_label()),
            url: page(&year, &current.week_number.to_string()),
        },
        TimetableLink {
            label: format!("Next Week (wb {})", current.next_week_start_label()),
            url: page(&next_week_year, &next_week.to_string()),
        },
        TimetableLink {
            label: format!("{} Term", if period.in_term() { "This" } else { "Next" }),
            url: page(&term_year, period.term_weeks()),
        },
    ]
}
