//! Bell-list day grouping
//!
//! Groups notifications by calendar day, descending, with relative headers
//! for the two most recent days. Grouping is pure over an explicit "now" so
//! tests and midnight rollovers stay deterministic.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use feed_core::entities::Notification;

/// One calendar day of the bell list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySection {
    /// "Today", "Yesterday", or a formatted date
    pub header: String,
    pub date: NaiveDate,
    /// Notifications of that day, newest first
    pub notifications: Vec<Notification>,
}

/// Group notifications into descending day sections
#[must_use]
pub fn day_sections(notifications: &[Notification], now: DateTime<Utc>) -> Vec<DaySection> {
    let mut sorted: Vec<Notification> = notifications.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut sections: Vec<DaySection> = Vec::new();
    for notification in sorted {
        let date = notification.created_at.date_naive();
        match sections.last_mut() {
            Some(section) if section.date == date => section.notifications.push(notification),
            _ => sections.push(DaySection {
                header: header_for(date, now),
                date,
                notifications: vec![notification],
            }),
        }
    }
    sections
}

fn header_for(date: NaiveDate, now: DateTime<Utc>) -> String {
    let today = now.date_naive();
    if date == today {
        "Today".to_string()
    } else if date == today - Duration::days(1) {
        "Yesterday".to_string()
    } else {
        format!("{} {}, {}", month_name(date.month()), date.day(), date.year())
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}
