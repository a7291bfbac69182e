use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid delivery date: {0:?}")]
pub struct DateError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekRange {
    pub labels: [String; 6],
    pub dates: [NaiveDate; 6],
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub fn current_week_range() -> WeekRange {
    current_week_range_at(Utc::now())
}

pub fn current_week_range_at(now: DateTime<Utc>) -> WeekRange {
    let monday = week_monday(now.date_naive());
    let dates: [NaiveDate; 6] = std::array::from_fn(|offset| monday + Duration::days(offset as i64));
    let labels = dates.map(format_ddmm);

    let start = utc_midnight(dates[0]);
    let end = utc_midnight(dates[5]) + Duration::days(1) - Duration::milliseconds(1);

    WeekRange {
        labels,
        dates,
        start,
        end,
    }
}

pub fn format_ddmm(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

// Each Sunday starts a new week (January 1's weekday is the offset, Sunday = 0).
// Not ISO-8601: the two differ around year boundaries.
pub fn week_ordinal(date: NaiveDate) -> u32 {
    let jan_first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
    let days = (date - jan_first).num_days() as u32;
    let offset = jan_first.weekday().num_days_from_sunday();
    (days + offset + 1).div_ceil(7)
}

pub fn is_date_string_past(ddmm: &str) -> bool {
    is_date_string_past_at(ddmm, Utc::now())
}

pub fn is_date_string_past_at(ddmm: &str, now: DateTime<Utc>) -> bool {
    let Some((day, month)) = ddmm.split_once('/') else {
        return false;
    };
    let (Ok(day), Ok(month)) = (day.trim().parse::<u32>(), month.trim().parse::<u32>()) else {
        return false;
    };
    match NaiveDate::from_ymd_opt(now.year(), month, day) {
        Some(date) => date < now.date_naive(),
        None => false,
    }
}

pub fn is_order_past(iso: &str) -> bool {
    is_order_past_at(iso, Utc::now())
}

pub fn is_order_past_at(iso: &str, now: DateTime<Utc>) -> bool {
    delivery_date(iso)
        .map(|date| date < now.date_naive())
        .unwrap_or(false)
}

pub fn delivery_date(iso: &str) -> Result<NaiveDate, DateError> {
    let date_part = iso.split('T').next().unwrap_or(iso);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| DateError(iso.to_string()))
}

pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn week_monday(today: NaiveDate) -> NaiveDate {
    let back = match today.weekday().num_days_from_sunday() {
        0 => 6,
        index => index - 1,
    };
    today - Duration::days(back as i64)
}
