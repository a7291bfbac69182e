use crate::dates::{DateError, WeekRange, delivery_date, utc_midnight};
use crate::models::WeekDay;
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub day: WeekDay,
    pub date: NaiveDate,
}

// Only the date portion of `start` is read.
pub fn classify(start: &str, week: &WeekRange) -> Result<Option<Classified>, DateError> {
    let date = delivery_date(start)?;
    let instant = utc_midnight(date);
    if instant < week.start || instant > week.end {
        return Ok(None);
    }

    Ok(WeekDay::from_sunday_index(date.weekday().num_days_from_sunday())
        .map(|day| Classified { day, date }))
}
