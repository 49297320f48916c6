//! Calendar arithmetic for stepping a recurring transaction forward by one period.

use time::{Date, Duration, Month, PrimitiveDateTime, util::is_leap_year};

use crate::{Error, transaction::Frequency};

/// The number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

/// The date one `frequency` period after `date`, keeping the time of day.
///
/// Monthly and yearly steps move by calendar months and clamp to the last day
/// of the target month, e.g. Jan 31 steps to Feb 29 in a leap year and
/// Feb 29 steps to Feb 28 of the next year.
///
/// # Errors
/// Returns an [Error::DateOutOfRange] if the result falls outside the range
/// of dates that can be represented.
pub fn next_due_date(
    date: PrimitiveDateTime,
    frequency: Frequency,
) -> Result<PrimitiveDateTime, Error> {
    let next = match frequency {
        Frequency::Daily => date.checked_add(Duration::days(1)),
        Frequency::Weekly => date.checked_add(Duration::weeks(1)),
        Frequency::Monthly => add_months(date.date(), 1).map(|day| date.replace_date(day)),
        Frequency::Yearly => add_months(date.date(), 12).map(|day| date.replace_date(day)),
    };

    next.ok_or_else(|| Error::DateOutOfRange(date.to_string()))
}

fn add_months(date: Date, months: i32) -> Option<Date> {
    let month_index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 + months;
    let year = month_index.div_euclid(12);
    let month = Month::try_from(u8::try_from(month_index.rem_euclid(12) + 1).ok()?).ok()?;
    let day = date.day().min(days_in_month(year, month));

    Date::from_calendar_date(year, month, day).ok()
}
