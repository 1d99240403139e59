//! Resolves a calendar month to the range of instants it covers.

use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::{Error, timezone::get_offset_at};

/// The inclusive range of instants that make up one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    /// The first instant of the month.
    pub start: OffsetDateTime,
    /// The last instant of the month.
    pub end: OffsetDateTime,
}

/// Parse a month number from a request parameter.
///
/// Leading zeros are accepted, e.g. "03" is March.
///
/// # Errors
/// Returns [Error::InvalidInput] if `month` is missing, not a whole number or outside 1-12.
pub fn parse_month(month: Option<&str>) -> Result<Month, Error> {
    let invalid = || Error::InvalidInput("Invalid or missing month parameter".to_owned());

    let number: u8 = month
        .map(str::trim)
        .filter(|month| !month.is_empty())
        .ok_or_else(invalid)?
        .parse()
        .map_err(|_| invalid())?;

    Month::try_from(number).map_err(|_| invalid())
}

/// Parse a year from a request parameter, using `default_year` if it is not specified.
///
/// # Errors
/// Returns [Error::InvalidInput] if `year` is not a whole number.
pub fn parse_year(year: Option<&str>, default_year: i32) -> Result<i32, Error> {
    match year.map(str::trim).filter(|year| !year.is_empty()) {
        None => Ok(default_year),
        Some(year) => year
            .parse()
            .map_err(|_| Error::InvalidInput(format!("Invalid year parameter \"{year}\""))),
    }
}

/// Get the first and last instants of `month` in `year`, as observed in `local_timezone`.
///
/// `local_timezone` should be a canonical timezone name, e.g. "Pacific/Auckland".
/// The offset is looked up separately for the start and end of the month so
/// that months with a daylight saving change are covered exactly.
///
/// # Errors
/// Returns a:
/// - [Error::InvalidInput] if `year` is outside the supported calendar range,
/// - or [Error::InvalidTimezone] if `local_timezone` is not a known timezone.
pub fn resolve_month_range(
    month: Month,
    year: i32,
    local_timezone: &str,
) -> Result<MonthRange, Error> {
    let first_day = first_day_of_month(year, month)?;
    let first_day_of_next_month = match month {
        Month::December => first_day_of_month(year + 1, Month::January)?,
        _ => first_day_of_month(year, month.next())?,
    };

    let start = local_midnight(first_day, local_timezone)?;
    let end = local_midnight(first_day_of_next_month, local_timezone)? - Duration::nanoseconds(1);

    Ok(MonthRange { start, end })
}

fn first_day_of_month(year: i32, month: Month) -> Result<Date, Error> {
    Date::from_calendar_date(year, month, 1)
        .map_err(|_| Error::InvalidInput(format!("The year {year} is out of range")))
}

fn local_midnight(date: Date, local_timezone: &str) -> Result<OffsetDateTime, Error> {
    let midnight = PrimitiveDateTime::new(date, Time::MIDNIGHT);
    let offset_at = |at: OffsetDateTime| {
        get_offset_at(local_timezone, at)
            .ok_or_else(|| Error::InvalidTimezone(local_timezone.to_owned()))
    };

    // Timezones never change offset more than once a day, so the offsets a day
    // either side of midnight are the only ones midnight can be observed with.
    let as_utc = midnight.assume_utc();
    let offset_before = offset_at(as_utc.checked_sub(Duration::days(1)).unwrap_or(as_utc))?;
    let offset_after = offset_at(as_utc.checked_add(Duration::days(1)).unwrap_or(as_utc))?;

    let before = midnight.assume_offset(offset_before);
    let after = midnight.assume_offset(offset_after);

    let mut observed = None;
    for candidate in [before, after] {
        let is_observed = offset_at(candidate)? == candidate.offset();
        if is_observed && observed.is_none_or(|earliest| candidate < earliest) {
            observed = Some(candidate);
        }
    }

    // When the clocks skip midnight, the day starts at the moment they move forward,
    // which is midnight under the offset in effect before the change.
    Ok(observed.unwrap_or(before))
}
