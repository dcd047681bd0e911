use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use time::{OffsetDateTime, UtcOffset};

use crate::model::Day;

static TIME_REGEX: Lazy<Regex> =
  Lazy::new(|| Regex::new("^\\s*(\\d{1,2}):(\\d{2})\\s+([AaPp][Mm])\\s*$").unwrap());

/// Parses a 12-hour time like `08:30 am` or `1:05 PM` into minutes since
/// midnight. Returns `None` for anything that is not of that shape, which
/// makes every comparison against it fail.
pub fn parse_minutes(value: &str) -> Option<u16> {
  let captures = TIME_REGEX.captures(value)?;

  let mut hours = u16::from_str(captures.get(1)?.as_str()).ok()?;
  let minutes = u16::from_str(captures.get(2)?.as_str()).ok()?;

  if hours > 12 || minutes > 59 {
    return None;
  }

  let pm = captures.get(3)?.as_str().eq_ignore_ascii_case("pm");
  if pm && hours < 12 {
    hours += 12;
  }
  if !pm && hours == 12 {
    hours = 0;
  }

  Some(hours * 60 + minutes)
}

/// Renders minutes since midnight the way the admin time picker writes them.
pub fn format_minutes(minutes: u16) -> String {
  let minutes = minutes % (24 * 60);
  let (hours, minutes) = (minutes / 60, minutes % 60);
  let meridiem = if hours < 12 { "am" } else { "pm" };
  let hours = match hours % 12 {
    0 => 12,
    hours => hours,
  };

  format!("{hours:0>2}:{minutes:0>2} {meridiem}")
}

pub fn minutes_of_day(now: OffsetDateTime) -> u16 {
  now.hour() as u16 * 60 + now.minute() as u16
}

/// Weekday of the timestamp, Sunday-indexed like the Gregorian week.
pub fn weekday_name(now: OffsetDateTime) -> Day {
  now.weekday().into()
}

/// Offset of the local wall clock, UTC when unknown. Only reliable while the
/// process is still single threaded.
pub fn local_offset() -> UtcOffset {
  UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn now(offset: UtcOffset) -> OffsetDateTime {
  OffsetDateTime::now_utc().to_offset(offset)
}

#[cfg(test)]
mod tests {
  use time::macros::datetime;

  use super::*;

  #[test]
  fn parses_meridiem_boundaries() {
    assert_eq!(parse_minutes("12:00 am"), Some(0));
    assert_eq!(parse_minutes("12:00 pm"), Some(720));
    assert_eq!(parse_minutes("1:05 pm"), Some(785));
    assert_eq!(parse_minutes("11:59 pm"), Some(1439));
    assert_eq!(parse_minutes("08:30 AM"), Some(510));
    assert_eq!(parse_minutes("12:20 am"), Some(20));
  }

  #[test]
  fn rejects_malformed_times() {
    assert_eq!(parse_minutes("08:30"), None);
    assert_eq!(parse_minutes("08:30am"), None);
    assert_eq!(parse_minutes("13:00 pm"), None);
    assert_eq!(parse_minutes("10:75 am"), None);
    assert_eq!(parse_minutes("ten past eight"), None);
    assert_eq!(parse_minutes(""), None);
  }

  #[test]
  fn formats_like_the_time_picker() {
    assert_eq!(format_minutes(0), "12:00 am");
    assert_eq!(format_minutes(510), "08:30 am");
    assert_eq!(format_minutes(785), "01:05 pm");
    assert_eq!(parse_minutes(&format_minutes(1439)), Some(1439));
  }

  #[test]
  fn resolves_sunday_indexed_weekdays() {
    assert_eq!(weekday_name(datetime!(2026-02-21 09:00 UTC)), Day::Saturday);
    assert_eq!(weekday_name(datetime!(2026-02-22 00:00 UTC)), Day::Sunday);
    assert_eq!(weekday_name(datetime!(2026-02-27 23:59 UTC)), Day::Friday);
    assert_eq!(minutes_of_day(datetime!(2026-02-21 09:15 UTC)), 555);
  }

  #[test]
  fn wall_clock_follows_offset() {
    let dhaka = UtcOffset::from_hms(6, 0, 0).unwrap();
    let late = datetime!(2026-02-20 20:30 UTC).to_offset(dhaka);

    assert_eq!(weekday_name(late), Day::Saturday);
    assert_eq!(minutes_of_day(late), 150);
    assert_eq!(now(dhaka).offset(), dhaka);
  }
}
