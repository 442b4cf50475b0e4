use chrono::{Datelike, DateTime, FixedOffset, NaiveDate, SubsecRound, TimeZone, Utc, Weekday};
use iso8601::Date;
use xml::escape::escape_str_pcdata;

use std::borrow::Cow;

/// Escape a string for use as XML characters.
///
/// `&`, `<` and `>` are always escaped. The resulting string is *not* suitable for use in XML
/// attributes, but XML-RPC doesn't use those.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    let escaped = escape_str_pcdata(s);
    if escaped.contains('>') {
        Cow::Owned(escaped.replace('>', "&gt;"))
    } else {
        escaped
    }
}

/// Formats a timestamp the way `<dateTime.iso8601>` is written: `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_datetime(date_time: &DateTime<Utc>) -> String {
    date_time.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Whether the year of `date_time` fits the four digits of `<dateTime.iso8601>`.
pub fn has_wire_year(date_time: &DateTime<Utc>) -> bool {
    (0..=9999).contains(&date_time.year())
}

/// Drops the sub-second part of a timestamp.
pub fn truncate_datetime(date_time: DateTime<Utc>) -> DateTime<Utc> {
    date_time.trunc_subsecs(0)
}

/// Parses the content of a `<dateTime.iso8601>` into a UTC timestamp.
///
/// Accepts everything `iso8601` does, including the compact `19980717T14:08:55` form found in the
/// XML-RPC spec examples. A missing offset means UTC. Fractional seconds are dropped.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let parsed = iso8601::datetime(s.trim()).ok()?;

    let date = match parsed.date {
        Date::YMD { year, month, day } => NaiveDate::from_ymd_opt(year, month, day),
        Date::Week { year, ww, d } => NaiveDate::from_isoywd_opt(year, ww, iso_weekday(d)?),
        Date::Ordinal { year, ddd } => NaiveDate::from_yo_opt(year, ddd),
    }?;

    let time = parsed.time;
    let local = date.and_hms_opt(time.hour, time.minute, time.second)?;
    let offset = FixedOffset::east_opt(time.tz_offset_hours * 3600 + time.tz_offset_minutes * 60)?;

    offset
        .from_local_datetime(&local)
        .single()
        .map(|date_time| date_time.with_timezone(&Utc))
}

fn iso_weekday(d: u32) -> Option<Weekday> {
    Some(match d {
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        7 => Weekday::Sun,
        _ => return None,
    })
}
