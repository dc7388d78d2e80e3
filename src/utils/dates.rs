use chrono::NaiveDate;

/// Parse an 8-digit `YYYYMMDD` date as sent by the listing screens.
///
/// Returns `None` for anything that is not exactly eight ASCII digits or that
/// does not name a real calendar day.
pub fn parse_compact_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = raw[0..4].parse().ok()?;
    let month: u32 = raw[4..6].parse().ok()?;
    let day: u32 = raw[6..8].parse().ok()?;

    if year < 1 {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a `YYYY-MM-DD` date used by the booking list filter
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
