//! Resolves the publication date of a document. Resolution never fails: a
//! missing or malformed `date` falls back to the source file's modification
//! time, so bad metadata can't break a build.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::time::SystemTime;

/// The only accepted spelling of a metadata date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct Resolver {
    pattern: Regex,
}

impl Resolver {
    pub fn new() -> Result<Resolver, regex::Error> {
        Ok(Resolver {
            pattern: Regex::new(r"^\d{4}-\d{2}-\d{2}$")?,
        })
    }

    /// Resolves `date` (the first `date` metadata value, if any) to midnight
    /// of that day. Falls back to `modified` when `date` is absent, doesn't
    /// look like `YYYY-MM-DD`, or names a day that doesn't exist.
    pub fn resolve(&self, date: Option<&str>, modified: SystemTime) -> NaiveDateTime {
        date.and_then(|s| self.parse(s))
            .unwrap_or_else(|| modification_date(modified))
    }

    /// Parses a strict `YYYY-MM-DD` string to midnight of that day.
    pub fn parse(&self, date: &str) -> Option<NaiveDateTime> {
        if !self.pattern.is_match(date) {
            return None;
        }
        NaiveDate::parse_from_str(date, DATE_FORMAT)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

/// The local wall-clock time of a file modification.
pub fn modification_date(modified: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(modified).naive_local()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    fn modified() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn test_valid_date() -> Result<(), regex::Error> {
        let resolver = Resolver::new()?;
        let wanted = NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        assert_eq!(wanted, Some(resolver.resolve(Some("2024-03-01"), modified())));
        Ok(())
    }

    #[test]
    fn test_fallbacks() -> Result<(), regex::Error> {
        let resolver = Resolver::new()?;
        let fallback = modification_date(modified());
        for input in [
            None,
            Some(""),
            Some("not-a-date"),
            Some("2024-1-5"),
            Some("2024-02-30"),
            Some("2024-01-01T10:00"),
            Some("+2024-01-01"),
        ] {
            assert_eq!(fallback, resolver.resolve(input, modified()), "{:?}", input);
        }
        Ok(())
    }
}
