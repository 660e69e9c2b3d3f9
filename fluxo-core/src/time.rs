//! Time utilities: timezone-aware processing dates.

use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Today's calendar date in an IANA tz like "America/Sao_Paulo".
pub fn today_in(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(tz.from_utc_datetime(&Utc::now().naive_utc()).date_naive())
}

/// Parse a `YYYY-MM-DD` date, as used on the command line and in config.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid date '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_today_in_known_zone() {
        assert!(today_in("America/Sao_Paulo").is_ok());
    }

    #[test]
    fn test_today_in_rejects_unknown_zone() {
        assert!(today_in("Mars/Olympus").is_err());
    }

    #[test]
    fn test_parse_iso_date() {
        let d = parse_iso_date("2024-11-14").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 11, 14).unwrap());
        assert!(parse_iso_date("14/11/2024").is_err());
    }
}
