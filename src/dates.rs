use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

static COMPACT_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap());
static YEAR_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized date '{raw}'")]
pub struct DateError {
    pub raw: String,
}

/// Turns a free-form date string into a canonical one.
pub trait DateNormalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> Result<String, DateError>;
}

/// Normalizes to ISO 8601: `YYYY-MM-DD` for dates, RFC 3339 for datetimes
/// with an offset, `YYYY-MM-DDTHH:MM:SS` without one, and `YYYY-MM` / `YYYY`
/// for partial dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronoDateNormalizer;

impl DateNormalizer for ChronoDateNormalizer {
    fn normalize(&self, raw: &str) -> Result<String, DateError> {
        let value = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(dt.to_rfc3339());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
            return Ok(dt.to_rfc3339());
        }
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
            }
        }
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Ok(date.format("%Y-%m-%d").to_string());
            }
        }
        if let Some(captures) = COMPACT_DATE_RE.captures(value) {
            let date = NaiveDate::from_ymd_opt(
                captures[1].parse().unwrap_or_default(),
                captures[2].parse().unwrap_or_default(),
                captures[3].parse().unwrap_or_default(),
            );
            if let Some(date) = date {
                return Ok(date.format("%Y-%m-%d").to_string());
            }
        }
        if let Some(captures) = YEAR_MONTH_RE.captures(value) {
            let month: u32 = captures[2].parse().unwrap_or_default();
            if (1..=12).contains(&month) {
                return Ok(format!("{}-{:02}", &captures[1], month));
            }
        }
        if YEAR_RE.is_match(value) {
            return Ok(value.to_string());
        }

        Err(DateError {
            raw: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_formats() {
        let n = ChronoDateNormalizer;
        assert_eq!(n.normalize("2020-01-01").unwrap(), "2020-01-01");
        assert_eq!(n.normalize(" June 5, 2020 ").unwrap(), "2020-06-05");
        assert_eq!(n.normalize("5 Jun 2020").unwrap(), "2020-06-05");
        assert_eq!(n.normalize("20200605").unwrap(), "2020-06-05");
        assert_eq!(
            n.normalize("2021-03-04T10:00:00Z").unwrap(),
            "2021-03-04T10:00:00+00:00"
        );
        assert_eq!(
            n.normalize("2021-03-04 10:00:00").unwrap(),
            "2021-03-04T10:00:00"
        );
        assert_eq!(n.normalize("2019-7").unwrap(), "2019-07");
        assert_eq!(n.normalize("1999").unwrap(), "1999");
    }

    #[test]
    fn rejects_garbage() {
        let n = ChronoDateNormalizer;
        assert!(n.normalize("last tuesday").is_err());
        assert!(n.normalize("20201340").is_err());
        assert!(n.normalize("2019-13").is_err());
    }
}
