//! Habitual tools module
//!
//! Tool implementations behind the MCP server. Each takes the database and
//! an explicit `user_id`, and returns a serializable response.

pub mod categories;
pub mod habits;
pub mod statistics;
pub mod status;

use chrono::NaiveDate;

/// Parse an ISO `YYYY-MM-DD` date
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD", s))
}

/// Parse an optional ISO date, treating blank input as absent
pub(crate) fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match s.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_date(s).map(Some),
        None => Ok(None),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-03"), Ok(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()));
        assert!(parse_date("03/03/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date(None), Ok(None));
        assert_eq!(parse_optional_date(Some("  ")), Ok(None));
        assert!(parse_optional_date(Some("2025-03-03")).unwrap().is_some());
    }
}
