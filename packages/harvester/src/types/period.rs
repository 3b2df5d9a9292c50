//! The (year, month) scope of one crawl.

use chrono::{Datelike, Month, Utc};
use serde::{Deserialize, Serialize};

/// The period a crawl and its downloads are scoped to.
///
/// The month's English name drives the site's month dropdown; the month
/// number and year drive the filesystem layout and document URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Calendar year (e.g. 2026)
    pub year: i32,

    /// Calendar month
    pub month: Month,
}

impl Period {
    /// Create a period for a given year and month.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The current period in UTC.
    pub fn current() -> Self {
        let now = Utc::now();
        let month = Month::try_from(now.month() as u8).unwrap_or(Month::January);
        Self {
            year: now.year(),
            month,
        }
    }

    /// English month name, as the search form's month dropdown expects it.
    pub fn month_name(&self) -> &'static str {
        self.month.name()
    }

    /// Month number (1-12), used in filesystem paths.
    pub fn month_number(&self) -> u32 {
        self.month.number_from_month()
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_name_and_number() {
        let period = Period::new(2026, Month::June);
        assert_eq!(period.month_name(), "June");
        assert_eq!(period.month_number(), 6);
        assert_eq!(period.to_string(), "June 2026");
    }

    #[test]
    fn test_current_is_valid() {
        let period = Period::current();
        assert!((1..=12).contains(&period.month_number()));
    }
}
