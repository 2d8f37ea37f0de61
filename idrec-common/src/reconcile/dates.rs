//! Date normalization for date-typed fields
//!
//! Accepted layouts, tried in order:
//! 1. `YYYY-MM-DD`
//! 2. `DD/MM/YYYY`
//! 3. `DD-MM-YYYY`
//!
//! Years must carry four digits. Day and month take one or two digits.
//! Anything else (including impossible dates such as 31/02) is "no date",
//! which callers treat as a normal outcome.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy)]
enum ComponentOrder {
    YearMonthDay,
    DayMonthYear,
}

#[derive(Debug, Clone, Copy)]
struct DateLayout {
    separator: char,
    order: ComponentOrder,
}

const ACCEPTED_LAYOUTS: [DateLayout; 3] = [
    DateLayout {
        separator: '-',
        order: ComponentOrder::YearMonthDay,
    },
    DateLayout {
        separator: '/',
        order: ComponentOrder::DayMonthYear,
    },
    DateLayout {
        separator: '-',
        order: ComponentOrder::DayMonthYear,
    },
];

impl DateLayout {
    fn parse(&self, text: &str) -> Option<NaiveDate> {
        let mut parts = text.split(self.separator);
        let (first, second, third) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let (year, month, day) = match self.order {
            ComponentOrder::YearMonthDay => (first, second, third),
            ComponentOrder::DayMonthYear => (third, second, first),
        };

        let year = digits(year, 4, 4)?;
        let month = digits(month, 1, 2)?;
        let day = digits(day, 1, 2)?;

        NaiveDate::from_ymd_opt(year as i32, month, day)
    }
}

/// Parse an all-ASCII-digit component whose length lies in `min..=max`
fn digits(component: &str, min: usize, max: usize) -> Option<u32> {
    if component.len() < min
        || component.len() > max
        || !component.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    component.parse().ok()
}

/// Parse a date in one of the accepted layouts
///
/// Returns the first layout's successful parse, or `None`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    ACCEPTED_LAYOUTS.iter().find_map(|layout| layout.parse(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_layout() {
        assert_eq!(parse_date("2024-01-05"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_slash_layout_is_day_first() {
        assert_eq!(parse_date("05/01/2024"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_dash_day_first_layout() {
        assert_eq!(parse_date("01-01-2020"), Some(ymd(2020, 1, 1)));
        assert_eq!(parse_date("28-02-1990"), Some(ymd(1990, 2, 28)));
    }

    #[test]
    fn test_single_digit_day_and_month() {
        assert_eq!(parse_date("5/1/2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("2024-1-5"), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_invalid_calendar_date_is_none() {
        assert_eq!(parse_date("31/02/2020"), None);
        assert_eq!(parse_date("2021-02-29"), None);
    }

    #[test]
    fn test_two_digit_year_is_none() {
        assert_eq!(parse_date("05/01/24"), None);
        assert_eq!(parse_date("24-01-05"), None);
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("None"), None);
        assert_eq!(parse_date("5th January 2024"), None);
        assert_eq!(parse_date("2024/01/05"), None);
        assert_eq!(parse_date(" 2024-01-05"), None);
        assert_eq!(parse_date("2024-01-05-01"), None);
    }
}
