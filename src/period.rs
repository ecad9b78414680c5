// 📅 Fiscal periods - (tahun, bulan) pairs and the visibility rule
// Month names follow the Indonesian calendar used by the shop

use crate::error::{BookError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Januari,
    Februari,
    Maret,
    April,
    Mei,
    Juni,
    Juli,
    Agustus,
    September,
    Oktober,
    November,
    Desember,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Januari,
        Month::Februari,
        Month::Maret,
        Month::April,
        Month::Mei,
        Month::Juni,
        Month::Juli,
        Month::Agustus,
        Month::September,
        Month::Oktober,
        Month::November,
        Month::Desember,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Month::Januari => "Januari",
            Month::Februari => "Februari",
            Month::Maret => "Maret",
            Month::April => "April",
            Month::Mei => "Mei",
            Month::Juni => "Juni",
            Month::Juli => "Juli",
            Month::Agustus => "Agustus",
            Month::September => "September",
            Month::Oktober => "Oktober",
            Month::November => "November",
            Month::Desember => "Desember",
        }
    }

    /// 1-based month number
    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    pub fn from_number(n: u32) -> Option<Month> {
        if (1..=12).contains(&n) {
            Some(Month::ALL[(n - 1) as usize])
        } else {
            None
        }
    }

    /// Exact match on the Indonesian name (as sent by the report forms)
    pub fn from_name(name: &str) -> Option<Month> {
        Month::ALL.iter().copied().find(|m| m.name() == name.trim())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fiscal month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: Month,
}

impl Period {
    pub fn new(year: i32, month: Month) -> Self {
        Period { year, month }
    }

    /// Build from the `tahun`/`bulan` query parameters
    pub fn parse(tahun: &str, bulan: &str) -> Result<Period> {
        let year = tahun
            .trim()
            .parse::<i32>()
            .map_err(|_| BookError::InvalidYear(tahun.to_string()))?;
        let month = Month::from_name(bulan).ok_or_else(|| BookError::UnknownMonth(bulan.to_string()))?;
        Ok(Period { year, month })
    }

    pub fn of_date(date: NaiveDate) -> Period {
        // month() is always 1..=12
        let month = Month::from_number(date.month()).unwrap_or(Month::Januari);
        Period { year: date.year(), month }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month.number()
    }

    pub fn next(&self) -> Period {
        match self.month {
            Month::Desember => Period::new(self.year + 1, Month::Januari),
            m => Period::new(self.year, Month::ALL[m.number() as usize]),
        }
    }

    pub fn previous(&self) -> Period {
        match self.month {
            Month::Januari => Period::new(self.year - 1, Month::Desember),
            m => Period::new(self.year, Month::ALL[(m.number() - 2) as usize]),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.number(), 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.next().first_day().and_then(|d| d.pred_opt())
    }

    fn key(&self) -> (i32, u32) {
        (self.year, self.month.number())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

/// A period is hidden when it lies after today's month, or before the month of
/// the earliest journal entry. With no journal at all only the first rule applies.
pub fn is_period_visible(period: Period, today: NaiveDate, earliest: Option<Period>) -> bool {
    if period.key() > Period::of_date(today).key() {
        return false;
    }
    match earliest {
        Some(first) => period.key() >= first.key(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_period() {
        let p = Period::parse("2025", "November").unwrap();
        assert_eq!(p, Period::new(2025, Month::November));
        assert_eq!(p.month.number(), 11);

        assert!(matches!(Period::parse("2025", "Nov"), Err(BookError::UnknownMonth(_))));
        assert!(matches!(Period::parse("abcd", "Mei"), Err(BookError::InvalidYear(_))));
    }

    #[test]
    fn test_next_previous_wrap() {
        let des = Period::new(2024, Month::Desember);
        assert_eq!(des.next(), Period::new(2025, Month::Januari));
        assert_eq!(Period::new(2025, Month::Januari).previous(), des);
        assert_eq!(Period::new(2025, Month::Mei).previous(), Period::new(2025, Month::April));
    }

    #[test]
    fn test_contains() {
        let p = Period::new(2025, Month::November);
        assert!(p.contains(date(2025, 11, 30)));
        assert!(!p.contains(date(2025, 10, 31)));
        assert!(!p.contains(date(2024, 11, 1)));
        assert_eq!(p.last_day(), Some(date(2025, 11, 30)));
        assert_eq!(Period::new(2024, Month::Februari).last_day(), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_future_period_hidden() {
        let today = date(2025, 11, 15);
        assert!(is_period_visible(Period::new(2025, Month::November), today, None));
        assert!(!is_period_visible(Period::new(2025, Month::Desember), today, None));
        assert!(!is_period_visible(Period::new(2026, Month::Januari), today, None));
    }

    #[test]
    fn test_period_before_first_journal_hidden() {
        let today = date(2025, 11, 15);
        let first = Some(Period::new(2025, Month::Oktober));
        assert!(!is_period_visible(Period::new(2025, Month::September), today, first));
        assert!(is_period_visible(Period::new(2025, Month::Oktober), today, first));
        assert!(is_period_visible(Period::new(2025, Month::November), today, first));
    }
}
