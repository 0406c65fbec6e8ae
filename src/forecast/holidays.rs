//! Localized holiday calendar for Dhanbad, Jharkhand (2024)

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use strum::{Display, EnumString};

/// Year the embedded table covers.
pub const HOLIDAY_YEAR: i32 = 2024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
pub enum HolidayCategory {
    National,
    Religious,
    Industrial,
    State,
    #[serde(rename = "Local_Tribal")]
    #[strum(serialize = "Local_Tribal")]
    LocalTribal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holiday {
    pub month: u32,
    pub day: u32,
    pub name: &'static str,
    pub category: HolidayCategory,
}

impl Holiday {
    const fn new(month: u32, day: u32, name: &'static str, category: HolidayCategory) -> Self {
        Self {
            month,
            day,
            name,
            category,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(HOLIDAY_YEAR, self.month, self.day)
    }

    /// `YYYY-MM-DD`
    pub fn date_string(&self) -> String {
        format!("{HOLIDAY_YEAR}-{:02}-{:02}", self.month, self.day)
    }
}

use HolidayCategory::*;

pub static HOLIDAYS: [Holiday; 20] = [
    Holiday::new(1, 1, "New Year Day", National),
    Holiday::new(1, 26, "Republic Day", National),
    Holiday::new(3, 8, "Holi", Religious),
    Holiday::new(4, 17, "Ram Navami", Religious),
    Holiday::new(5, 1, "Labour Day", Industrial),
    Holiday::new(6, 17, "Eid ul-Fitr", Religious),
    Holiday::new(6, 30, "Hul Diwas (Tribal Heroes Day)", State),
    Holiday::new(7, 15, "Coal Miners Day", Industrial),
    Holiday::new(8, 15, "Independence Day", National),
    Holiday::new(8, 26, "Janmashtami", Religious),
    Holiday::new(9, 16, "Eid al-Adha", Religious),
    Holiday::new(10, 2, "Gandhi Jayanti", National),
    Holiday::new(10, 12, "Dussehra", Religious),
    Holiday::new(11, 1, "Diwali", Religious),
    Holiday::new(11, 15, "Jharkhand Foundation Day", State),
    Holiday::new(11, 20, "Sohrai Festival", LocalTribal),
    Holiday::new(12, 4, "Miners Safety Day", Industrial),
    Holiday::new(12, 15, "Tusu Festival", LocalTribal),
    Holiday::new(12, 25, "Christmas", Religious),
    Holiday::new(9, 24, "Karam Puja", LocalTribal),
];

/// The full embedded table, in its fixed order.
pub fn holidays() -> &'static [Holiday] {
    &HOLIDAYS
}

/// The holiday falling on `date`, if any.
pub fn lookup(date: NaiveDate) -> Option<&'static Holiday> {
    HOLIDAYS
        .iter()
        .find(|h| date.year() == HOLIDAY_YEAR && h.month == date.month() && h.day == date.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_table_dates_are_valid() {
        assert_eq!(holidays().len(), 20);
        for h in holidays() {
            assert!(h.date().is_some(), "{} has an invalid date", h.name);
        }
    }

    #[test]
    fn test_lookup() {
        let diwali = lookup(NaiveDate::from_ymd_opt(2024, 11, 1).unwrap()).unwrap();
        assert_eq!(diwali.name, "Diwali");
        assert_eq!(diwali.category, HolidayCategory::Religious);

        assert!(lookup(NaiveDate::from_ymd_opt(2024, 11, 2).unwrap()).is_none());
        // Only the 2024 table is embedded
        assert!(lookup(NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()).is_none());
    }

    #[test]
    fn test_category_names() {
        assert_eq!(HolidayCategory::LocalTribal.to_string(), "Local_Tribal");
        assert_eq!(
            HolidayCategory::from_str("Industrial").unwrap(),
            HolidayCategory::Industrial
        );
        assert_eq!(
            serde_json::to_value(HolidayCategory::LocalTribal).unwrap(),
            "Local_Tribal"
        );
    }

    #[test]
    fn test_date_string() {
        assert_eq!(HOLIDAYS[1].date_string(), "2024-01-26");
    }
}
