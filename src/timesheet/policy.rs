use chrono::{Datelike, NaiveDate, Weekday};

/// Expected working minutes per day of week. The company default is a
/// 44-hour week: 8h Monday-Friday, 4h Saturday, Sunday off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSchedule {
    pub weekday_minutes: u32,
    pub saturday_minutes: u32,
    pub sunday_minutes: u32,
}

impl Default for WorkSchedule {
    fn default() -> Self {
        Self {
            weekday_minutes: 480,
            saturday_minutes: 240,
            sunday_minutes: 0,
        }
    }
}

impl WorkSchedule {
    pub fn expected_minutes(&self, date: NaiveDate) -> u32 {
        match date.weekday() {
            Weekday::Sun => self.sunday_minutes,
            Weekday::Sat => self.saturday_minutes,
            _ => self.weekday_minutes,
        }
    }
}
