pub mod booking;
pub mod client;
pub mod day_off;
pub mod service;

pub use booking::{Booking, BookingStatus};
pub use client::Client;
pub use day_off::DayOff;
pub use service::{Service, SERVICES};

use chrono::{NaiveDate, NaiveTime};

/// Формат дат в сообщениях и callback-данных: ДД.ММ.ГГГГ
pub const DATE_FORMAT: &str = "%d.%m.%Y";
/// Формат времени: ЧЧ:ММ
pub const TIME_FORMAT: &str = "%H:%M";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let s = format_date(date);
        assert_eq!(s, "15.03.2025");
        assert_eq!(parse_date(&s), Some(date));
    }

    #[test]
    fn time_roundtrip() {
        let time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let s = format_time(time);
        assert_eq!(s, "10:00");
        assert_eq!(parse_time(&s), Some(time));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_date("2025-03-15"), None);
        assert_eq!(parse_date("42.13.2025"), None);
        assert_eq!(parse_time("25:00"), None);
    }
}
