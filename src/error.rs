use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::models::{format_date, format_time};

/// Ошибки доменной логики бота. Display используется в логах,
/// для ответов пользователю есть `user_message`.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("date {date} is blocked as a day off")]
    DateBlocked {
        date: NaiveDate,
        reason: Option<String>,
    },

    #[error("slot {date} {time} is already taken")]
    SlotTaken { date: NaiveDate, time: NaiveTime },

    #[error("day off for {0} already exists")]
    DuplicateDayOff(NaiveDate),

    #[error("booking {0} not found")]
    BookingNotFound(i64),

    #[error("user {0} is not allowed to run admin commands")]
    Unauthorized(u64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BotError {
    /// Текст для пользователя. Валидационные ошибки показываются как есть,
    /// ошибки БД скрываются за общим сообщением.
    pub fn user_message(&self) -> String {
        match self {
            BotError::DateBlocked { date, reason } => {
                let reason_text = reason
                    .as_deref()
                    .map(|r| format!(" ({r})"))
                    .unwrap_or_default();
                format!(
                    "❌ {} — выходной день барбера{}! Выберите другую дату.",
                    format_date(*date),
                    reason_text
                )
            }
            BotError::SlotTaken { time, .. } => {
                format!(
                    "❌ Время {} уже занято! Выберите другое.",
                    format_time(*time)
                )
            }
            BotError::DuplicateDayOff(date) => {
                format!("❌ {} уже отмечен как выходной", format_date(*date))
            }
            BotError::BookingNotFound(_) => "❌ Запись не найдена".to_string(),
            BotError::Unauthorized(_) => "⛔ У вас нет доступа к этой команде.".to_string(),
            BotError::Database(_) => "⚠️ Внутренняя ошибка. Попробуйте еще раз.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_blocked_message_includes_reason() {
        let err = BotError::DateBlocked {
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            reason: Some("болею".to_string()),
        };
        let msg = err.user_message();
        assert!(msg.contains("15.03.2025"));
        assert!(msg.contains("(болею)"));
    }

    #[test]
    fn date_blocked_message_without_reason() {
        let err = BotError::DateBlocked {
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            reason: None,
        };
        assert!(!err.user_message().contains('('));
    }

    #[test]
    fn slot_taken_message_names_time() {
        let err = BotError::SlotTaken {
            date: NaiveDate::from_ymd_opt(2025, 3, 16).unwrap(),
            time: chrono::NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        };
        assert!(err.user_message().contains("14:00"));
    }
}
