use std::env;

use chrono::NaiveTime;
use teloxide::types::{ChatId, UserId};

use crate::error::BotError;

/// Контакты барбершопа для сообщений клиентам.
#[derive(Debug, Clone, Copy)]
pub struct ShopInfo {
    pub name: &'static str,
    pub address: &'static str,
    pub phone: &'static str,
}

pub const SHOP: ShopInfo = ShopInfo {
    name: "BlackJack Barbershop",
    address: "г. Москва, ул. Пушкина, д. 10",
    phone: "+7 (999) 123-45-67",
};

/// Конфигурация бота, читается один раз при старте.
#[derive(Debug, Clone)]
pub struct Config {
    /// Чат барбера: сюда идут уведомления, этому пользователю доступна админка.
    pub barber_chat_id: ChatId,
    /// Горизонт записи для клиентов, дней.
    pub booking_days_ahead: u32,
    /// Горизонт выбора даты выходного в админке, дней.
    pub dayoff_days_ahead: u32,
    /// Кнопок времени в ряду клавиатуры.
    pub time_buttons_per_row: usize,
    pub shop: ShopInfo,
}

/// Подтверждение того, что вызывающий — барбер. Выдается только
/// `Config::authorize_admin`; админские операции требуют его как параметр.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess(());

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let barber_chat_id = env::var("BARBER_CHAT_ID")?.trim().parse::<i64>()?;

        Ok(Config {
            barber_chat_id: ChatId(barber_chat_id),
            booking_days_ahead: 14,
            dayoff_days_ahead: 30,
            time_buttons_per_row: 3,
            shop: SHOP,
        })
    }

    /// Единственная точка проверки прав: каждая админская операция
    /// начинается с этого вызова.
    pub fn authorize_admin(&self, user: UserId) -> Result<AdminAccess, BotError> {
        if ChatId(user.0 as i64) == self.barber_chat_id {
            Ok(AdminAccess(()))
        } else {
            Err(BotError::Unauthorized(user.0))
        }
    }
}

/// Рабочие часы: слоты по часу с 10:00 до 19:00 включительно.
pub fn working_hours() -> Vec<NaiveTime> {
    (10..=19)
        .map(|hour| NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            barber_chat_id: ChatId(777),
            booking_days_ahead: 14,
            dayoff_days_ahead: 30,
            time_buttons_per_row: 3,
            shop: SHOP,
        }
    }

    #[test]
    fn barber_is_authorized() {
        let config = test_config();
        assert!(config.authorize_admin(UserId(777)).is_ok());
    }

    #[test]
    fn stranger_is_rejected() {
        let config = test_config();
        let err = config.authorize_admin(UserId(123)).unwrap_err();
        assert!(matches!(err, BotError::Unauthorized(123)));
    }

    #[test]
    fn working_hours_span_the_day() {
        let hours = working_hours();
        assert_eq!(hours.len(), 10);
        assert_eq!(hours.first().unwrap().format("%H:%M").to_string(), "10:00");
        assert_eq!(hours.last().unwrap().format("%H:%M").to_string(), "19:00");
    }
}
