use crate::config::ShopInfo;
use crate::models::{format_date, format_time, Booking, DayOff, Service};

/// Экранирование для ParseMode::Html: в сообщения подставляются
/// имена и телефоны, введенные пользователем.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn username_or_dash(username: Option<&str>) -> String {
    username
        .map(|u| format!("@{}", escape_html(u)))
        .unwrap_or_else(|| "не указан".to_string())
}

pub fn welcome(first_name: &str, shop: &ShopInfo) -> String {
    format!(
        "👋 Привет, {}!\n\n\
        Добро пожаловать в барбершоп <b>{}</b>\n\n\
        💈 Я помогу вам записаться на стрижку.\n\
        Процесс займет всего минуту!\n\n\
        📋 <b>Доступные команды:</b>\n\
        /book - Записаться на стрижку\n\
        /my_bookings - Мои записи\n\
        /cancel - Отменить процесс записи",
        escape_html(first_name),
        shop.name
    )
}

pub fn booking_confirmed(booking: &Booking, service: &Service, shop: &ShopInfo) -> String {
    format!(
        "✅ <b>Запись подтверждена!</b>\n\n\
        🆔 <b>Номер записи:</b> <code>{}</code>\n\n\
        👤 <b>Имя:</b> {}\n\
        📞 <b>Телефон:</b> {}\n\
        🆔 <b>Telegram:</b> {}\n\
        📅 <b>Дата:</b> {}\n\
        🕐 <b>Время:</b> {}\n\
        💈 <b>Услуга:</b> {} {}\n\
        ⏱ <b>Длительность:</b> {} мин\n\
        💰 <b>Стоимость:</b> {}₽\n\n\
        📍 <b>Адрес:</b> {}\n\
        ☎️ <b>Контакт барбера:</b> {}\n\n\
        ⏰ <i>Пожалуйста, приходите за 5 минут до начала.</i>\n\
        <i>Если планы изменятся, используйте /my_bookings для отмены.</i>\n\n\
        <b>До встречи! 💈✨</b>",
        booking.id,
        escape_html(&booking.client_name),
        escape_html(&booking.client_phone),
        username_or_dash(booking.client_username.as_deref()),
        format_date(booking.date),
        format_time(booking.time),
        service.emoji,
        service.name,
        service.duration_min,
        service.price,
        shop.address,
        shop.phone,
    )
}

pub fn barber_new_booking(booking: &Booking) -> String {
    format!(
        "🔔 <b>НОВАЯ ЗАПИСЬ!</b>\n\n\
        🆔 <b>Номер:</b> <code>{}</code>\n\n\
        👤 <b>Клиент:</b> {}\n\
        📞 <b>Телефон:</b> {}\n\
        🆔 <b>Telegram:</b> {}\n\
        📅 <b>Дата:</b> {}\n\
        🕐 <b>Время:</b> {}\n\
        💈 <b>Услуга:</b> {}\n\
        ⏱ <b>Длительность:</b> {} мин\n\
        💰 <b>Стоимость:</b> {}₽",
        booking.id,
        escape_html(&booking.client_name),
        escape_html(&booking.client_phone),
        username_or_dash(booking.client_username.as_deref()),
        format_date(booking.date),
        format_time(booking.time),
        escape_html(&booking.service_name),
        booking.service_duration,
        booking.service_price,
    )
}

pub fn barber_booking_cancelled(booking: &Booking) -> String {
    format!(
        "❌ <b>ОТМЕНА ЗАПИСИ</b>\n\n\
        🆔 <b>Номер:</b> <code>{}</code>\n\
        👤 <b>Клиент:</b> {}\n\
        📅 <b>Дата:</b> {}\n\
        🕐 <b>Время:</b> {}\n\
        💈 <b>Услуга:</b> {}",
        booking.id,
        escape_html(&booking.client_name),
        format_date(booking.date),
        format_time(booking.time),
        escape_html(&booking.service_name),
    )
}

/// Уведомление клиенту об отмене его записи из-за выходного.
pub fn client_day_off_cancellation(booking: &Booking) -> String {
    format!(
        "❌ <b>Запись отменена!</b>\n\n\
        Ваша запись на {date} в {time} была отменена: барбер взял выходной.\n\n\
        🆔 <b>Номер записи:</b> <code>{id}</code>\n\
        💈 <b>Услуга:</b> {service}\n\
        📅 <b>Дата:</b> {date}\n\
        🕐 <b>Время:</b> {time}\n\n\
        Для новой записи используйте /book\n\n\
        Приносим извинения за неудобства! 😔",
        id = booking.id,
        service = escape_html(&booking.service_name),
        date = format_date(booking.date),
        time = format_time(booking.time),
    )
}

pub fn my_bookings_list(bookings: &[Booking]) -> String {
    let mut text = "<b>📋 Ваши записи:</b>\n\n".to_string();

    for booking in bookings {
        text.push_str(&format!(
            "🆔 <b>Номер:</b> <code>{}</code>\n\
            📅 {} в {}\n\
            💈 {}\n\
            💰 {}₽\n\n",
            booking.id,
            format_date(booking.date),
            format_time(booking.time),
            escape_html(&booking.service_name),
            booking.service_price,
        ));
    }

    text.push_str("<i>Нажмите на номер записи, чтобы отменить её.</i>");
    text
}

pub fn admin_bookings_list(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "📋 <b>Нет активных записей</b>".to_string();
    }

    let mut text = "📋 <b>Все активные записи:</b>\n\n".to_string();
    for booking in bookings {
        text.push_str(&format!(
            "🆔 <code>{}</code>\n\
            👤 {}\n\
            📞 {}\n\
            📅 {} в {}\n\
            💈 {}\n\
            💰 {}₽\n\
            ────────────────────\n",
            booking.id,
            escape_html(&booking.client_name),
            escape_html(&booking.client_phone),
            format_date(booking.date),
            format_time(booking.time),
            escape_html(&booking.service_name),
            booking.service_price,
        ));
    }
    text
}

pub fn admin_days_off_list(days_off: &[DayOff]) -> String {
    if days_off.is_empty() {
        return "📅 <b>Выходные дни не установлены</b>".to_string();
    }

    let mut text = "📅 <b>Ближайшие выходные дни:</b>\n\n".to_string();
    for day_off in days_off {
        let reason_text = day_off
            .reason
            .as_deref()
            .map(|r| format!(" - {}", escape_html(r)))
            .unwrap_or_default();
        text.push_str(&format!(
            "❌ <b>{}</b>{}\n",
            format_date(day_off.date),
            reason_text
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use crate::models::BookingStatus;

    fn sample_booking() -> Booking {
        Booking {
            id: 7,
            client_id: 100,
            client_name: "Анна <3".to_string(),
            client_phone: "+7 999 000-00-00".to_string(),
            client_username: Some("ann".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            service_key: "haircut".to_string(),
            service_name: "Мужская стрижка".to_string(),
            service_price: 1500,
            service_duration: 60,
            status: BookingStatus::Active,
            barber_comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn escape_html_replaces_specials() {
        assert_eq!(escape_html("a<b>&c"), "a&lt;b&gt;&amp;c");
        assert_eq!(escape_html("обычный текст"), "обычный текст");
    }

    #[test]
    fn day_off_notice_references_booking() {
        let text = client_day_off_cancellation(&sample_booking());
        assert!(text.contains("<code>7</code>"));
        assert!(text.contains("15.03.2025"));
        assert!(text.contains("10:00"));
        assert!(text.contains("Мужская стрижка"));
    }

    #[test]
    fn user_input_is_escaped_in_notifications() {
        let text = barber_new_booking(&sample_booking());
        assert!(text.contains("Анна &lt;3"));
        assert!(!text.contains("Анна <3"));
    }

    #[test]
    fn empty_admin_lists_have_placeholder() {
        assert!(admin_bookings_list(&[]).contains("Нет активных записей"));
        assert!(admin_days_off_list(&[]).contains("не установлены"));
    }
}
