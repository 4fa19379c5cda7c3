use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::models::{format_date, format_time, Booking, DayOff, SERVICES};

const WEEKDAYS: [&str; 7] = [
    "Понедельник",
    "Вторник",
    "Среда",
    "Четверг",
    "Пятница",
    "Суббота",
    "Воскресенье",
];

fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_monday() as usize]
}

/// Выбор даты записи. Выходные дни не показываются вовсе.
pub fn date_keyboard(today: NaiveDate, days_ahead: u32, blocked: &[NaiveDate]) -> InlineKeyboardMarkup {
    let mut keyboard = Vec::new();

    for i in 0..days_ahead {
        let date = today + Duration::days(i as i64);
        if blocked.contains(&date) {
            continue;
        }

        let label = match i {
            0 => format!("🔥 Сегодня ({})", format_date(date)),
            1 => format!("⚡ Завтра ({})", format_date(date)),
            _ => format!("{} {}", weekday_name(date), format_date(date)),
        };

        keyboard.push(vec![InlineKeyboardButton::callback(
            label,
            format!("date_{}", format_date(date)),
        )]);
    }

    InlineKeyboardMarkup::new(keyboard)
}

/// Выбор времени. Занятые слоты остаются видимыми, но помечены 🔴
/// и ведут на callback `busy_`, который отвечает отказом.
pub fn time_keyboard(slots: &[NaiveTime], taken: &[NaiveTime], per_row: usize) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    let mut row = Vec::new();

    for &time in slots {
        let button = if taken.contains(&time) {
            InlineKeyboardButton::callback(
                format!("🔴 {}", format_time(time)),
                format!("busy_{}", format_time(time)),
            )
        } else {
            InlineKeyboardButton::callback(format_time(time), format!("time_{}", format_time(time)))
        };

        row.push(button);
        if row.len() == per_row {
            keyboard.push(std::mem::take(&mut row));
        }
    }

    if !row.is_empty() {
        keyboard.push(row);
    }

    InlineKeyboardMarkup::new(keyboard)
}

pub fn service_keyboard() -> InlineKeyboardMarkup {
    let keyboard = SERVICES
        .iter()
        .map(|service| {
            vec![InlineKeyboardButton::callback(
                format!(
                    "{} {} — {}₽ | ⏱ {} мин",
                    service.emoji, service.name, service.price, service.duration_min
                ),
                format!("service_{}", service.key),
            )]
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(keyboard)
}

/// Предложение вернувшемуся клиенту использовать сохраненный профиль.
pub fn saved_data_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ Да, использовать",
            "use_saved_data",
        )],
        vec![InlineKeyboardButton::callback(
            "✏️ Ввести новые данные",
            "enter_new_data",
        )],
    ])
}

pub fn my_bookings_keyboard(bookings: &[Booking]) -> InlineKeyboardMarkup {
    let keyboard = bookings
        .iter()
        .map(|booking| {
            vec![InlineKeyboardButton::callback(
                format!("❌ Отменить запись #{}", booking.id),
                format!("cancel_booking_{}", booking.id),
            )]
        })
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(keyboard)
}

pub fn cancel_confirm_keyboard(booking_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ Да, отменить",
            format!("confirm_cancel_{booking_id}"),
        )],
        vec![InlineKeyboardButton::callback(
            "⬅️ Назад",
            "back_to_bookings",
        )],
    ])
}

pub fn admin_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("📅 Добавить выходной", "admin_add_dayoff"),
            InlineKeyboardButton::callback("🗑 Удалить выходной", "admin_remove_dayoff"),
        ],
        vec![
            InlineKeyboardButton::callback("📋 Посмотреть выходные", "admin_view_dayoffs"),
            InlineKeyboardButton::callback("👥 Активные записи", "admin_view_bookings"),
        ],
    ])
}

pub fn admin_back_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "⬅️ Назад",
        "admin_back",
    )]])
}

/// Выбор даты выходного: ближайшие `days_ahead` дней начиная с завтра.
pub fn dayoff_pick_keyboard(today: NaiveDate, days_ahead: u32) -> InlineKeyboardMarkup {
    let mut keyboard = Vec::new();

    for i in 1..=days_ahead {
        let date = today + Duration::days(i as i64);
        keyboard.push(vec![InlineKeyboardButton::callback(
            format!("{} {}", weekday_name(date), format_date(date)),
            format!("dayoff_date_{}", format_date(date)),
        )]);
    }

    keyboard.push(vec![InlineKeyboardButton::callback("⬅️ Назад", "admin_back")]);

    InlineKeyboardMarkup::new(keyboard)
}

pub fn dayoff_remove_keyboard(days_off: &[DayOff]) -> InlineKeyboardMarkup {
    let mut keyboard = Vec::new();

    for day_off in days_off {
        let mut label = format!("❌ {}", format_date(day_off.date));
        if let Some(reason) = &day_off.reason {
            let short: String = reason.chars().take(20).collect();
            label.push_str(&format!(" ({short})"));
        }

        keyboard.push(vec![InlineKeyboardButton::callback(
            label,
            format!("remove_dayoff_{}", format_date(day_off.date)),
        )]);
    }

    keyboard.push(vec![InlineKeyboardButton::callback("⬅️ Назад", "admin_back")]);

    InlineKeyboardMarkup::new(keyboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_data(button: &InlineKeyboardButton) -> &str {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => data,
            other => panic!("unexpected button kind: {other:?}"),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn date_keyboard_excludes_blocked_dates() {
        let today = date(2025, 3, 14);
        let blocked = vec![date(2025, 3, 15)];

        let keyboard = date_keyboard(today, 3, &blocked);

        assert_eq!(keyboard.inline_keyboard.len(), 2);
        let all_data: Vec<&str> = keyboard
            .inline_keyboard
            .iter()
            .map(|row| callback_data(&row[0]))
            .collect();
        assert!(all_data.contains(&"date_14.03.2025"));
        assert!(!all_data.contains(&"date_15.03.2025"));
        assert!(all_data.contains(&"date_16.03.2025"));
    }

    #[test]
    fn date_keyboard_labels_today_and_tomorrow() {
        let keyboard = date_keyboard(date(2025, 3, 14), 3, &[]);

        assert!(keyboard.inline_keyboard[0][0].text.starts_with("🔥 Сегодня"));
        assert!(keyboard.inline_keyboard[1][0].text.starts_with("⚡ Завтра"));
        assert!(keyboard.inline_keyboard[2][0].text.starts_with("Воскресенье"));
    }

    #[test]
    fn time_keyboard_marks_taken_slots_busy() {
        let slots = vec![time(10, 0), time(11, 0)];
        let taken = vec![time(11, 0)];

        let keyboard = time_keyboard(&slots, &taken, 3);
        let row = &keyboard.inline_keyboard[0];

        assert_eq!(callback_data(&row[0]), "time_10:00");
        assert_eq!(callback_data(&row[1]), "busy_11:00");
        assert!(row[1].text.contains("🔴"));
    }

    #[test]
    fn time_keyboard_chunks_rows() {
        let slots: Vec<NaiveTime> = (10..=17).map(|h| time(h, 0)).collect();

        let keyboard = time_keyboard(&slots, &[], 3);

        assert_eq!(keyboard.inline_keyboard.len(), 3);
        assert_eq!(keyboard.inline_keyboard[0].len(), 3);
        assert_eq!(keyboard.inline_keyboard[2].len(), 2);
    }

    #[test]
    fn service_keyboard_covers_catalog() {
        let keyboard = service_keyboard();

        assert_eq!(keyboard.inline_keyboard.len(), SERVICES.len());
        assert_eq!(
            callback_data(&keyboard.inline_keyboard[0][0]),
            "service_haircut"
        );
    }

    #[test]
    fn dayoff_picker_starts_tomorrow() {
        let keyboard = dayoff_pick_keyboard(date(2025, 3, 14), 30);

        // 30 дат + кнопка «Назад»
        assert_eq!(keyboard.inline_keyboard.len(), 31);
        assert_eq!(
            callback_data(&keyboard.inline_keyboard[0][0]),
            "dayoff_date_15.03.2025"
        );
        assert_eq!(
            callback_data(keyboard.inline_keyboard.last().unwrap().first().unwrap()),
            "admin_back"
        );
    }
}
