//! Админка барбера. Каждая операция начинается с `authorize_admin`;
//! дальше работа идет только при полученном `AdminAccess`.

use std::error::Error;

use chrono::{Local, NaiveDate};
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::config::{AdminAccess, Config};
use crate::database::Database;
use crate::dialogue::{Conversation, DialogueStore};
use crate::error::BotError;
use crate::handlers::callbacks::answer_alert;
use crate::handlers::{keyboards, notify, texts};
use crate::models::{format_date, parse_date};

pub const PANEL_TEXT: &str = "👨‍✈️ <b>Панель администратора</b>\n\nВыберите действие:";

pub async fn handle_admin_callback(
    bot: &Bot,
    q: &CallbackQuery,
    config: &Config,
    db: &Database,
    dialogues: &DialogueStore,
    data: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let access = match config.authorize_admin(q.from.id) {
        Ok(access) => access,
        Err(e) => {
            log::warn!("{e}");
            return answer_alert(bot, q, &e.user_message()).await;
        }
    };

    let Some(ref message) = q.message else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    match data {
        "admin_back" => {
            dialogues.clear(chat_id).await;
            bot.edit_message_text(chat_id, message_id, PANEL_TEXT)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::admin_keyboard())
                .await?;
        }

        "admin_add_dayoff" => {
            let today = Local::now().date_naive();
            bot.edit_message_text(chat_id, message_id, "📅 <b>Выберите дату для выходного:</b>")
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::dayoff_pick_keyboard(
                    today,
                    config.dayoff_days_ahead,
                ))
                .await?;
        }

        "admin_remove_dayoff" => {
            let days_off = db.list_days_off(20).await?;
            bot.edit_message_text(
                chat_id,
                message_id,
                "🗑 <b>Выберите выходной день для удаления:</b>",
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::dayoff_remove_keyboard(&days_off))
            .await?;
        }

        "admin_view_dayoffs" => {
            let days_off = db.list_days_off(30).await?;
            bot.edit_message_text(chat_id, message_id, texts::admin_days_off_list(&days_off))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::admin_back_keyboard())
                .await?;
        }

        "admin_view_bookings" => {
            let bookings = db.all_active_bookings().await?;
            bot.edit_message_text(chat_id, message_id, texts::admin_bookings_list(&bookings))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::admin_back_keyboard())
                .await?;
        }

        data if data.starts_with("dayoff_date_") => {
            let Some(date) = parse_date(data.strip_prefix("dayoff_date_").unwrap()) else {
                return Ok(());
            };

            if db.day_off_by_date(date).await?.is_some() {
                let e = BotError::DuplicateDayOff(date);
                return answer_alert(bot, q, &e.user_message()).await;
            }

            dialogues
                .set(chat_id, Conversation::AwaitingDayOffReason { date })
                .await;

            bot.edit_message_text(
                chat_id,
                message_id,
                format!(
                    "📅 <b>Дата:</b> {}\n\n\
                    ✏️ <b>Введите причину выходного (необязательно):</b>\n\n\
                    <i>Или отправьте '-' чтобы пропустить</i>",
                    format_date(date)
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }

        data if data.starts_with("remove_dayoff_") => {
            let Some(date) = parse_date(data.strip_prefix("remove_dayoff_").unwrap()) else {
                return Ok(());
            };

            return remove_day_off(bot, q, db, access, date).await;
        }

        _ => {}
    }

    bot.answer_callback_query(q.id.clone()).await?;
    Ok(())
}

/// Удаление выходного. Ранее отмененные записи не восстанавливаются.
async fn remove_day_off(
    bot: &Bot,
    q: &CallbackQuery,
    db: &Database,
    _access: AdminAccess,
    date: NaiveDate,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(ref message) = q.message else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    if db.remove_day_off(date).await? {
        bot.answer_callback_query(q.id.clone())
            .text(format!("✅ Выходной {} удален", format_date(date)))
            .show_alert(true)
            .await?;

        let days_off = db.list_days_off(20).await?;
        bot.edit_message_text(
            chat_id,
            message_id,
            "🗑 <b>Выберите выходной день для удаления:</b>",
        )
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::dayoff_remove_keyboard(&days_off))
        .await?;
    } else {
        answer_alert(bot, q, "❌ Ошибка удаления").await?;
    }

    Ok(())
}

/// Завершение добавления выходного: блокировка даты с каскадной отменой
/// записей одной транзакцией, затем best-effort уведомления клиентам.
pub async fn process_dayoff_reason(
    bot: &Bot,
    chat_id: ChatId,
    db: &Database,
    _access: AdminAccess,
    date: NaiveDate,
    text: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let reason = match text.trim() {
        "" | "-" => None,
        r => Some(r),
    };

    match db.block_date(date, reason).await {
        Ok((day_off, cancelled)) => {
            for booking in &cancelled {
                notify::client_day_off_cancellation(bot, booking).await;
            }

            let reason_text = day_off
                .reason
                .as_deref()
                .map(|r| format!(" ({})", texts::escape_html(r)))
                .unwrap_or_default();
            let cancelled_text = if cancelled.is_empty() {
                String::new()
            } else {
                format!("\n\n❌ Отменено записей: {}", cancelled.len())
            };

            log::info!(
                "day off {} added, {} bookings cancelled",
                date,
                cancelled.len()
            );

            bot.send_message(
                chat_id,
                format!(
                    "✅ <b>Выходной день добавлен!</b>\n\n\
                    📅 <b>Дата:</b> {}{}{}\n\n\
                    Теперь на эту дату нельзя записаться.",
                    format_date(date),
                    reason_text,
                    cancelled_text
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        Err(e @ BotError::DuplicateDayOff(_)) => {
            bot.send_message(chat_id, e.user_message()).await?;
        }
        Err(e) => return Err(e.into()),
    }

    bot.send_message(chat_id, PANEL_TEXT)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::admin_keyboard())
        .await?;

    Ok(())
}
