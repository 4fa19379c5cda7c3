use std::error::Error;

use chrono::Local;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::config::Config;
use crate::database::Database;
use crate::dialogue::{BookingState, Conversation, DialogueStore};
use crate::handlers::{admin, keyboards, texts};

/// Текстовые сообщения: шаги диалога, которые собирают свободный ввод.
/// Команды сюда не попадают — их снимает ветка command_handler.
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    config: Config,
    db: Database,
    dialogues: DialogueStore,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if text.starts_with('/') {
        return Ok(());
    }

    let chat_id = msg.chat.id;

    match dialogues.get(chat_id).await {
        Some(Conversation::Booking(BookingState::AwaitingName)) => {
            process_name(&bot, chat_id, &dialogues, text).await?;
        }
        Some(Conversation::Booking(BookingState::AwaitingPhone { name })) => {
            process_phone(&bot, chat_id, &config, &db, &dialogues, name, text).await?;
        }
        Some(Conversation::AwaitingDayOffReason { date }) => {
            let Some(user) = msg.from.as_ref() else {
                return Ok(());
            };
            match config.authorize_admin(user.id) {
                Ok(access) => {
                    dialogues.clear(chat_id).await;
                    admin::process_dayoff_reason(&bot, chat_id, &db, access, date, text).await?;
                }
                Err(e) => {
                    log::warn!("{e}");
                    dialogues.clear(chat_id).await;
                    bot.send_message(chat_id, e.user_message()).await?;
                }
            }
        }
        other => {
            bot.send_message(chat_id, fallback_hint(other.as_ref()))
                .await?;
        }
    }

    Ok(())
}

/// Подсказка на свободный текст вне шагов с текстовым вводом:
/// на шагах с клавиатурой отвечаем про кнопки, без диалога — про /book.
fn fallback_hint(conversation: Option<&Conversation>) -> &'static str {
    match conversation {
        Some(Conversation::Booking(_)) => {
            "Пожалуйста, продолжите выбор кнопками выше. Отменить запись: /cancel"
        }
        _ => "Чтобы записаться на стрижку, используйте /book",
    }
}

async fn process_name(
    bot: &Bot,
    chat_id: ChatId,
    dialogues: &DialogueStore,
    text: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let name = text.trim();
    if name.is_empty() {
        bot.send_message(chat_id, "Пожалуйста, введите ваше имя:")
            .await?;
        return Ok(());
    }

    dialogues
        .set(
            chat_id,
            Conversation::Booking(BookingState::AwaitingPhone {
                name: name.to_string(),
            }),
        )
        .await;

    bot.send_message(
        chat_id,
        format!(
            "Отлично, {}! 👍\n\n\
            <b>📞 Шаг 2/5: Введите номер телефона</b>\n\n\
            <i>Формат: +7 (999) 123-45-67 или 89991234567</i>",
            texts::escape_html(name)
        ),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    Ok(())
}

async fn process_phone(
    bot: &Bot,
    chat_id: ChatId,
    config: &Config,
    db: &Database,
    dialogues: &DialogueStore,
    name: String,
    text: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let phone = text.trim().to_string();

    dialogues
        .set(
            chat_id,
            Conversation::Booking(BookingState::SelectingDate { name, phone }),
        )
        .await;

    let blocked = db.blocked_dates().await?;
    let today = Local::now().date_naive();

    bot.send_message(chat_id, "<b>📅 Шаг 3/5: Выберите дату</b>")
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::date_keyboard(
            today,
            config.booking_days_ahead,
            &blocked,
        ))
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_steps_hint_at_buttons() {
        let state = Conversation::Booking(BookingState::SelectingDate {
            name: "Анна".to_string(),
            phone: "+7 999 000-00-00".to_string(),
        });
        assert!(fallback_hint(Some(&state)).contains("кнопками"));
    }

    #[test]
    fn idle_chat_is_pointed_to_book() {
        assert!(fallback_hint(None).contains("/book"));
    }
}
