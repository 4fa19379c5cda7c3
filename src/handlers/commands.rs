use std::error::Error;

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::config::Config;
use crate::database::Database;
use crate::dialogue::{BookingState, Conversation, DialogueStore};
use crate::handlers::{admin, keyboards, texts};
use crate::models::BookingStatus;
use crate::Command;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    config: Config,
    db: Database,
    dialogues: DialogueStore,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cmd {
        Command::Start => handle_start(bot, msg, config).await?,
        Command::Book => handle_book(bot, msg, db, dialogues).await?,
        Command::MyBookings => handle_my_bookings(bot, msg, db).await?,
        Command::Cancel => handle_cancel(bot, msg, dialogues).await?,
        Command::Admin => handle_admin(bot, msg, config).await?,
    }
    Ok(())
}

async fn handle_start(
    bot: Bot,
    msg: Message,
    config: Config,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let first_name = msg
        .from
        .as_ref()
        .map(|user| user.first_name.as_str())
        .unwrap_or("гость");

    bot.send_message(msg.chat.id, texts::welcome(first_name, &config.shop))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Начало диалога записи. Вернувшемуся клиенту предлагаем
/// сохраненный профиль — он перескакивает сразу к выбору даты.
async fn handle_book(
    bot: Bot,
    msg: Message,
    db: Database,
    dialogues: DialogueStore,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    match db.client_by_telegram_id(user.id.0 as i64).await? {
        Some(client) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "<b>У вас уже есть сохраненные данные:</b>\n\n\
                    👤 <b>Имя:</b> {}\n\
                    📞 <b>Телефон:</b> {}\n\n\
                    <b>Использовать эти данные?</b>",
                    texts::escape_html(&client.full_name),
                    texts::escape_html(&client.phone),
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::saved_data_keyboard())
            .await?;

            dialogues
                .set(
                    msg.chat.id,
                    Conversation::Booking(BookingState::ChoosingProfile),
                )
                .await;
        }
        None => {
            bot.send_message(
                msg.chat.id,
                "<b>📝 Шаг 1/5: Как вас зовут?</b>\n\nВведите ваше имя:",
            )
            .parse_mode(ParseMode::Html)
            .await?;

            dialogues
                .set(msg.chat.id, Conversation::Booking(BookingState::AwaitingName))
                .await;
        }
    }

    Ok(())
}

async fn handle_my_bookings(
    bot: Bot,
    msg: Message,
    db: Database,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let bookings = db
        .bookings_for_client(user.id.0 as i64, BookingStatus::Active)
        .await?;

    if bookings.is_empty() {
        bot.send_message(
            msg.chat.id,
            "📅 <b>У вас пока нет активных записей.</b>\n\n\
            Используйте /book чтобы записаться.",
        )
        .parse_mode(ParseMode::Html)
        .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, texts::my_bookings_list(&bookings))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::my_bookings_keyboard(&bookings))
        .await?;

    Ok(())
}

/// Глобальная отмена: снимает любой незавершенный диалог без побочных
/// эффектов. Если диалога не было — так и отвечаем.
async fn handle_cancel(
    bot: Bot,
    msg: Message,
    dialogues: DialogueStore,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match dialogues.clear(msg.chat.id).await {
        Some(_) => {
            bot.send_message(
                msg.chat.id,
                "❌ <b>Процесс записи отменен.</b>\n\nДля новой записи используйте /book",
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Нет активного процесса записи.")
                .await?;
        }
    }

    Ok(())
}

async fn handle_admin(
    bot: Bot,
    msg: Message,
    config: Config,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    match config.authorize_admin(user.id) {
        Ok(_access) => {
            bot.send_message(msg.chat.id, admin::PANEL_TEXT)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::admin_keyboard())
                .await?;
        }
        Err(e) => {
            log::warn!("{e}");
            bot.send_message(msg.chat.id, e.user_message()).await?;
        }
    }

    Ok(())
}
