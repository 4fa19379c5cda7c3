use std::error::Error;

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::config::{working_hours, Config};
use crate::database::{Database, NewBooking};
use crate::dialogue::{BookingState, Conversation, DialogueStore};
use crate::error::BotError;
use crate::handlers::{admin, keyboards, notify, texts};
use crate::models::{format_date, format_time, parse_date, parse_time, Service};

const STALE_DIALOGUE: &str = "Сессия записи не активна. Используйте /book";

/// Кнопки сохраненного профиля действительны только пока /book
/// ждет этот выбор; нажатие по старой клавиатуре отклоняется.
fn profile_choice_active(conversation: Option<&Conversation>) -> bool {
    matches!(
        conversation,
        Some(Conversation::Booking(BookingState::ChoosingProfile))
    )
}

pub(crate) async fn answer_alert(
    bot: &Bot,
    q: &CallbackQuery,
    text: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    bot.answer_callback_query(q.id.clone())
        .text(text)
        .show_alert(true)
        .await?;
    Ok(())
}

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    config: Config,
    db: Database,
    dialogues: DialogueStore,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(data) = q.data.clone() else {
        return Ok(());
    };
    let data = data.as_str();

    if let Some(ref message) = q.message {
        let chat_id = message.chat().id;
        let message_id = message.id();

        match data {
            "use_saved_data" => {
                if !profile_choice_active(dialogues.get(chat_id).await.as_ref()) {
                    return answer_alert(&bot, &q, STALE_DIALOGUE).await;
                }

                match db.client_by_telegram_id(q.from.id.0 as i64).await? {
                    Some(client) => {
                        dialogues
                            .set(
                                chat_id,
                                Conversation::Booking(BookingState::SelectingDate {
                                    name: client.full_name,
                                    phone: client.phone,
                                }),
                            )
                            .await;

                        let blocked = db.blocked_dates().await?;
                        let today = chrono::Local::now().date_naive();

                        bot.edit_message_text(
                            chat_id,
                            message_id,
                            "Отлично! 👍\n\n<b>📅 Шаг 3/5: Выберите дату</b>",
                        )
                        .parse_mode(ParseMode::Html)
                        .reply_markup(keyboards::date_keyboard(
                            today,
                            config.booking_days_ahead,
                            &blocked,
                        ))
                        .await?;
                    }
                    None => {
                        // Профиль успели удалить из БД: начинаем с имени
                        dialogues
                            .set(chat_id, Conversation::Booking(BookingState::AwaitingName))
                            .await;

                        bot.edit_message_text(
                            chat_id,
                            message_id,
                            "<b>📝 Шаг 1/5: Как вас зовут?</b>\n\nВведите ваше имя:",
                        )
                        .parse_mode(ParseMode::Html)
                        .await?;
                    }
                }
            }

            "enter_new_data" => {
                if !profile_choice_active(dialogues.get(chat_id).await.as_ref()) {
                    return answer_alert(&bot, &q, STALE_DIALOGUE).await;
                }

                dialogues
                    .set(chat_id, Conversation::Booking(BookingState::AwaitingName))
                    .await;

                bot.edit_message_text(
                    chat_id,
                    message_id,
                    "<b>📝 Шаг 1/5: Как вас зовут?</b>\n\nВведите ваше имя:",
                )
                .parse_mode(ParseMode::Html)
                .await?;
            }

            data if data.starts_with("date_") => {
                let Some(Conversation::Booking(BookingState::SelectingDate { name, phone })) =
                    dialogues.get(chat_id).await
                else {
                    return answer_alert(&bot, &q, STALE_DIALOGUE).await;
                };
                let Some(date) = parse_date(data.strip_prefix("date_").unwrap()) else {
                    return Ok(());
                };

                match db.ensure_date_open(date).await {
                    Ok(()) => {}
                    Err(e @ BotError::DateBlocked { .. }) => {
                        // Остаемся в выборе даты
                        return answer_alert(&bot, &q, &e.user_message()).await;
                    }
                    Err(e) => return Err(e.into()),
                }

                dialogues
                    .set(
                        chat_id,
                        Conversation::Booking(BookingState::SelectingTime { name, phone, date }),
                    )
                    .await;

                let taken = db.booked_times(date).await?;

                bot.edit_message_text(
                    chat_id,
                    message_id,
                    format!(
                        "📅 <b>Дата:</b> {}\n\n\
                        <b>🕐 Шаг 4/5: Выберите время</b>\n\n\
                        <i>🔴 - Время занято</i>",
                        format_date(date)
                    ),
                )
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::time_keyboard(
                    &working_hours(),
                    &taken,
                    config.time_buttons_per_row,
                ))
                .await?;
            }

            data if data.starts_with("busy_") => {
                return answer_alert(&bot, &q, "❌ Это время уже занято! Выберите другое.").await;
            }

            data if data.starts_with("time_") => {
                let Some(Conversation::Booking(BookingState::SelectingTime {
                    name,
                    phone,
                    date,
                })) = dialogues.get(chat_id).await
                else {
                    return answer_alert(&bot, &q, STALE_DIALOGUE).await;
                };
                let Some(time) = parse_time(data.strip_prefix("time_").unwrap()) else {
                    return Ok(());
                };

                // Слот могли занять после отрисовки клавиатуры
                if db.is_slot_taken(date, time).await? {
                    return answer_alert(&bot, &q, "❌ Это время уже занято! Выберите другое.")
                        .await;
                }

                dialogues
                    .set(
                        chat_id,
                        Conversation::Booking(BookingState::SelectingService {
                            name,
                            phone,
                            date,
                            time,
                        }),
                    )
                    .await;

                bot.edit_message_text(
                    chat_id,
                    message_id,
                    format!(
                        "📅 <b>Дата:</b> {}\n\
                        🕐 <b>Время:</b> {}\n\n\
                        <b>💈 Шаг 5/5: Выберите услугу</b>",
                        format_date(date),
                        format_time(time)
                    ),
                )
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::service_keyboard())
                .await?;
            }

            data if data.starts_with("service_") => {
                return confirm_booking(&bot, &q, &config, &db, &dialogues, data).await;
            }

            data if data.starts_with("cancel_booking_") => {
                let Ok(booking_id) = data.strip_prefix("cancel_booking_").unwrap().parse::<i64>()
                else {
                    return Ok(());
                };

                let booking = match db.require_booking(booking_id).await {
                    Ok(booking) => booking,
                    Err(e @ BotError::BookingNotFound(_)) => {
                        return answer_alert(&bot, &q, &e.user_message()).await;
                    }
                    Err(e) => return Err(e.into()),
                };

                if booking.client_id != q.from.id.0 as i64 {
                    return answer_alert(&bot, &q, "❌ Это не ваша запись").await;
                }

                bot.edit_message_text(
                    chat_id,
                    message_id,
                    format!(
                        "⚠️ <b>Вы уверены, что хотите отменить запись?</b>\n\n\
                        🆔 <b>Номер:</b> <code>{}</code>\n\
                        📅 <b>Дата:</b> {}\n\
                        🕐 <b>Время:</b> {}\n\
                        💈 <b>Услуга:</b> {}",
                        booking.id,
                        format_date(booking.date),
                        format_time(booking.time),
                        texts::escape_html(&booking.service_name)
                    ),
                )
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::cancel_confirm_keyboard(booking_id))
                .await?;
            }

            data if data.starts_with("confirm_cancel_") => {
                let Ok(booking_id) = data.strip_prefix("confirm_cancel_").unwrap().parse::<i64>()
                else {
                    return Ok(());
                };

                let booking = match db.require_booking(booking_id).await {
                    Ok(booking) => booking,
                    Err(e @ BotError::BookingNotFound(_)) => {
                        return answer_alert(&bot, &q, &e.user_message()).await;
                    }
                    Err(e) => return Err(e.into()),
                };

                if booking.client_id != q.from.id.0 as i64 {
                    return answer_alert(&bot, &q, "❌ Это не ваша запись").await;
                }

                if db.cancel_booking(booking_id).await? {
                    bot.edit_message_text(
                        chat_id,
                        message_id,
                        format!(
                            "✅ <b>Запись #{booking_id} успешно отменена.</b>\n\n\
                            Для новой записи используйте /book"
                        ),
                    )
                    .parse_mode(ParseMode::Html)
                    .await?;

                    notify::barber_booking_cancelled(&bot, &config, &booking).await;

                    bot.answer_callback_query(q.id.clone())
                        .text("✅ Запись отменена")
                        .await?;
                    return Ok(());
                } else {
                    return answer_alert(&bot, &q, "❌ Ошибка отмены записи").await;
                }
            }

            "back_to_bookings" => {
                let bookings = db
                    .bookings_for_client(q.from.id.0 as i64, crate::models::BookingStatus::Active)
                    .await?;

                if bookings.is_empty() {
                    bot.edit_message_text(
                        chat_id,
                        message_id,
                        "📅 <b>У вас пока нет активных записей.</b>\n\n\
                        Используйте /book чтобы записаться.",
                    )
                    .parse_mode(ParseMode::Html)
                    .await?;
                } else {
                    bot.edit_message_text(chat_id, message_id, texts::my_bookings_list(&bookings))
                        .parse_mode(ParseMode::Html)
                        .reply_markup(keyboards::my_bookings_keyboard(&bookings))
                        .await?;
                }
            }

            data if data.starts_with("admin_")
                || data.starts_with("dayoff_date_")
                || data.starts_with("remove_dayoff_") =>
            {
                return admin::handle_admin_callback(&bot, &q, &config, &db, &dialogues, data)
                    .await;
            }

            _ => {}
        }
    }

    bot.answer_callback_query(q.id.clone()).await?;
    Ok(())
}

/// Финальный шаг: последняя перепроверка слота, upsert клиента,
/// создание записи, подтверждение и уведомление барбера.
async fn confirm_booking(
    bot: &Bot,
    q: &CallbackQuery,
    config: &Config,
    db: &Database,
    dialogues: &DialogueStore,
    data: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(ref message) = q.message else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    let Some(Conversation::Booking(BookingState::SelectingService {
        name,
        phone,
        date,
        time,
    })) = dialogues.get(chat_id).await
    else {
        return answer_alert(bot, q, STALE_DIALOGUE).await;
    };

    let service_key = data.strip_prefix("service_").unwrap();
    let Some(service) = Service::find(service_key) else {
        return answer_alert(bot, q, "❌ Неизвестная услуга").await;
    };

    // Между выбором времени и услуги слот мог занять другой клиент
    if db.is_slot_taken(date, time).await? {
        dialogues.clear(chat_id).await;
        return answer_alert(bot, q, "❌ Это время уже занято! Начните запись заново /book").await;
    }

    let username = q.from.username.as_deref();
    db.upsert_client(q.from.id.0 as i64, username, &name, &phone)
        .await?;

    let booking = match db
        .create_booking(NewBooking {
            client_id: q.from.id.0 as i64,
            client_name: &name,
            client_phone: &phone,
            client_username: username,
            date,
            time,
            service,
        })
        .await
    {
        Ok(booking) => booking,
        Err(BotError::SlotTaken { .. }) => {
            // Гонка на вставке: уникальный индекс по активным слотам
            dialogues.clear(chat_id).await;
            return answer_alert(bot, q, "❌ Это время уже занято! Начните запись заново /book")
                .await;
        }
        Err(e) => return Err(e.into()),
    };

    dialogues.clear(chat_id).await;

    bot.edit_message_text(
        chat_id,
        message_id,
        texts::booking_confirmed(&booking, service, &config.shop),
    )
    .parse_mode(ParseMode::Html)
    .await?;

    notify::barber_new_booking(bot, config, &booking).await;

    bot.answer_callback_query(q.id.clone())
        .text("✅ Запись создана!")
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_profile_keyboard_is_rejected() {
        assert!(profile_choice_active(Some(&Conversation::Booking(
            BookingState::ChoosingProfile
        ))));

        assert!(!profile_choice_active(None));
        assert!(!profile_choice_active(Some(&Conversation::Booking(
            BookingState::AwaitingName
        ))));
        assert!(!profile_choice_active(Some(&Conversation::Booking(
            BookingState::SelectingDate {
                name: "Анна".to_string(),
                phone: "+7 999 000-00-00".to_string(),
            }
        ))));
    }
}
