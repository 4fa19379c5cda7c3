//! Уведомления — строго best-effort: неудача логируется и никогда
//! не влияет на результат операции, после которой она отправляется.

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::config::Config;
use crate::handlers::texts;
use crate::models::Booking;

pub async fn barber_new_booking(bot: &Bot, config: &Config, booking: &Booking) {
    let text = texts::barber_new_booking(booking);
    if let Err(e) = bot
        .send_message(config.barber_chat_id, text)
        .parse_mode(ParseMode::Html)
        .await
    {
        log::error!("failed to notify barber about booking {}: {}", booking.id, e);
    }
}

pub async fn barber_booking_cancelled(bot: &Bot, config: &Config, booking: &Booking) {
    let text = texts::barber_booking_cancelled(booking);
    if let Err(e) = bot
        .send_message(config.barber_chat_id, text)
        .parse_mode(ParseMode::Html)
        .await
    {
        log::error!(
            "failed to notify barber about cancellation of booking {}: {}",
            booking.id,
            e
        );
    }
}

/// Сообщение клиенту об отмене его записи из-за выходного барбера.
pub async fn client_day_off_cancellation(bot: &Bot, booking: &Booking) {
    let text = texts::client_day_off_cancellation(booking);
    if let Err(e) = bot
        .send_message(ChatId(booking.client_id), text)
        .parse_mode(ParseMode::Html)
        .await
    {
        log::error!(
            "failed to notify client {} about cancelled booking {}: {}",
            booking.client_id,
            booking.id,
            e
        );
    }
}
