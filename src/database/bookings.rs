use chrono::{NaiveDate, NaiveTime};
use sqlx::error::DatabaseError;

use super::Database;
use crate::error::BotError;
use crate::models::{Booking, BookingStatus, Service};

/// Данные для создания записи. Снимок клиента и услуги
/// денормализуется в строку записи.
pub struct NewBooking<'a> {
    pub client_id: i64,
    pub client_name: &'a str,
    pub client_phone: &'a str,
    pub client_username: Option<&'a str>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub service: &'static Service,
}

impl Database {
    /// Создает активную запись. Доступность слота здесь не перепроверяется —
    /// это обязанность диалога; нарушение частичного уникального индекса
    /// (гонка двух клиентов) превращается в `SlotTaken`.
    pub async fn create_booking(&self, new: NewBooking<'_>) -> Result<Booking, BotError> {
        let result = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings
                (client_id, client_name, client_phone, client_username,
                 booking_date, booking_time,
                 service_key, service_name, service_price, service_duration)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(new.client_id)
        .bind(new.client_name)
        .bind(new.client_phone)
        .bind(new.client_username)
        .bind(new.date)
        .bind(new.time)
        .bind(new.service.key)
        .bind(new.service.name)
        .bind(new.service.price as i32)
        .bind(new.service.duration_min as i32)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(booking) => Ok(booking),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(BotError::SlotTaken {
                date: new.date,
                time: new.time,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Отменяет активную запись. false для неизвестного id
    /// и для уже отмененной/завершенной записи.
    pub async fn cancel_booking(&self, id: i64) -> Result<bool, BotError> {
        let result = sqlx::query("UPDATE bookings SET status = 'cancelled' WHERE id = $1 AND status = 'active'")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn is_slot_taken(&self, date: NaiveDate, time: NaiveTime) -> Result<bool, BotError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE booking_date = $1 AND booking_time = $2 AND status = 'active'
            )
            "#,
        )
        .bind(date)
        .bind(time)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    /// Занятые слоты даты, для отрисовки клавиатуры времени.
    pub async fn booked_times(&self, date: NaiveDate) -> Result<Vec<NaiveTime>, BotError> {
        let times = sqlx::query_scalar::<_, NaiveTime>(
            r#"
            SELECT booking_time FROM bookings
            WHERE booking_date = $1 AND status = 'active'
            ORDER BY booking_time
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(times)
    }

    pub async fn bookings_for_client(
        &self,
        client_id: i64,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, BotError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE client_id = $1 AND status = $2
            ORDER BY booking_date, booking_time
            "#,
        )
        .bind(client_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn all_active_bookings(&self) -> Result<Vec<Booking>, BotError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE status = 'active'
            ORDER BY booking_date, booking_time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn booking_by_id(&self, id: i64) -> Result<Option<Booking>, BotError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    pub async fn require_booking(&self, id: i64) -> Result<Booking, BotError> {
        self.booking_by_id(id)
            .await?
            .ok_or(BotError::BookingNotFound(id))
    }
}
