use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

mod bookings;
mod clients;
mod days_off;

pub use bookings::NewBooking;

#[derive(Clone, Debug)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub async fn init(&self) -> Result<(), sqlx::Error> {
        // Таблица клиентов
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                telegram_id BIGINT PRIMARY KEY,
                username TEXT,
                full_name TEXT NOT NULL,
                phone TEXT NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Таблица записей
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id BIGSERIAL PRIMARY KEY,
                client_id BIGINT NOT NULL,
                client_name TEXT NOT NULL,
                client_phone TEXT NOT NULL,
                client_username TEXT,
                booking_date DATE NOT NULL,
                booking_time TIME NOT NULL,
                service_key TEXT NOT NULL,
                service_name TEXT NOT NULL,
                service_price INTEGER NOT NULL,
                service_duration INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                barber_comment TEXT,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Страховка от гонки двух клиентов за один слот: не более одной
        // активной записи на (дата, время). Повторная проверка в диалоге
        // закрывает обычный случай, индекс закрывает гонку.
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_active_slot
            ON bookings (booking_date, booking_time)
            WHERE status = 'active'
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Таблица выходных дней барбера
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS days_off (
                id BIGSERIAL PRIMARY KEY,
                date DATE NOT NULL UNIQUE,
                reason TEXT,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bookings_client_id ON bookings (client_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bookings_date_status ON bookings (booking_date, status)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use sqlx::PgPool;

    use super::*;
    use crate::error::BotError;
    use crate::models::{BookingStatus, Service};

    async fn prepare(pool: PgPool) -> Database {
        let db = Database { pool };
        db.init().await.unwrap();
        db
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn time(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    fn new_booking(client_id: i64, date: NaiveDate, time: NaiveTime) -> NewBooking<'static> {
        NewBooking {
            client_id,
            client_name: "Анна",
            client_phone: "+7 999 000-00-00",
            client_username: None,
            date,
            time,
            service: Service::find("haircut").unwrap(),
        }
    }

    #[sqlx::test]
    async fn slot_follows_booking_lifecycle(pool: PgPool) {
        let db = prepare(pool).await;
        let (d, t) = (date(16), time(14));

        assert!(!db.is_slot_taken(d, t).await.unwrap());

        let booking = db.create_booking(new_booking(1, d, t)).await.unwrap();
        assert!(db.is_slot_taken(d, t).await.unwrap());

        assert!(db.cancel_booking(booking.id).await.unwrap());
        assert!(!db.is_slot_taken(d, t).await.unwrap());
    }

    #[sqlx::test]
    async fn taken_slot_rejects_second_booking(pool: PgPool) {
        let db = prepare(pool).await;
        let (d, t) = (date(16), time(14));

        let first = db.create_booking(new_booking(1, d, t)).await.unwrap();

        let err = db.create_booking(new_booking(2, d, t)).await.unwrap_err();
        assert!(matches!(err, BotError::SlotTaken { .. }));

        // После отмены слот освобождается
        assert!(db.cancel_booking(first.id).await.unwrap());
        db.create_booking(new_booking(2, d, t)).await.unwrap();
    }

    #[sqlx::test]
    async fn cancel_is_single_shot(pool: PgPool) {
        let db = prepare(pool).await;

        assert!(!db.cancel_booking(9999).await.unwrap());

        let booking = db.create_booking(new_booking(1, date(17), time(10))).await.unwrap();
        assert!(db.cancel_booking(booking.id).await.unwrap());
        assert!(!db.cancel_booking(booking.id).await.unwrap());
    }

    #[sqlx::test]
    async fn block_date_cancels_only_that_date(pool: PgPool) {
        let db = prepare(pool).await;
        let blocked_day = date(20);
        let other_day = date(21);

        db.create_booking(new_booking(1, blocked_day, time(10))).await.unwrap();
        db.create_booking(new_booking(2, blocked_day, time(12))).await.unwrap();
        db.create_booking(new_booking(1, other_day, time(10))).await.unwrap();

        let (day_off, cancelled) = db.block_date(blocked_day, Some("отпуск")).await.unwrap();
        assert_eq!(day_off.reason.as_deref(), Some("отпуск"));
        assert_eq!(cancelled.len(), 2);
        assert!(cancelled.iter().all(|b| b.date == blocked_day));

        assert!(!db.is_slot_taken(blocked_day, time(10)).await.unwrap());
        assert!(db.is_slot_taken(other_day, time(10)).await.unwrap());

        let cancelled_of_first = db
            .bookings_for_client(1, BookingStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled_of_first.len(), 1);

        let err = db.ensure_date_open(blocked_day).await.unwrap_err();
        assert!(matches!(err, BotError::DateBlocked { .. }));

        let err = db.block_date(blocked_day, None).await.unwrap_err();
        assert!(matches!(err, BotError::DuplicateDayOff(_)));
    }

    #[sqlx::test]
    async fn remove_day_off_reports_missing_date(pool: PgPool) {
        let db = prepare(pool).await;
        let d = date(22);

        assert!(!db.remove_day_off(d).await.unwrap());

        db.block_date(d, None).await.unwrap();
        assert!(db.remove_day_off(d).await.unwrap());
        db.ensure_date_open(d).await.unwrap();
    }

    #[sqlx::test]
    async fn upsert_client_updates_contacts(pool: PgPool) {
        let db = prepare(pool).await;

        db.upsert_client(1, None, "Анна", "111").await.unwrap();
        let updated = db
            .upsert_client(1, Some("ann"), "Анна Петровна", "222")
            .await
            .unwrap();

        assert_eq!(updated.full_name, "Анна Петровна");
        assert_eq!(updated.phone, "222");
        assert_eq!(updated.username.as_deref(), Some("ann"));

        let fetched = db.client_by_telegram_id(1).await.unwrap().unwrap();
        assert_eq!(fetched.phone, "222");
    }
}
