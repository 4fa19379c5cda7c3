use chrono::NaiveDate;
use sqlx::error::DatabaseError;

use super::Database;
use crate::error::BotError;
use crate::models::{Booking, DayOff};

impl Database {
    pub async fn day_off_by_date(&self, date: NaiveDate) -> Result<Option<DayOff>, BotError> {
        let day_off = sqlx::query_as::<_, DayOff>("SELECT * FROM days_off WHERE date = $1")
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;

        Ok(day_off)
    }

    /// Проверка даты перед выбором в диалоге записи.
    pub async fn ensure_date_open(&self, date: NaiveDate) -> Result<(), BotError> {
        match self.day_off_by_date(date).await? {
            Some(day_off) => Err(BotError::DateBlocked {
                date,
                reason: day_off.reason,
            }),
            None => Ok(()),
        }
    }

    /// Добавляет выходной и отменяет все активные записи на эту дату
    /// одной транзакцией. Возвращает отмененные записи — уведомление
    /// клиентов остается за вызывающим.
    pub async fn block_date(
        &self,
        date: NaiveDate,
        reason: Option<&str>,
    ) -> Result<(DayOff, Vec<Booking>), BotError> {
        let mut tx = self.pool.begin().await.map_err(BotError::from)?;

        let inserted = sqlx::query_as::<_, DayOff>(
            "INSERT INTO days_off (date, reason) VALUES ($1, $2) RETURNING *",
        )
        .bind(date)
        .bind(reason)
        .fetch_one(&mut *tx)
        .await;

        let day_off = match inserted {
            Ok(day_off) => day_off,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(BotError::DuplicateDayOff(date));
            }
            Err(e) => return Err(e.into()),
        };

        let cancelled = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = 'cancelled'
            WHERE booking_date = $1 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(date)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await.map_err(BotError::from)?;

        Ok((day_off, cancelled))
    }

    /// Удаляет выходной. false, если такого не было. Отмененные ранее
    /// записи не восстанавливаются.
    pub async fn remove_day_off(&self, date: NaiveDate) -> Result<bool, BotError> {
        let result = sqlx::query("DELETE FROM days_off WHERE date = $1")
            .bind(date)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_days_off(&self, limit: i64) -> Result<Vec<DayOff>, BotError> {
        let days_off =
            sqlx::query_as::<_, DayOff>("SELECT * FROM days_off ORDER BY date LIMIT $1")
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;

        Ok(days_off)
    }

    /// Все даты выходных, для фильтрации клавиатуры дат.
    pub async fn blocked_dates(&self) -> Result<Vec<NaiveDate>, BotError> {
        let dates = sqlx::query_scalar::<_, NaiveDate>("SELECT date FROM days_off ORDER BY date")
            .fetch_all(&self.pool)
            .await?;

        Ok(dates)
    }
}
