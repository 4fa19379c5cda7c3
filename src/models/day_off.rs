use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Выходной день барбера. На эту дату нельзя записаться,
/// а существующие активные записи отменяются при его добавлении.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DayOff {
    pub id: i64,
    pub date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
