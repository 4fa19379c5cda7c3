use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Профиль клиента. Создается/обновляется при завершении записи,
/// никогда не удаляется.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}
