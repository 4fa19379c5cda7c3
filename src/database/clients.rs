use super::Database;
use crate::error::BotError;
use crate::models::Client;

impl Database {
    /// Создать клиента или обновить его контакты по telegram_id.
    pub async fn upsert_client(
        &self,
        telegram_id: i64,
        username: Option<&str>,
        full_name: &str,
        phone: &str,
    ) -> Result<Client, BotError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (telegram_id, username, full_name, phone)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (telegram_id)
            DO UPDATE SET
                username = EXCLUDED.username,
                full_name = EXCLUDED.full_name,
                phone = EXCLUDED.phone
            RETURNING *
            "#,
        )
        .bind(telegram_id)
        .bind(username)
        .bind(full_name)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn client_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Client>, BotError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE telegram_id = $1")
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }
}
