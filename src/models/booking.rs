use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

/// Статус записи. Хранится в БД как TEXT.
///
/// Допустимые переходы: active -> cancelled, active -> completed.
/// Обратных переходов нет.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(BookingStatus::Active),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// Запись клиента на услугу. Данные клиента и услуги денормализованы,
/// чтобы запись оставалась читаемой даже после изменения профиля.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub client_phone: String,
    pub client_username: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub service_key: String,
    pub service_name: String,
    pub service_price: i32,
    pub service_duration: i32,
    pub status: BookingStatus,
    pub barber_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Booking {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = BookingStatus::from_str(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: format!("unknown booking status: {status}").into(),
        })?;

        Ok(Booking {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            client_name: row.try_get("client_name")?,
            client_phone: row.try_get("client_phone")?,
            client_username: row.try_get("client_username")?,
            date: row.try_get("booking_date")?,
            time: row.try_get("booking_time")?,
            service_key: row.try_get("service_key")?,
            service_name: row.try_get("service_name")?,
            service_price: row.try_get("service_price")?,
            service_duration: row.try_get("service_duration")?,
            status,
            barber_comment: row.try_get("barber_comment")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_roundtrip() {
        for status in [
            BookingStatus::Active,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn status_rejects_unknown() {
        assert_eq!(BookingStatus::from_str("pending"), None);
        assert_eq!(BookingStatus::from_str(""), None);
    }
}
