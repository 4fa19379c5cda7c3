use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use teloxide::types::ChatId;
use tokio::sync::RwLock;

/// Шаги диалога записи. Каждый шаг несет уже собранные данные,
/// поэтому незавершенный диалог не оставляет следов нигде, кроме стора.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingState {
    /// Вернувшемуся клиенту предложен сохраненный профиль.
    ChoosingProfile,
    AwaitingName,
    AwaitingPhone {
        name: String,
    },
    SelectingDate {
        name: String,
        phone: String,
    },
    SelectingTime {
        name: String,
        phone: String,
        date: NaiveDate,
    },
    SelectingService {
        name: String,
        phone: String,
        date: NaiveDate,
        time: NaiveTime,
    },
}

/// Активный диалог чата: клиентская запись либо админский ввод
/// причины выходного.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversation {
    Booking(BookingState),
    AwaitingDayOffReason { date: NaiveDate },
}

/// Стор состояний диалогов, по одному на чат. Живет в памяти процесса:
/// после рестарта клиенты просто начинают запись заново через /book.
#[derive(Clone, Default)]
pub struct DialogueStore {
    inner: Arc<RwLock<HashMap<ChatId, Conversation>>>,
}

impl DialogueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, chat_id: ChatId) -> Option<Conversation> {
        self.inner.read().await.get(&chat_id).cloned()
    }

    pub async fn set(&self, chat_id: ChatId, conversation: Conversation) {
        log::debug!("dialogue {:?} -> {:?}", chat_id, conversation);
        self.inner.write().await.insert(chat_id, conversation);
    }

    /// Снимает диалог. Возвращает то, что было активно,
    /// чтобы /cancel мог отличить «отменено» от «нечего отменять».
    pub async fn clear(&self, chat_id: ChatId) -> Option<Conversation> {
        self.inner.write().await.remove(&chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_and_get() {
        let store = DialogueStore::new();
        let chat = ChatId(1);

        assert_eq!(store.get(chat).await, None);

        store
            .set(chat, Conversation::Booking(BookingState::AwaitingName))
            .await;
        assert_eq!(
            store.get(chat).await,
            Some(Conversation::Booking(BookingState::AwaitingName))
        );
    }

    #[tokio::test]
    async fn set_overwrites_previous_state() {
        let store = DialogueStore::new();
        let chat = ChatId(1);

        store
            .set(chat, Conversation::Booking(BookingState::AwaitingName))
            .await;
        store
            .set(
                chat,
                Conversation::Booking(BookingState::AwaitingPhone {
                    name: "Анна".to_string(),
                }),
            )
            .await;

        assert_eq!(
            store.get(chat).await,
            Some(Conversation::Booking(BookingState::AwaitingPhone {
                name: "Анна".to_string()
            }))
        );
    }

    #[tokio::test]
    async fn clear_reports_whether_dialogue_was_active() {
        let store = DialogueStore::new();
        let chat = ChatId(1);

        assert_eq!(store.clear(chat).await, None);

        store
            .set(chat, Conversation::Booking(BookingState::AwaitingName))
            .await;
        assert!(store.clear(chat).await.is_some());
        assert_eq!(store.get(chat).await, None);
    }

    #[tokio::test]
    async fn chats_are_isolated() {
        let store = DialogueStore::new();

        store
            .set(ChatId(1), Conversation::Booking(BookingState::AwaitingName))
            .await;

        assert_eq!(store.get(ChatId(2)).await, None);
        store.clear(ChatId(2)).await;
        assert!(store.get(ChatId(1)).await.is_some());
    }
}
