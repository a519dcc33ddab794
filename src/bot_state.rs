use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::{ChatId, MessageId};
use tokio::sync::RwLock;

use crate::database::Database;

/// Этап диалога: какое поле профиля пользователь сейчас вводит.
/// Отсутствие записи в карте равнозначно Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    EditingName,
    EditingZodiac,
    EditingBirthDate,
    EditingBirthTime,
}

/// Сообщения бота, которые сейчас живут в чате пользователя:
/// подсказка редактирования, карточка профиля и счет на оплату.
/// Здесь только учет идентификаторов — сами отправки делают обработчики.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackedMessages {
    pub prompt_message_id: Option<MessageId>,
    pub profile_message_id: Option<MessageId>,
    pub invoice_message_id: Option<MessageId>,
}

/// Общий контекст бота: база профилей плюс два процессных словаря
/// (состояние диалога и учет сообщений). Передается во все обработчики
/// через dptree. Словари намеренно не переживают рестарт —
/// профиль при этом не теряется.
#[derive(Clone)]
pub struct BotState {
    pub db: Database,
    states: Arc<RwLock<HashMap<ChatId, ConversationState>>>,
    messages: Arc<RwLock<HashMap<ChatId, TrackedMessages>>>,
}

impl BotState {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            states: Arc::new(RwLock::new(HashMap::new())),
            messages: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn set_state(&self, chat_id: ChatId, state: ConversationState) {
        let mut states = self.states.write().await;
        states.insert(chat_id, state);
    }

    pub async fn get_state(&self, chat_id: ChatId) -> ConversationState {
        let states = self.states.read().await;
        states.get(&chat_id).copied().unwrap_or_default()
    }

    pub async fn clear_state(&self, chat_id: ChatId) {
        let mut states = self.states.write().await;
        states.remove(&chat_id);
    }

    /// Снимок учтенных сообщений пользователя (копия, без блокировки наружу).
    pub async fn tracked_messages(&self, chat_id: ChatId) -> TrackedMessages {
        let messages = self.messages.read().await;
        messages.get(&chat_id).copied().unwrap_or_default()
    }

    pub async fn set_prompt_message(&self, chat_id: ChatId, message_id: MessageId) {
        let mut messages = self.messages.write().await;
        messages.entry(chat_id).or_default().prompt_message_id = Some(message_id);
    }

    pub async fn set_profile_message(&self, chat_id: ChatId, message_id: MessageId) {
        let mut messages = self.messages.write().await;
        messages.entry(chat_id).or_default().profile_message_id = Some(message_id);
    }

    pub async fn set_invoice_message(&self, chat_id: ChatId, message_id: MessageId) {
        let mut messages = self.messages.write().await;
        messages.entry(chat_id).or_default().invoice_message_id = Some(message_id);
    }

    pub async fn clear_invoice_message(&self, chat_id: ChatId) {
        let mut messages = self.messages.write().await;
        messages.entry(chat_id).or_default().invoice_message_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_state() -> (BotState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let db = Database::new(&url).await.expect("database");
        (BotState::new(db), dir)
    }

    #[tokio::test]
    async fn state_defaults_to_idle() {
        let (state, _dir) = test_state().await;
        assert_eq!(state.get_state(ChatId(1)).await, ConversationState::Idle);
    }

    #[tokio::test]
    async fn set_get_clear_state() {
        let (state, _dir) = test_state().await;
        let chat = ChatId(1);

        state.set_state(chat, ConversationState::EditingName).await;
        assert_eq!(state.get_state(chat).await, ConversationState::EditingName);

        state.set_state(chat, ConversationState::EditingBirthDate).await;
        assert_eq!(state.get_state(chat).await, ConversationState::EditingBirthDate);

        state.clear_state(chat).await;
        assert_eq!(state.get_state(chat).await, ConversationState::Idle);
    }

    #[tokio::test]
    async fn states_are_independent_per_user() {
        let (state, _dir) = test_state().await;

        state.set_state(ChatId(1), ConversationState::EditingZodiac).await;
        state.set_state(ChatId(2), ConversationState::EditingBirthTime).await;

        assert_eq!(state.get_state(ChatId(1)).await, ConversationState::EditingZodiac);
        assert_eq!(state.get_state(ChatId(2)).await, ConversationState::EditingBirthTime);

        state.clear_state(ChatId(1)).await;
        assert_eq!(state.get_state(ChatId(1)).await, ConversationState::Idle);
        assert_eq!(state.get_state(ChatId(2)).await, ConversationState::EditingBirthTime);
    }

    #[tokio::test]
    async fn tracked_messages_start_empty() {
        let (state, _dir) = test_state().await;
        let tracked = state.tracked_messages(ChatId(1)).await;
        assert!(tracked.prompt_message_id.is_none());
        assert!(tracked.profile_message_id.is_none());
        assert!(tracked.invoice_message_id.is_none());
    }

    #[tokio::test]
    async fn tracks_and_clears_message_ids() {
        let (state, _dir) = test_state().await;
        let chat = ChatId(1);

        state.set_prompt_message(chat, MessageId(10)).await;
        state.set_profile_message(chat, MessageId(20)).await;
        state.set_invoice_message(chat, MessageId(30)).await;

        let tracked = state.tracked_messages(chat).await;
        assert_eq!(tracked.prompt_message_id, Some(MessageId(10)));
        assert_eq!(tracked.profile_message_id, Some(MessageId(20)));
        assert_eq!(tracked.invoice_message_id, Some(MessageId(30)));

        state.clear_invoice_message(chat).await;
        let tracked = state.tracked_messages(chat).await;
        assert_eq!(tracked.invoice_message_id, None);
        // Остальные поля не трогаем
        assert_eq!(tracked.profile_message_id, Some(MessageId(20)));

        // Чужой чат не затронут
        assert!(state.tracked_messages(ChatId(2)).await.profile_message_id.is_none());
    }
}
