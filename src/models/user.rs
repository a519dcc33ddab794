use chrono::{DateTime, Utc};
use teloxide::types::ChatId;

/// Профиль пользователя. Долговременная запись в таблице `users`,
/// создается при /start и дальше правится по одному полю.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: ChatId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub zodiac_sign: Option<String>,
    pub birth_date: Option<String>,
    pub birth_time: Option<String>,
    pub is_premium: bool,
    pub premium_expiry: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Пустой профиль нового пользователя.
    pub fn new(id: ChatId, first_name: String, last_name: Option<String>, username: Option<String>) -> Self {
        Self {
            id,
            first_name,
            last_name,
            username,
            zodiac_sign: None,
            birth_date: None,
            birth_time: None,
            is_premium: false,
            premium_expiry: None,
        }
    }
}
