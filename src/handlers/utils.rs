use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::{ApiError, RequestError};
use chrono::{DateTime, NaiveDate, Utc};

use crate::bot_state::BotState;
use crate::models::{UserProfile, ZODIAC_SIGNS};

/// Клавиатура карточки профиля: три фиксированных ряда.
pub fn profile_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("Изменить имя", "edit_name"),
            InlineKeyboardButton::callback("Изменить знак зодиака", "edit_zodiac"),
        ],
        vec![
            InlineKeyboardButton::callback("Изменить дату рождения", "edit_birthdate"),
            InlineKeyboardButton::callback("Изменить время рождения", "edit_birthtime"),
        ],
        vec![InlineKeyboardButton::callback("Купить премиум", "buy_premium")],
    ])
}

pub fn cancel_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback("Отменить", "cancel")]])
}

/// Выбор знака зодиака: по два знака в ряду плюс ряд отмены.
pub fn zodiac_keyboard() -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for pair in ZODIAC_SIGNS.chunks(2) {
        keyboard.push(
            pair.iter()
                .map(|sign| InlineKeyboardButton::callback(sign.label, format!("zodiac_{}", sign.code)))
                .collect(),
        );
    }
    keyboard.push(vec![InlineKeyboardButton::callback("Отменить", "cancel")]);

    InlineKeyboardMarkup::new(keyboard)
}

/// Текст карточки профиля. Пустые поля показываются как "неизвестно".
/// Для премиума печатается остаток в целых днях; просроченный премиум
/// дает отрицательное число — выводим как есть.
pub fn render_profile(user: &UserProfile, now: DateTime<Utc>) -> String {
    const UNKNOWN: &str = "неизвестно";

    let premium_status = match (user.is_premium, user.premium_expiry) {
        (true, Some(expiry)) => {
            let days_left = (expiry - now).num_days();
            format!("Истекает через {} дней", days_left)
        }
        _ => "Нет".to_string(),
    };

    let first_name = if user.first_name.is_empty() { UNKNOWN } else { &user.first_name };

    format!(
        "Имя: {}\nЗнак зодиака: {}\nДата рождения: {}\nВремя рождения: {}\nПремиум: {}",
        first_name,
        user.zodiac_sign.as_deref().unwrap_or(UNKNOWN),
        user.birth_date.as_deref().unwrap_or(UNKNOWN),
        user.birth_time.as_deref().unwrap_or(UNKNOWN),
        premium_status,
    )
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Дата рождения в формате дд/мм/гггг: ровно две цифры дня и месяца,
/// четыре — года, и дата должна существовать в календаре.
pub fn is_valid_date(text: &str) -> bool {
    let mut parts = text.split('/');
    let (Some(day), Some(month), Some(year)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if parts.next().is_some() {
        return false;
    }
    if day.len() != 2 || month.len() != 2 || year.len() != 4 {
        return false;
    }
    if !(all_digits(day) && all_digits(month) && all_digits(year)) {
        return false;
    }

    let (Ok(day), Ok(month), Ok(year)) = (day.parse::<u32>(), month.parse::<u32>(), year.parse::<i32>()) else {
        return false;
    };
    NaiveDate::from_ymd_opt(year, month, day).is_some()
}

/// Время рождения в 24-часовом формате чч:мм; минуты — ровно две цифры.
pub fn is_valid_time(text: &str) -> bool {
    let Some((hour, minute)) = text.split_once(':') else {
        return false;
    };
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return false;
    }
    if !(all_digits(hour) && all_digits(minute)) {
        return false;
    }

    let (Ok(hour), Ok(minute)) = (hour.parse::<u32>(), minute.parse::<u32>()) else {
        return false;
    };
    hour < 24 && minute < 60
}

/// Телеграм отвечает "message is not modified", когда текст и клавиатура
/// не изменились. Для нас это успех, а не ошибка.
pub fn is_message_not_modified(err: &RequestError) -> bool {
    matches!(err, RequestError::Api(ApiError::MessageNotModified))
}

/// Снять кнопки со старой карточки профиля, чтобы в чате не оставалось
/// двух живых клавиатур. Ошибки транспорта только логируем.
pub async fn remove_profile_buttons(bot: &Bot, state: &BotState, chat_id: ChatId) {
    let tracked = state.tracked_messages(chat_id).await;
    let Some(profile_message_id) = tracked.profile_message_id else {
        return;
    };

    if let Err(e) = bot
        .edit_message_reply_markup(chat_id, profile_message_id)
        .reply_markup(InlineKeyboardMarkup::default())
        .await
    {
        if !is_message_not_modified(&e) {
            log::error!("Error removing buttons from profile message: {}", e);
        }
    }
}

pub async fn send_register_hint(bot: &Bot, chat_id: ChatId) {
    if let Err(e) = bot
        .send_message(chat_id, "Профиль не найден. Пожалуйста, используйте /start для регистрации.")
        .await
    {
        log::error!("Error sending register hint: {}", e);
    }
}

/// Показать карточку профиля: новое сообщение при force_new или если
/// живой карточки еще нет, иначе правка существующей на месте.
/// Ошибки базы прерывают обработчик, ошибки транспорта — только в лог.
pub async fn show_profile(
    bot: &Bot,
    state: &BotState,
    chat_id: ChatId,
    force_new: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Some(user) = state.db.get_user(chat_id).await? else {
        send_register_hint(bot, chat_id).await;
        return Ok(());
    };

    remove_profile_buttons(bot, state, chat_id).await;

    let text = render_profile(&user, Utc::now());
    let tracked = state.tracked_messages(chat_id).await;

    match tracked.profile_message_id {
        Some(profile_message_id) if !force_new => {
            let result = bot
                .edit_message_text(chat_id, profile_message_id, text)
                .reply_markup(profile_keyboard())
                .await;
            if let Err(e) = result {
                if !is_message_not_modified(&e) {
                    log::error!("Error editing profile message: {}", e);
                }
            }
        }
        _ => {
            match bot.send_message(chat_id, text).reply_markup(profile_keyboard()).await {
                Ok(sent) => state.set_profile_message(chat_id, sent.id).await,
                Err(e) => log::error!("Error sending profile message: {}", e),
            }
        }
    }

    Ok(())
}
