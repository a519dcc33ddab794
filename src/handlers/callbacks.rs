use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId};
use std::error::Error;

use crate::bot_state::{BotState, ConversationState};
use crate::models::{PaymentConfig, ZodiacSign};
use crate::handlers::payments::send_premium_invoice;
use crate::handlers::utils::{cancel_keyboard, send_register_hint, show_profile, zodiac_keyboard};

/// Закрытый разбор callback-данных. Строка с кнопки декодируется один раз
/// на границе диспетчера, дальше обработчик матчится исчерпывающе.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    EditName,
    EditZodiac,
    EditBirthDate,
    EditBirthTime,
    BuyPremium,
    Cancel,
    /// Кнопка `zodiac_<code>`; код проверяется по таблице знаков уже в обработчике.
    Zodiac(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "edit_name" => Some(Self::EditName),
            "edit_zodiac" => Some(Self::EditZodiac),
            "edit_birthdate" => Some(Self::EditBirthDate),
            "edit_birthtime" => Some(Self::EditBirthTime),
            "buy_premium" => Some(Self::BuyPremium),
            "cancel" => Some(Self::Cancel),
            _ => data.strip_prefix("zodiac_").map(|code| Self::Zodiac(code.to_string())),
        }
    }
}

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: BotState,
    payment_config: PaymentConfig,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    // Снимаем "часики" с кнопки сразу, независимо от исхода обработки
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        log::error!("Error acknowledging callback query: {}", e);
    }

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    let Some(action) = CallbackAction::parse(data) else {
        log::warn!("Unknown callback data: {}", data);
        return Ok(());
    };

    match action {
        CallbackAction::EditName => {
            start_text_edit(
                &bot,
                &state,
                chat_id,
                message_id,
                ConversationState::EditingName,
                "Пожалуйста, введите Ваше имя:",
            )
            .await;
        }
        CallbackAction::EditBirthDate => {
            start_text_edit(
                &bot,
                &state,
                chat_id,
                message_id,
                ConversationState::EditingBirthDate,
                "Пожалуйста, введите Вашу дату рождения (дд/мм/гггг):",
            )
            .await;
        }
        CallbackAction::EditBirthTime => {
            start_text_edit(
                &bot,
                &state,
                chat_id,
                message_id,
                ConversationState::EditingBirthTime,
                "Пожалуйста, введите Ваше время рождения (чч:мм):",
            )
            .await;
        }
        CallbackAction::EditZodiac => {
            state.set_state(chat_id, ConversationState::EditingZodiac).await;
            let result = bot
                .edit_message_text(chat_id, message_id, "Пожалуйста, выберите Ваш знак зодиака:")
                .reply_markup(zodiac_keyboard())
                .await;
            if let Err(e) = result {
                log::error!("Error editing message for edit_zodiac: {}", e);
            }
            state.set_prompt_message(chat_id, message_id).await;
        }
        CallbackAction::BuyPremium => {
            // Старый неоплаченный счет убираем: живой счет в чате один
            let tracked = state.tracked_messages(chat_id).await;
            if let Some(invoice_message_id) = tracked.invoice_message_id {
                if let Err(e) = bot.delete_message(chat_id, invoice_message_id).await {
                    log::error!("Error deleting stale invoice message: {}", e);
                }
                state.clear_invoice_message(chat_id).await;
            }

            match send_premium_invoice(&bot, chat_id, &payment_config).await {
                Ok(invoice) => state.set_invoice_message(chat_id, invoice.id).await,
                Err(e) => log::error!("Error sending invoice: {}", e),
            }
        }
        CallbackAction::Cancel => {
            state.clear_state(chat_id).await;
            show_profile(&bot, &state, chat_id, false).await?;
        }
        CallbackAction::Zodiac(code) => {
            handle_zodiac_selection(&bot, &state, chat_id, &code).await?;
        }
    }

    Ok(())
}

/// Вход в текстовое редактирование поля: переводим состояние и заменяем
/// карточку профиля подсказкой с одной кнопкой отмены. Подсказка
/// запоминается как текущий prompt.
async fn start_text_edit(
    bot: &Bot,
    state: &BotState,
    chat_id: ChatId,
    message_id: MessageId,
    next_state: ConversationState,
    prompt: &str,
) {
    state.set_state(chat_id, next_state).await;

    let result = bot
        .edit_message_text(chat_id, message_id, prompt)
        .reply_markup(cancel_keyboard())
        .await;
    if let Err(e) = result {
        log::error!("Error editing message for edit prompt: {}", e);
    }

    state.set_prompt_message(chat_id, message_id).await;
}

async fn handle_zodiac_selection(
    bot: &Bot,
    state: &BotState,
    chat_id: ChatId,
    code: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(sign) = ZodiacSign::find_by_code(code) else {
        log::warn!("Unknown zodiac code: {}", code);
        return Ok(());
    };

    let Some(mut user) = state.db.get_user(chat_id).await? else {
        send_register_hint(bot, chat_id).await;
        return Ok(());
    };

    user.zodiac_sign = Some(sign.label.to_string());
    state.db.save_user(&user).await?;

    state.clear_state(chat_id).await;
    show_profile(bot, state, chat_id, false).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixed_tokens() {
        assert_eq!(CallbackAction::parse("edit_name"), Some(CallbackAction::EditName));
        assert_eq!(CallbackAction::parse("edit_zodiac"), Some(CallbackAction::EditZodiac));
        assert_eq!(CallbackAction::parse("edit_birthdate"), Some(CallbackAction::EditBirthDate));
        assert_eq!(CallbackAction::parse("edit_birthtime"), Some(CallbackAction::EditBirthTime));
        assert_eq!(CallbackAction::parse("buy_premium"), Some(CallbackAction::BuyPremium));
        assert_eq!(CallbackAction::parse("cancel"), Some(CallbackAction::Cancel));
    }

    #[test]
    fn parses_zodiac_codes() {
        assert_eq!(
            CallbackAction::parse("zodiac_aries"),
            Some(CallbackAction::Zodiac("aries".to_string()))
        );
        assert_eq!(
            CallbackAction::parse("zodiac_sagittarius"),
            Some(CallbackAction::Zodiac("sagittarius".to_string()))
        );
        // Неизвестный код проверяет уже обработчик, а не разбор
        assert_eq!(
            CallbackAction::parse("zodiac_unknown"),
            Some(CallbackAction::Zodiac("unknown".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_payloads() {
        assert_eq!(CallbackAction::parse(""), None);
        assert_eq!(CallbackAction::parse("edit_email"), None);
        assert_eq!(CallbackAction::parse("zodiacaries"), None);
        assert_eq!(CallbackAction::parse("EDIT_NAME"), None);
    }
}
