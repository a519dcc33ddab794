use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId};
use std::error::Error;

use crate::bot_state::{BotState, ConversationState};
use crate::handlers::utils::{
    cancel_keyboard, is_valid_date, is_valid_time, remove_profile_buttons, send_register_hint,
    show_profile,
};

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    // Распознанные команды перехватывает command_handler; сюда доходят
    // только неизвестные.
    if text.starts_with('/') {
        if let Err(e) = bot.send_message(chat_id, "Неизвестная команда.").await {
            log::error!("Error sending unknown command message: {}", e);
        }
        return Ok(());
    }

    match state.get_state(chat_id).await {
        ConversationState::EditingName => handle_name_input(&bot, &state, &msg, text).await?,
        ConversationState::EditingBirthDate => handle_birth_date_input(&bot, &state, &msg, text).await?,
        ConversationState::EditingBirthTime => handle_birth_time_input(&bot, &state, &msg, text).await?,
        // Знак зодиака выбирается кнопками, свободный текст в этом
        // состоянии равнозначен простою.
        ConversationState::Idle | ConversationState::EditingZodiac => {
            let reply = "Я не понимаю это сообщение. Пожалуйста, используйте команды или кнопки для взаимодействия со мной.";
            if let Err(e) = bot.send_message(chat_id, reply).await {
                log::error!("Error sending default message: {}", e);
            }
            remove_profile_buttons(&bot, &state, chat_id).await;
        }
    }

    Ok(())
}

async fn handle_name_input(
    bot: &Bot,
    state: &BotState,
    msg: &Message,
    text: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let chat_id = msg.chat.id;
    let Some(mut user) = state.db.get_user(chat_id).await? else {
        send_register_hint(bot, chat_id).await;
        return Ok(());
    };

    user.first_name = text.to_string();
    state.db.save_user(&user).await?;

    finish_edit(bot, state, chat_id, msg.id).await
}

async fn handle_birth_date_input(
    bot: &Bot,
    state: &BotState,
    msg: &Message,
    text: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let chat_id = msg.chat.id;
    if !is_valid_date(text) {
        send_retry_prompt(bot, chat_id, "Некорректная дата. Пожалуйста, введите дату в формате дд/мм/гггг:").await;
        return Ok(());
    }

    let Some(mut user) = state.db.get_user(chat_id).await? else {
        send_register_hint(bot, chat_id).await;
        return Ok(());
    };

    user.birth_date = Some(text.to_string());
    state.db.save_user(&user).await?;

    finish_edit(bot, state, chat_id, msg.id).await
}

async fn handle_birth_time_input(
    bot: &Bot,
    state: &BotState,
    msg: &Message,
    text: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let chat_id = msg.chat.id;
    if !is_valid_time(text) {
        send_retry_prompt(bot, chat_id, "Некорректное время. Пожалуйста, введите время в формате чч:мм:").await;
        return Ok(());
    }

    let Some(mut user) = state.db.get_user(chat_id).await? else {
        send_register_hint(bot, chat_id).await;
        return Ok(());
    };

    user.birth_time = Some(text.to_string());
    state.db.save_user(&user).await?;

    finish_edit(bot, state, chat_id, msg.id).await
}

/// Невалидный ввод: новая подсказка с кнопкой отмены, состояние и профиль
/// не меняются.
async fn send_retry_prompt(bot: &Bot, chat_id: ChatId, text: &str) {
    if let Err(e) = bot.send_message(chat_id, text).reply_markup(cancel_keyboard()).await {
        log::error!("Error sending retry prompt: {}", e);
    }
}

/// Общий хвост успешного редактирования: убрать сообщение пользователя из
/// чата, сбросить состояние и обновить карточку профиля на месте.
async fn finish_edit(
    bot: &Bot,
    state: &BotState,
    chat_id: ChatId,
    input_message_id: MessageId,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let Err(e) = bot.delete_message(chat_id, input_message_id).await {
        log::error!("Error deleting user's message: {}", e);
    }

    state.clear_state(chat_id).await;
    show_profile(bot, state, chat_id, false).await
}
