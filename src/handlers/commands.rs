use teloxide::prelude::*;
use std::error::Error;

use crate::bot_state::BotState;
use crate::models::UserProfile;
use crate::handlers::utils::{remove_profile_buttons, show_profile};
use crate::Command;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await?,
        Command::Profile => handle_profile(bot, msg, state).await?,
    }
    Ok(())
}

/// Регистрация: профиль создается один раз, повторный /start ничего
/// не перезаписывает.
async fn handle_start(
    bot: Bot,
    msg: Message,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let chat_id = msg.chat.id;

    remove_profile_buttons(&bot, &state, chat_id).await;

    if state.db.get_user(chat_id).await?.is_some() {
        if let Err(e) = bot.send_message(chat_id, "Вы уже зарегистрированы.").await {
            log::error!("Error sending already registered message: {}", e);
        }
        return Ok(());
    }

    let from = msg.from.as_ref();
    let user = UserProfile::new(
        chat_id,
        from.map(|u| u.first_name.clone()).unwrap_or_default(),
        from.and_then(|u| u.last_name.clone()),
        from.and_then(|u| u.username.clone()),
    );
    state.db.save_user(&user).await?;

    if let Err(e) = bot.send_message(chat_id, "Добро пожаловать!").await {
        log::error!("Error sending welcome message: {}", e);
    }

    Ok(())
}

async fn handle_profile(
    bot: Bot,
    msg: Message,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    show_profile(&bot, &state, msg.chat.id, true).await
}
