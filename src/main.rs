use teloxide::{prelude::*, utils::command::BotCommands};
use std::env;

mod bot_state;
mod database;
mod models;
mod handlers;

use crate::bot_state::BotState;
use crate::database::Database;
use crate::models::PaymentConfig;
use crate::handlers::{
    command_handler, message_handler, callback_handler,
    pre_checkout_handler, successful_payment_handler,
};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
enum Command {
    #[command(description = "регистрация в боте")]
    Start,
    #[command(description = "показать профиль")]
    Profile,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Загружаем .env и инициализируем логирование
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Starting profile bot...");

    let database_url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://database.db?mode=rwc".to_string());

    let db = Database::new(&database_url).await?;
    db.init().await?;
    log::info!("Database initialized");

    // Оплата через Telegram Stars: токен провайдера не нужен
    let payment_config = PaymentConfig {
        provider_token: None,
        currency: "XTR".to_string(),
    };

    let state = BotState::new(db);
    let bot = Bot::from_env();

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.successful_payment().is_some())
                .endpoint(successful_payment_handler),
        )
        .branch(Update::filter_pre_checkout_query().endpoint(pre_checkout_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state, payment_config])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
