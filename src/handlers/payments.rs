use teloxide::prelude::*;
use teloxide::types::{ChatId, LabeledPrice, Message};
use std::error::Error;
use chrono::{Months, Utc};

use crate::bot_state::BotState;
use crate::models::PaymentConfig;
use crate::handlers::utils::{send_register_hint, show_profile};

const PREMIUM_INVOICE_PAYLOAD: &str = "payload_premium_subscription";

/// Счет на премиум: одна позиция, 1 Star, фиксированные заголовок и описание.
pub async fn send_premium_invoice(
    bot: &Bot,
    chat_id: ChatId,
    payment_config: &PaymentConfig,
) -> Result<Message, Box<dyn Error + Send + Sync>> {
    let prices = vec![LabeledPrice {
        label: "Премиум подписка на 1 месяц".to_string(),
        amount: 1,
    }];

    log::info!("Sending premium invoice to chat {}", chat_id);

    let invoice = bot
        .send_invoice(
            chat_id,
            "Премиум подписка".to_string(),
            "Получите доступ к премиум функциям".to_string(),
            PREMIUM_INVOICE_PAYLOAD.to_string(),
            payment_config.currency.clone(),
            prices,
        )
        .await?;

    Ok(invoice)
}

/// Предпроверка оплаты всегда подтверждается: ни склада, ни антифрода
/// у подписки нет.
pub async fn pre_checkout_handler(
    bot: Bot,
    q: PreCheckoutQuery,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    log::info!("Pre-checkout from {}: payload {}", q.from.id, q.invoice_payload);

    if let Err(e) = bot.answer_pre_checkout_query(q.id, true).await {
        log::error!("Error in pre-checkout: {}", e);
    }

    Ok(())
}

/// Успешная оплата: убрать служебные сообщения из чата, включить премиум
/// на один календарный месяц и обновить карточку на месте.
pub async fn successful_payment_handler(
    bot: Bot,
    msg: Message,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let chat_id = msg.chat.id;

    if let Some(payment) = msg.successful_payment() {
        log::info!(
            "Payment received from {}: {} {}",
            chat_id,
            payment.total_amount,
            payment.currency
        );
    }

    if let Err(e) = bot.delete_message(chat_id, msg.id).await {
        log::error!("Error deleting payment confirmation message: {}", e);
    }

    let Some(mut user) = state.db.get_user(chat_id).await? else {
        send_register_hint(&bot, chat_id).await;
        return Ok(());
    };

    user.is_premium = true;
    user.premium_expiry = Some(Utc::now() + Months::new(1));
    state.db.save_user(&user).await?;

    let tracked = state.tracked_messages(chat_id).await;
    if let Some(invoice_message_id) = tracked.invoice_message_id {
        if let Err(e) = bot.delete_message(chat_id, invoice_message_id).await {
            log::error!("Error deleting invoice message: {}", e);
        }
        state.clear_invoice_message(chat_id).await;
    }

    show_profile(&bot, &state, chat_id, false).await
}
