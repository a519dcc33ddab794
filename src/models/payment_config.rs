/// Настройки оплаты. Для Telegram Stars токен провайдера не нужен,
/// валюта всегда XTR.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub provider_token: Option<String>,
    pub currency: String,
}
