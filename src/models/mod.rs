pub mod payment_config;
pub mod user;
pub mod zodiac;

pub use payment_config::PaymentConfig;
pub use user::UserProfile;
pub use zodiac::{ZodiacSign, ZODIAC_SIGNS};
