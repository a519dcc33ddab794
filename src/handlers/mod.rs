pub mod commands;
pub mod messages;
pub mod callbacks;
pub mod payments;
pub mod utils;

pub use commands::command_handler;
pub use messages::message_handler;
pub use callbacks::callback_handler;
pub use payments::{pre_checkout_handler, successful_payment_handler};
