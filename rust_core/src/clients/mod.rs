pub mod stock_api;
pub mod telegram;

// Re-export commonly used types
pub use stock_api::StockApiClient;
pub use telegram::{TelegramClient, TgChat, TgMessage, TgUpdate};
