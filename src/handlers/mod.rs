pub mod admin;
pub mod callbacks;
pub mod commands;
pub mod keyboards;
pub mod messages;
pub mod notify;
pub mod texts;

pub use callbacks::callback_handler;
pub use commands::command_handler;
pub use messages::message_handler;
