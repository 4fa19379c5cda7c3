use std::env;

use teloxide::{prelude::*, utils::command::BotCommands};

mod config;
mod database;
mod dialogue;
mod error;
mod handlers;
mod models;

use crate::config::Config;
use crate::database::Database;
use crate::dialogue::DialogueStore;
use crate::handlers::{callback_handler, command_handler, message_handler};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "snake_case", description = "Доступные команды:")]
enum Command {
    #[command(description = "начать работу с ботом")]
    Start,
    #[command(description = "записаться на стрижку")]
    Book,
    #[command(description = "мои записи")]
    MyBookings,
    #[command(description = "отменить процесс записи")]
    Cancel,
    #[command(description = "панель барбера")]
    Admin,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Загружаем .env и инициализируем логирование
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Starting barbershop booking bot...");

    // Инициализация базы данных
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let db = Database::new(&database_url).await?;
    db.init().await?;
    log::info!("✅ Database initialized");

    let config = Config::from_env()?;
    let dialogues = DialogueStore::new();

    let bot = Bot::from_env();

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![config, db, dialogues])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
