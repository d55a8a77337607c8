use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand as TgBotCommand};

use askbot_core::{
    answer::AnswerService,
    config::Config,
    dispatcher::{BotCommand, CommandDispatcher},
    messaging::port::MessagingPort,
    registry::UserRegistry,
};

use crate::handlers;
use crate::TelegramMessenger;

/// Long-poll Telegram until Ctrl-C.
pub async fn run_polling(
    cfg: Arc<Config>,
    registry: Arc<UserRegistry>,
    answers: Arc<dyn AnswerService>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Our own name decides which `/cmd@name` commands are ours.
    let bot_username = match bot.get_me().await {
        Ok(me) => {
            tracing::info!(bot = ?me.user.username, "askbot started");
            me.user.username.clone()
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not fetch bot identity; only bare commands accepted");
            None
        }
    };
    tracing::info!(registry = %registry.path().display(), "using user registry");

    if let Err(e) = bot.set_my_commands(command_menu()).await {
        tracing::warn!(error = %e, "failed to register command menu");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let mut dispatcher = CommandDispatcher::new(&cfg, registry, answers, messenger);
    if let Some(name) = bot_username {
        dispatcher = dispatcher.with_bot_username(name);
    }
    let dispatcher = Arc::new(dispatcher);

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("askbot stopped");
    Ok(())
}

fn command_menu() -> Vec<TgBotCommand> {
    BotCommand::DESCRIPTIONS
        .iter()
        .map(|(name, description)| TgBotCommand::new(*name, *description))
        .collect()
}
