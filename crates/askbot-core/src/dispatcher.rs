//! Command routing.
//!
//! Every update is handled on its own: a typed [`BotCommand`] (or the help
//! button callback) selects exactly one handler, which talks to the registry
//! and/or the answer service and sends one reply.

use std::sync::Arc;

use crate::{
    answer::AnswerService,
    config::Config,
    domain::{ChatId, MessageRef, UserId},
    errors::Error,
    formatting::{
        answer_html, empty_prompt_html, escape_html, fit_message, help_html, menu_keyboard,
        welcome_html, GENERIC_FAILURE, HELP_CALLBACK_TOKEN, THINKING_PLACEHOLDER,
    },
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, IncomingUpdate, InlineKeyboard, TextMessage},
    },
    registry::UserRegistry,
    Result,
};

/// Display name used when the sender has no `@username`.
pub const UNKNOWN_USERNAME: &str = "unknown";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Ask(String),
    Help,
}

impl BotCommand {
    /// Command names and descriptions, in menu order.
    pub const DESCRIPTIONS: [(&'static str, &'static str); 3] = [
        ("start", "Show the welcome message"),
        ("ask", "Ask a question"),
        ("help", "List available commands"),
    ];

    /// Parse `/cmd[@botname] [args]`. Names are case-sensitive; unknown
    /// commands and plain text yield `None`.
    ///
    /// A `@botname` suffix must name this bot (case-insensitive). Commands
    /// addressed to another bot, or any addressed command while our own name
    /// is unknown, yield `None`.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = match head.split_once('@') {
            None => head,
            Some((name, target)) => {
                let own = bot_username?.trim_start_matches('@');
                if !target.eq_ignore_ascii_case(own) {
                    return None;
                }
                name
            }
        };

        match name {
            "start" => Some(BotCommand::Start),
            "ask" => Some(BotCommand::Ask(args.to_string())),
            "help" => Some(BotCommand::Help),
            _ => None,
        }
    }
}

pub struct CommandDispatcher {
    registry: Arc<UserRegistry>,
    answers: Arc<dyn AnswerService>,
    messenger: Arc<dyn MessagingPort>,
    menu: InlineKeyboard,
    bot_username: Option<String>,
}

impl CommandDispatcher {
    pub fn new(
        cfg: &Config,
        registry: Arc<UserRegistry>,
        answers: Arc<dyn AnswerService>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            registry,
            answers,
            messenger,
            menu: menu_keyboard(&cfg.website_url),
            bot_username: None,
        }
    }

    /// Accept `/cmd@<name>` addressed to this bot.
    pub fn with_bot_username(mut self, name: impl Into<String>) -> Self {
        self.bot_username = Some(name.into());
        self
    }

    /// Dispatch and report failures to the chat with an opaque message.
    pub async fn handle(&self, update: IncomingUpdate) {
        let chat_id = update.chat_id();
        let Err(err) = self.dispatch(update).await else {
            return;
        };

        tracing::error!(chat_id = ?chat_id.map(|c| c.0), error = %err, "update handling failed");
        if let Some(chat_id) = chat_id {
            if let Err(e) = self.messenger.send_text(chat_id, GENERIC_FAILURE).await {
                tracing::warn!(chat_id = chat_id.0, error = %e, "failed to report failure");
            }
        }
    }

    /// Route one update to its handler. Errors propagate unchanged.
    pub async fn dispatch(&self, update: IncomingUpdate) -> Result<()> {
        let msg = match update {
            IncomingUpdate::Text(msg) => msg,
            IncomingUpdate::Callback(q) => return self.help_button(&q).await,
        };

        match BotCommand::parse(&msg.text, self.bot_username.as_deref()) {
            Some(BotCommand::Start) => self.welcome(&msg).await,
            Some(BotCommand::Ask(prompt)) => self.ask(msg.chat_id, &prompt).await,
            Some(BotCommand::Help) => self.help(msg.chat_id).await,
            None => {
                tracing::debug!(chat_id = msg.chat_id.0, "ignoring message not addressed to us");
                Ok(())
            }
        }
    }

    async fn welcome(&self, msg: &TextMessage) -> Result<()> {
        let username = display_name(msg.username.as_deref());
        let is_new = self
            .registry
            .ensure_registered(&msg.user_id.registry_key(), username)
            .await?;
        log_registration(msg.user_id, username, is_new);

        self.messenger
            .send_html(msg.chat_id, &welcome_html(username), Some(&self.menu))
            .await?;
        Ok(())
    }

    async fn ask(&self, chat_id: ChatId, prompt: &str) -> Result<()> {
        if prompt.is_empty() {
            self.messenger
                .send_html(chat_id, &empty_prompt_html(), Some(&self.menu))
                .await?;
            return Ok(());
        }

        let placeholder = self
            .messenger
            .send_text(chat_id, THINKING_PLACEHOLDER)
            .await?;

        tracing::info!(chat_id = chat_id.0, prompt_len = prompt.len(), "asking answer service");
        let answer = self.answers.generate_answer(prompt).await?;

        match self.edit_answer(placeholder, &answer_html(&answer)).await {
            Err(Error::MarkupRejected(reason)) => {
                tracing::warn!(chat_id = chat_id.0, %reason, "answer markup rejected, resending escaped");
                self.edit_answer(placeholder, &answer_html(&escape_html(&answer)))
                    .await
            }
            other => other,
        }
    }

    async fn edit_answer(&self, placeholder: MessageRef, html: &str) -> Result<()> {
        let limit = self.messenger.capabilities().max_message_len;
        self.messenger
            .edit_html(placeholder, &fit_message(html, limit), Some(&self.menu))
            .await
    }

    async fn help(&self, chat_id: ChatId) -> Result<()> {
        self.messenger
            .send_html(chat_id, &help_html(), Some(&self.menu))
            .await?;
        Ok(())
    }

    async fn help_button(&self, q: &CallbackQuery) -> Result<()> {
        self.messenger
            .answer_callback_query(&q.callback_id, None)
            .await?;

        if q.data != HELP_CALLBACK_TOKEN {
            tracing::debug!(data = %q.data, "ignoring unknown callback");
            return Ok(());
        }
        let Some(origin) = q.message else {
            tracing::debug!(user_id = q.user_id.0, "help callback without originating chat");
            return Ok(());
        };

        self.help(origin.chat_id).await
    }
}

fn display_name(username: Option<&str>) -> &str {
    username
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(UNKNOWN_USERNAME)
}

fn log_registration(user_id: UserId, username: &str, is_new: bool) {
    if is_new {
        tracing::info!(user_id = user_id.0, username, "registered new user");
    } else {
        tracing::debug!(user_id = user_id.0, username, "returning user");
    }
}
