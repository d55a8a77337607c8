use crate::domain::{ChatId, MessageRef, UserId};

/// Messenger-neutral incoming update model.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Text(TextMessage),
    Callback(CallbackQuery),
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub callback_id: String,
    pub user_id: UserId,
    pub data: String,
    /// Message the pressed button was attached to, if the platform still has it.
    pub message: Option<MessageRef>,
}

impl IncomingUpdate {
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            IncomingUpdate::Text(m) => Some(m.chat_id),
            IncomingUpdate::Callback(q) => q.message.map(|m| m.chat_id),
        }
    }
}

/// Inline keyboard attached under a message, laid out in rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: ButtonAction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    /// Opens an external link.
    Url(String),
    /// Sends the opaque token back to the bot as a callback query.
    Callback(String),
}

impl InlineKeyboard {
    /// Convenience for a single row of buttons.
    pub fn single_row(buttons: Vec<InlineButton>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }
}

impl InlineButton {
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    pub fn callback(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(token.into()),
        }
    }
}

/// Limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    /// Longest message body accepted, in UTF-16 code units.
    pub max_message_len: usize,
}
