//! Telegram update endpoints.
//!
//! Each endpoint converts a teloxide update into the messenger-neutral model
//! and hands it to the core dispatcher. Failures are reported by the
//! dispatcher itself, so endpoints always succeed.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use askbot_core::{
    dispatcher::CommandDispatcher,
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::{self, IncomingUpdate, TextMessage},
};

pub async fn handle_message(
    msg: Message,
    dispatcher: Arc<CommandDispatcher>,
) -> ResponseResult<()> {
    let Some(update) = text_update(&msg) else {
        return Ok(());
    };
    dispatcher.handle(update).await;
    Ok(())
}

pub async fn handle_callback(
    q: CallbackQuery,
    dispatcher: Arc<CommandDispatcher>,
) -> ResponseResult<()> {
    dispatcher.handle(callback_update(&q)).await;
    Ok(())
}

fn text_update(msg: &Message) -> Option<IncomingUpdate> {
    let text = msg.text()?;

    // Messages without a sender (channel posts) are keyed by the chat.
    let (user_id, username) = match msg.from() {
        Some(user) => (UserId(user.id.0 as i64), user.username.clone()),
        None => (UserId(msg.chat.id.0), msg.chat.username().map(str::to_string)),
    };

    Some(IncomingUpdate::Text(TextMessage {
        chat_id: ChatId(msg.chat.id.0),
        user_id,
        username,
        text: text.to_string(),
    }))
}

fn callback_update(q: &CallbackQuery) -> IncomingUpdate {
    IncomingUpdate::Callback(types::CallbackQuery {
        callback_id: q.id.clone(),
        user_id: UserId(q.from.id.0 as i64),
        data: q.data.clone().unwrap_or_default(),
        message: q.message.as_ref().map(|m| MessageRef {
            chat_id: ChatId(m.chat().id.0),
            message_id: MessageId(m.id().0),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn alice() -> Value {
        json!({"id": 42, "is_bot": false, "first_name": "Alice", "username": "alice"})
    }

    fn group_message_json(from: Option<Value>, text: Option<&str>) -> Value {
        let mut v = json!({
            "message_id": 7,
            "date": 1_700_000_000,
            "chat": {"id": -1001, "type": "supergroup", "title": "Gear talk"},
        });
        if let Some(from) = from {
            v["from"] = from;
        }
        if let Some(text) = text {
            v["text"] = json!(text);
        }
        v
    }

    fn group_message(from: Option<Value>, text: &str) -> Message {
        serde_json::from_value(group_message_json(from, Some(text))).unwrap()
    }

    fn callback(data: &str, message: Option<Value>) -> CallbackQuery {
        let mut v = json!({
            "id": "cb-1",
            "from": alice(),
            "chat_instance": "ci-1",
            "data": data,
        });
        if let Some(message) = message {
            v["message"] = message;
        }
        serde_json::from_value(v).unwrap()
    }

    fn expect_text(update: Option<IncomingUpdate>) -> TextMessage {
        match update {
            Some(IncomingUpdate::Text(m)) => m,
            other => panic!("expected text update, got {other:?}"),
        }
    }

    #[test]
    fn text_is_keyed_by_sender() {
        let msg = group_message(Some(alice()), "/ask hi");
        let m = expect_text(text_update(&msg));

        assert_eq!(m.chat_id, ChatId(-1001));
        assert_eq!(m.user_id, UserId(42));
        assert_eq!(m.username.as_deref(), Some("alice"));
        assert_eq!(m.text, "/ask hi");
    }

    #[test]
    fn sender_without_username_passes_none() {
        let from = json!({"id": 43, "is_bot": false, "first_name": "Bob"});
        let m = expect_text(text_update(&group_message(Some(from), "/start")));

        assert_eq!(m.user_id, UserId(43));
        assert_eq!(m.username, None);
    }

    #[test]
    fn channel_post_without_sender_is_keyed_by_chat() {
        let msg: Message = serde_json::from_value(json!({
            "message_id": 9,
            "date": 1_700_000_000,
            "chat": {"id": -1002, "type": "channel", "title": "News", "username": "newsroom"},
            "text": "/start",
        }))
        .unwrap();
        let m = expect_text(text_update(&msg));

        assert_eq!(m.chat_id, ChatId(-1002));
        assert_eq!(m.user_id, UserId(-1002));
        assert_eq!(m.username.as_deref(), Some("newsroom"));
    }

    #[test]
    fn messages_without_text_are_skipped() {
        let mut v = group_message_json(Some(alice()), None);
        v["location"] = json!({"longitude": 13.4, "latitude": 52.5});
        let msg: Message = serde_json::from_value(v).unwrap();

        assert!(text_update(&msg).is_none());
    }

    #[test]
    fn callback_carries_origin_message() {
        let origin = group_message_json(Some(alice()), Some("menu"));
        let update = callback_update(&callback("help_btn", Some(origin)));
        let IncomingUpdate::Callback(q) = update else {
            panic!("expected callback update");
        };

        assert_eq!(q.callback_id, "cb-1");
        assert_eq!(q.user_id, UserId(42));
        assert_eq!(q.data, "help_btn");
        assert_eq!(
            q.message,
            Some(MessageRef {
                chat_id: ChatId(-1001),
                message_id: MessageId(7),
            })
        );
    }

    #[test]
    fn callback_without_message_has_no_origin() {
        let update = callback_update(&callback("help_btn", None));
        let IncomingUpdate::Callback(q) = &update else {
            panic!("expected callback update");
        };

        assert_eq!(q.message, None);
        assert_eq!(update.chat_id(), None);
    }
}
