//! Reply templates (Telegram HTML) and the static menu.

use crate::messaging::types::{InlineButton, InlineKeyboard};

/// Callback token carried by the menu's help button.
pub const HELP_CALLBACK_TOKEN: &str = "help_btn";

pub const WEBSITE_BUTTON_LABEL: &str = "🌎Website";
pub const HELP_BUTTON_LABEL: &str = "📜Help";

/// Plain-text placeholder shown while the answer service is working.
pub const THINKING_PLACEHOLDER: &str = "🤖 typing...";

/// Sent when a handler fails; details stay in the logs.
pub const GENERIC_FAILURE: &str = "⚠️ Something went wrong while handling your request. Please try again later.";

const HELP_TEXT: &str = "\
This is a simple telegram bot.

<b>Commands:</b>

🔍 /ask: Get instant answers to your equipment and project questions.
📝 /help: Unsure what to do? Use the /help command to see a list of available commands.

<b>How to Use:</b>

<b>For Equipment Recommendations:</b> Simply use /ask followed by your query
e.g., /ask what's your name?
<b>For General Assistance:</b> Need guidance? Type /help to see how I can assist you further.
";

const EMPTY_PROMPT_TEXT: &str = "\
<b>🪫 Prompt is empty. Please provide a prompt.</b>

for example: <code>/ask What's your name?</code>
";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn help_html() -> String {
    format!("{HELP_TEXT}\n")
}

pub fn welcome_html(username: &str) -> String {
    format!(
        "🚀 <b>Welcome to @{} !</b>\n\n{HELP_TEXT}\n",
        escape_html(username)
    )
}

pub fn empty_prompt_html() -> String {
    format!("{EMPTY_PROMPT_TEXT}\n")
}

/// The answer is relayed as-is (it may carry its own HTML markup).
pub fn answer_html(answer: &str) -> String {
    format!("{answer}\n\n")
}

/// Cut `text` so it fits in `max_units` UTF-16 code units, marking the cut
/// with an ellipsis. Text that already fits is returned unchanged.
pub fn fit_message(text: &str, max_units: usize) -> String {
    if text.encode_utf16().count() <= max_units {
        return text.to_string();
    }

    let budget = max_units.saturating_sub(TRUNCATION_MARK.len_utf16());
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        used += c.len_utf16();
        if used > budget {
            break;
        }
        out.push(c);
    }
    out.push(TRUNCATION_MARK);
    out
}

const TRUNCATION_MARK: char = '…';

/// The fixed two-button menu attached to every reply.
pub fn menu_keyboard(website_url: &str) -> InlineKeyboard {
    InlineKeyboard::single_row(vec![
        InlineButton::url(WEBSITE_BUTTON_LABEL, website_url),
        InlineButton::callback(HELP_BUTTON_LABEL, HELP_CALLBACK_TOKEN),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::types::ButtonAction;

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn welcome_embeds_escaped_username_and_help() {
        let html = welcome_html("a<b");
        assert!(html.starts_with("🚀 <b>Welcome to @a&lt;b !</b>"));
        assert!(html.contains(HELP_TEXT));
    }

    #[test]
    fn fit_message_counts_utf16_units() {
        assert_eq!(fit_message("short", 10), "short");
        assert_eq!(fit_message("abcdef", 4), "abc…");

        // Each emoji is two UTF-16 units and is never split.
        let cut = fit_message("🤖🤖🤖", 4);
        assert_eq!(cut, "🤖…");
        assert!(cut.encode_utf16().count() <= 4);
    }

    #[test]
    fn menu_has_website_then_help_in_one_row() {
        let kb = menu_keyboard("https://example.com/");
        assert_eq!(kb.rows.len(), 1);
        let row = &kb.rows[0];
        assert_eq!(row.len(), 2);
        assert_eq!(row[0].label, WEBSITE_BUTTON_LABEL);
        assert_eq!(
            row[0].action,
            ButtonAction::Url("https://example.com/".to_string())
        );
        assert_eq!(row[1].label, HELP_BUTTON_LABEL);
        assert_eq!(
            row[1].action,
            ButtonAction::Callback(HELP_CALLBACK_TOKEN.to_string())
        );
    }
}
