//! Standalone HTML page of a conversation
//!
//! Bubbles use the same palette as the terminal front end: user messages
//! on the right in blue, bot messages on the left in dark grey.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::format::format_message;
use crate::state::Conversation;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Chat transcript</title>
<style>
body { margin: 0; padding: 20px; background: #1c1c1c; color: #ffffff;
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif; }
.chat { display: flex; flex-direction: column; gap: 10px; padding: 20px;
  background: #2a2a2a; border-radius: 10px; box-shadow: 0 0 10px rgba(0, 0, 0, 0.5); }
.msg { border-radius: 20px; padding: 10px 20px; max-width: 80%; word-wrap: break-word; }
.user { align-self: flex-end; background: #007bff; color: #fff; box-shadow: 0px 5px 15px rgba(0, 123, 255, 0.2); }
.bot { align-self: flex-start; background: #444; color: #ddd; }
.code { font-family: ui-monospace, Menlo, Consolas, monospace; }
</style>
</head>
<body>
<div class="chat">
"#;

const PAGE_TAIL: &str = "</div>\n</body>\n</html>\n";

/// Render the conversation as a complete HTML document.
pub fn render_html(conversation: &Conversation) -> String {
    let mut page = String::from(PAGE_HEAD);

    for message in conversation {
        let mut class = format!("msg {}", message.sender().as_str());
        if message.is_code() {
            class.push_str(" code");
        }
        // Writing to a String can't fail
        let _ = writeln!(page, "<div class=\"{class}\">{}</div>", format_message(message.text()));
    }

    page.push_str(PAGE_TAIL);
    page
}

/// Write the rendered transcript to `path`.
pub fn write_html(conversation: &Conversation, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_html(conversation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Message;
    use tempfile::TempDir;

    fn sample() -> Conversation {
        let mut conversation = Conversation::new();
        conversation.append(Message::user("a **b** c"));
        conversation.append(Message::bot("### Title\nbody"));
        conversation.append(Message::bot("```x```"));
        conversation
    }

    #[test]
    fn test_messages_are_formatted_in_order() {
        let page = render_html(&sample());

        let user = page.find(r#"<div class="msg user">a <strong>b</strong> c</div>"#).unwrap();
        let bot = page.find(r#"<div class="msg bot"><h3>Title</h3><p></p>body</div>"#).unwrap();
        let code = page.find(r#"<div class="msg bot code">```x```</div>"#).unwrap();
        assert!(user < bot && bot < code);
    }

    #[test]
    fn test_empty_conversation_is_valid_page() {
        let page = render_html(&Conversation::new());
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.ends_with("</html>\n"));
        assert!(!page.contains("class=\"msg"));
    }

    #[test]
    fn test_write_html_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("chat.html");

        write_html(&sample(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_html(&sample()));
    }
}
