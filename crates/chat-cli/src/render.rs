//! Terminal rendering of the directory and the chat pane

use colored::Colorize;
use session_manager::{DirectoryEntry, ThreadView};

pub fn print_directory(entries: &[DirectoryEntry]) {
    if entries.is_empty() {
        println!("{}", "No conversations yet. Create one with `new`.".dimmed());
        return;
    }
    for entry in entries {
        let marker = if entry.selected { "*" } else { " " };
        let line = format!(
            "{} {}  {}  {}",
            marker,
            entry.conversation.id,
            entry.conversation.created_at.format("%Y-%m-%d %H:%M"),
            entry.conversation.title
        );
        if entry.selected {
            println!("{}", line.green().bold());
        } else {
            println!("{}", line);
        }
    }
}

/// Navigation hint for a thread, e.g. `< 2/3 >`
pub fn position_label(view: &ThreadView) -> Option<String> {
    view.position.map(|(current, total)| {
        format!(
            "{} {}/{} {}",
            if view.can_prev { "<" } else { " " },
            current,
            total,
            if view.can_next { ">" } else { " " }
        )
    })
}

pub fn print_threads(views: &[ThreadView]) {
    if views.is_empty() {
        println!("{}", "(no messages)".dimmed());
        return;
    }
    for (index, view) in views.iter().enumerate() {
        let mut header = format!("[{}] you", index + 1);
        if let Some(label) = position_label(view) {
            header.push_str(&format!("  {}", label));
        }
        if view.is_editing {
            header.push_str("  (editing)");
        }
        println!("{}", header.cyan().bold());
        println!("    {}", view.text);
        match &view.response {
            Some(response) => println!("    {} {}", "bot:".yellow(), response),
            None => println!("    {}", "bot: (no reply)".dimmed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn view(position: Option<(usize, usize)>, can_prev: bool, can_next: bool) -> ThreadView {
        ThreadView {
            thread_id: Uuid::new_v4(),
            message_id: Uuid::new_v4(),
            text: "hello".to_string(),
            response: None,
            position,
            can_prev,
            can_next,
            is_editing: false,
        }
    }

    #[test]
    fn test_position_label() {
        assert_eq!(position_label(&view(None, false, false)), None);
        assert_eq!(
            position_label(&view(Some((2, 3)), true, true)).as_deref(),
            Some("< 2/3 >")
        );
        assert_eq!(
            position_label(&view(Some((1, 2)), false, true)).as_deref(),
            Some("  1/2 >")
        );
    }
}
