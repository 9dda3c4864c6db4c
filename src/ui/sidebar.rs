use std::io::{self, Write};

use crate::conversations::ConversationList;

/// Numbered rendering of the filtered conversation view. Remembers which id
/// sits behind each row number so commands can refer to rows.
#[derive(Debug, Default)]
pub struct Sidebar {
    rows: Vec<String>,
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_items(&mut self, list: &ConversationList) {
        self.rows = list.filtered().map(|c| c.id.clone()).collect();
    }

    /// Row numbers start at 1.
    pub fn id_at(&self, row: usize) -> Option<&str> {
        row.checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .map(String::as_str)
    }

    pub fn render<W: Write>(&mut self, list: &ConversationList, out: &mut W) -> io::Result<()> {
        self.set_items(list);
        writeln!(out, "Your Conversations")?;
        writeln!(out, "{}", list.summary())?;
        if !list.search_query().is_empty() {
            writeln!(out, "(search: {})", list.search_query())?;
        }
        if self.rows.is_empty() {
            writeln!(out, "No conversations found")?;
            return writeln!(out, "Type `new` to start a new conversation");
        }
        for (i, conv) in list.filtered().enumerate() {
            writeln!(out, "{:>3}. {}  ({})", i + 1, conv.title, conv.last_activity)?;
            writeln!(out, "     {}", conv.last_message)?;
        }
        Ok(())
    }
}
