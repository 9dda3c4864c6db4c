use std::io::{self, BufRead, Write};

use crate::api::events::Toast;
use crate::conversations::ConversationList;
use crate::ui::sidebar::Sidebar;

const HELP: &str = "commands: search [text], new, open <n>, delete <n>, list, logout, quit";

pub fn show_main_window<R: BufRead, W: Write>(
    mut list: ConversationList,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    let mut sidebar = Sidebar::new();
    writeln!(out, "Gemini Chat")?;
    writeln!(out, "{HELP}")?;
    sidebar.render(&list, out)?;

    loop {
        super::prompt(out, "> ")?;
        let Some(line) = super::read_line(input)? else {
            return Ok(());
        };
        let (cmd, arg) = match line.split_once(' ') {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line.as_str(), ""),
        };

        match cmd {
            "" => {}
            "search" => {
                list.set_search_query(arg);
                sidebar.render(&list, out)?;
            }
            "new" => {
                let signal = list.create_conversation();
                super::print_toast(out, &signal.toast())?;
                sidebar.render(&list, out)?;
            }
            "open" => match row_id(&sidebar, arg).and_then(|id| list.get(id)) {
                Some(conv) => writeln!(out, "-> /chatroom/{} ({})", conv.id, conv.title)?,
                None => writeln!(out, "No conversation at row {arg}")?,
            },
            "delete" => {
                let Some(id) = row_id(&sidebar, arg).map(str::to_string) else {
                    writeln!(out, "No conversation at row {arg}")?;
                    continue;
                };
                if list.request_delete(&id) {
                    confirm_delete(&mut list, input, out)?;
                }
                sidebar.render(&list, out)?;
            }
            "list" => sidebar.render(&list, out)?,
            "logout" => {
                super::print_toast(out, &Toast::success("Logged out successfully"))?;
                return Ok(());
            }
            "quit" => return Ok(()),
            _ => writeln!(out, "{HELP}")?,
        }
    }
}

fn row_id<'a>(sidebar: &'a Sidebar, arg: &str) -> Option<&'a str> {
    arg.parse::<usize>().ok().and_then(|row| sidebar.id_at(row))
}

fn confirm_delete<R: BufRead, W: Write>(
    list: &mut ConversationList,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    if let Some(conv) = list.pending_delete() {
        writeln!(out, "Delete Conversation: {}", conv.title)?;
        writeln!(
            out,
            "Are you sure you want to delete this conversation? This action cannot be undone."
        )?;
    }
    super::prompt(out, "Delete? [y/N] ")?;
    let answer = super::read_line(input)?.unwrap_or_default();
    if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
        if let Some(signal) = list.confirm_delete() {
            super::print_toast(out, &signal.toast())?;
        }
    } else {
        list.cancel_delete();
    }
    Ok(())
}
