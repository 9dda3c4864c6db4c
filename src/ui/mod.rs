//! Line-oriented terminal front end. Each screen reads commands from `input`
//! and writes what it shows to `out`.

use std::io::{self, BufRead, Write};

use crate::api::events::{Toast, ToastKind};

pub mod login;
pub mod main_window;
pub mod sidebar;

pub fn print_toast<W: Write>(out: &mut W, toast: &Toast) -> io::Result<()> {
    let tag = match toast.kind {
        ToastKind::Success => "ok",
        ToastKind::Error => "error",
    };
    writeln!(out, "[{tag}] {}", toast.message)
}

/// Next trimmed line, or `None` at end of input.
pub(crate) fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub(crate) fn prompt<W: Write>(out: &mut W, label: &str) -> io::Result<()> {
    write!(out, "{label}")?;
    out.flush()
}
