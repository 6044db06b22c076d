//! Confirm-step actions: copy the command or run it.
//!
//! Both run after the TUI has released the terminal, so the executed
//! command gets a normal screen and inherited stdio.

use crate::error::ActionError;
use arboard::Clipboard;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read, Write};
use std::process::Command;
use tracing::{debug, info};

/// What to do with a confirmed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Run it through `sh -c`.
    #[default]
    Execute,
    /// Put it on the system clipboard.
    Copy,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Execute => write!(f, "execute"),
            Action::Copy => write!(f, "copy"),
        }
    }
}

/// Perform `action` on `command`.
pub fn perform(action: Action, command: &str) -> Result<(), ActionError> {
    info!("Confirmed action: {} `{}`", action, command);
    match action {
        Action::Execute => execute(command),
        Action::Copy => copy_to_clipboard(command),
    }
}

/// Copy text to the system clipboard.
///
/// On Linux the selection belongs to a live process, so a detached copy of
/// this binary takes it over and keeps serving it after we exit. Elsewhere
/// the OS keeps the contents itself.
pub fn copy_to_clipboard(text: &str) -> Result<(), ActionError> {
    #[cfg(target_os = "linux")]
    {
        let exe = std::env::current_exe()?;
        spawn_clipboard_holder(&exe, text)?;
    }

    #[cfg(not(target_os = "linux"))]
    {
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text)?;
    }

    debug!("Command copied to clipboard");
    Ok(())
}

/// Start `exe --clipboard-serve`, hand it `text` on stdin and wait until it
/// reports that the clipboard is set.
#[cfg(target_os = "linux")]
pub fn spawn_clipboard_holder(exe: &std::path::Path, text: &str) -> Result<(), ActionError> {
    use std::io::{BufRead, BufReader};
    use std::os::unix::process::CommandExt;
    use std::process::Stdio;

    let mut child = Command::new(exe)
        .arg(CLIPBOARD_SERVE_FLAG)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        // Own process group, so closing the terminal doesn't take it down.
        .process_group(0)
        .spawn()
        .map_err(|e| {
            ActionError::ClipboardHolder(format!("failed to start clipboard helper: {}", e))
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }

    let mut status = String::new();
    if let Some(stdout) = child.stdout.take() {
        BufReader::new(stdout).read_line(&mut status)?;
    }

    match status.trim() {
        HOLDER_READY => {
            debug!("Clipboard holder running (pid {})", child.id());
            Ok(())
        }
        "" => Err(ActionError::ClipboardHolder(
            "clipboard helper exited without reporting".to_string(),
        )),
        other => Err(ActionError::ClipboardHolder(
            other.trim_start_matches("error: ").to_string(),
        )),
    }
}

/// Hidden CLI flag that runs [`serve_clipboard`].
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub const CLIPBOARD_SERVE_FLAG: &str = "--clipboard-serve";

const HOLDER_READY: &str = "ok";

/// Body of the clipboard holder process: read the text from stdin, take the
/// selection, report readiness on stdout and keep the selection until
/// another program replaces it.
pub fn serve_clipboard() -> anyhow::Result<()> {
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;

    let mut stdout = io::stdout();
    let mut clipboard = match Clipboard::new() {
        Ok(clipboard) => clipboard,
        Err(e) => {
            writeln!(stdout, "error: {}", e)?;
            return Ok(());
        }
    };
    if let Err(e) = clipboard.set_text(text.as_str()) {
        writeln!(stdout, "error: {}", e)?;
        return Ok(());
    }
    writeln!(stdout, "{}", HOLDER_READY)?;
    stdout.flush()?;

    hold_selection(&mut clipboard, text)?;
    debug!("Clipboard selection taken over by another program");
    Ok(())
}

#[cfg(target_os = "linux")]
fn hold_selection(clipboard: &mut Clipboard, text: String) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;
    // Blocks until some other program owns the selection.
    clipboard.set().wait().text(text)
}

#[cfg(not(target_os = "linux"))]
fn hold_selection(_clipboard: &mut Clipboard, _text: String) -> Result<(), arboard::Error> {
    Ok(())
}

/// Run a command line through the POSIX shell and wait for it.
pub fn execute(command: &str) -> Result<(), ActionError> {
    let status = Command::new("sh").arg("-c").arg(command).status()?;
    debug!("Command finished: {}", status);

    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(ActionError::ExitCode(code)),
        None => Err(ActionError::Signaled),
    }
}
