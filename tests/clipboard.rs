//! The clipboard helper keeps a copied command readable after it reports
//! success. Needs a display server, so it passes trivially without one.

#![cfg(target_os = "linux")]

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

fn has_display() -> bool {
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()))
}

#[test]
fn test_copied_command_survives_the_caller() {
    if !has_display() {
        return;
    }

    let mut helper = Command::new(env!("CARGO_BIN_EXE_clippycli"))
        .arg("--clipboard-serve")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdin = helper.stdin.take().unwrap();
    stdin.write_all(b"ls -la").unwrap();
    drop(stdin);

    let mut line = String::new();
    BufReader::new(helper.stdout.take().unwrap())
        .read_line(&mut line)
        .unwrap();
    assert_eq!(line.trim_end(), "ok");

    // Our own handle is opened after the helper took ownership.
    let mut clipboard = arboard::Clipboard::new().unwrap();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(clipboard.get_text().unwrap(), "ls -la");

    // Taking the selection back releases the helper.
    clipboard.set_text("").unwrap();
    thread::sleep(Duration::from_millis(200));
    if helper.try_wait().unwrap().is_none() {
        let _ = helper.kill();
        let _ = helper.wait();
    }
}
