//! Terminal setup and the async event loop.
//!
//! Key presses, spinner ticks and the generation result are multiplexed
//! with `tokio::select!` and fed one at a time into the controller.

use super::controller::{update, Effect, Event, Session};
use super::view::{self, Theme};
use crate::executor::Action;
use crate::llm::{CommandGenerator, Completion};
use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{Event as TermEvent, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::{Stream, StreamExt};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

const TICK_RATE: Duration = Duration::from_millis(100);

/// How the TUI ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Cancelled, or left the result screen without confirming.
    Quit,
    /// The user confirmed the command.
    Confirm(Action, String),
}

/// Raw mode plus alternate screen, undone on drop whatever the exit path.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        // From here on, an early return restores raw mode through Drop.
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    }
}

/// Run the TUI until the user leaves it.
///
/// The terminal is restored before returning, so the caller may print or
/// spawn processes freely.
pub async fn run(
    session: Session,
    initial: Effect,
    generator: Arc<CommandGenerator>,
    theme: &Theme,
) -> Result<Outcome> {
    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let generate = move |prompt: String| {
        let generator = Arc::clone(&generator);
        async move { generator.generate(&prompt).await }
    };
    let draw = |session: &Session| {
        terminal
            .draw(|frame| view::draw(frame, session, theme))
            .map(|_| ())
    };

    let result = drive(session, initial, EventStream::new(), generate, draw).await;

    drop(guard);
    result
}

/// The event loop proper, independent of the real terminal.
///
/// `events` supplies terminal events, `generate` produces the completion
/// future for a prompt and `draw` renders the session before each wait.
async fn drive<E, G, F, D>(
    mut session: Session,
    initial: Effect,
    mut events: E,
    generate: G,
    mut draw: D,
) -> Result<Outcome>
where
    E: Stream<Item = io::Result<TermEvent>> + Unpin,
    G: Fn(String) -> F,
    F: Future<Output = Completion> + Send + 'static,
    D: FnMut(&Session) -> io::Result<()>,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut ticker = tokio::time::interval(TICK_RATE);
    let mut effect = initial;

    loop {
        match effect {
            Effect::None => {}
            Effect::Generate(prompt) => spawn_generation(generate(prompt), &tx),
            Effect::Quit => return Ok(Outcome::Quit),
            Effect::Confirm(action, command) => return Ok(Outcome::Confirm(action, command)),
        }

        draw(&session)?;

        let event = tokio::select! {
            maybe = events.next() => match maybe {
                Some(Ok(TermEvent::Key(key))) => Some(Event::Key(key)),
                // Resizes and the like only need a redraw.
                Some(Ok(_)) => None,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(Outcome::Quit),
            },
            Some(completion) = rx.recv() => Some(Event::Generated(completion)),
            _ = ticker.tick() => Some(Event::Tick),
        };

        effect = match event {
            Some(event) => update(&mut session, event),
            None => Effect::None,
        };
    }
}

/// Start the generation request in the background. The controller only
/// emits this from Input/Edit, so at most one is in flight.
fn spawn_generation<F>(request: F, tx: &mpsc::UnboundedSender<Completion>)
where
    F: Future<Output = Completion> + Send + 'static,
{
    debug!("Spawning generation task");
    let tx = tx.clone();
    tokio::spawn(async move {
        let completion = request.await;
        // The receiver is gone once the UI has exited.
        let _ = tx.send(completion);
    });
}
