//! Interaction state machine.
//!
//! All transitions go through [`update`], which mutates the [`Session`] and
//! returns the single [`Effect`] the runtime has to carry out. Nothing in
//! here touches the terminal, the network or the clipboard.

use crate::executor::Action;
use crate::llm::Completion;
use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

/// Screen the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Collecting the first prompt.
    Input,
    /// Waiting for the model.
    Loading,
    /// Showing the generated command or the error.
    Result,
    /// Revising the prompt after a result.
    Edit,
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Generated(Completion),
    Tick,
}

/// Work the runtime performs after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Start the (single) generation request for this prompt.
    Generate(String),
    /// Leave without doing anything.
    Quit,
    /// Leave, then copy or run the command.
    Confirm(Action, String),
}

/// Everything the UI knows for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Session {
    pub state: State,
    /// Editable prompt buffer.
    pub input: Input,
    /// Prompt of the last submission.
    pub prompt: String,
    /// Only `Some` while in [`State::Result`].
    pub generated_command: Option<String>,
    pub last_error: Option<String>,
    /// Text sent to the model for the last completion.
    pub full_prompt: Option<String>,
    pub verbose: bool,
    /// Action bound to Enter on the result screen.
    pub confirm_action: Action,
    pub spinner_frame: usize,
}

impl Session {
    /// Create the session and the effect to run first.
    ///
    /// A non-blank initial prompt skips the input screen and starts
    /// generating right away.
    pub fn new(
        initial_prompt: Option<String>,
        verbose: bool,
        confirm_action: Action,
    ) -> (Self, Effect) {
        let prompt = initial_prompt.unwrap_or_default();
        let mut session = Self {
            state: State::Input,
            input: Input::new(prompt.clone()),
            prompt: String::new(),
            generated_command: None,
            last_error: None,
            full_prompt: None,
            verbose,
            confirm_action,
            spinner_frame: 0,
        };

        let effect = session.submit();
        (session, effect)
    }

    fn submit(&mut self) -> Effect {
        let value = self.input.value();
        if value.trim().is_empty() {
            return Effect::None;
        }

        self.prompt = value.to_string();
        self.state = State::Loading;
        self.generated_command = None;
        self.last_error = None;
        self.full_prompt = None;
        self.spinner_frame = 0;
        Effect::Generate(self.prompt.clone())
    }

    fn complete(&mut self, completion: Completion) {
        if self.state != State::Loading {
            return;
        }

        self.state = State::Result;
        self.full_prompt = Some(completion.full_prompt);
        match completion.result {
            Ok(command) => {
                self.generated_command = Some(command);
                self.last_error = None;
            }
            Err(message) => {
                self.generated_command = None;
                self.last_error = Some(message);
            }
        }
    }

    fn reopen_for_edit(&mut self) {
        self.state = State::Edit;
        self.input = Input::new(self.prompt.clone());
        self.generated_command = None;
        self.full_prompt = None;
    }
}

/// Apply one event to the session.
pub fn update(session: &mut Session, event: Event) -> Effect {
    match event {
        Event::Key(key) => handle_key(session, key),
        Event::Generated(completion) => {
            session.complete(completion);
            Effect::None
        }
        Event::Tick => {
            if session.state == State::Loading {
                session.spinner_frame = session.spinner_frame.wrapping_add(1);
            }
            Effect::None
        }
    }
}

fn is_cancel(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn handle_key(session: &mut Session, key: KeyEvent) -> Effect {
    if key.kind != KeyEventKind::Press {
        return Effect::None;
    }
    if is_cancel(&key) {
        return Effect::Quit;
    }

    match session.state {
        State::Input | State::Edit => match key.code {
            KeyCode::Enter => session.submit(),
            _ => {
                session.input.handle_event(&TermEvent::Key(key));
                Effect::None
            }
        },
        // Editing is locked until the completion arrives.
        State::Loading => Effect::None,
        State::Result => handle_result_key(session, key),
    }
}

fn handle_result_key(session: &mut Session, key: KeyEvent) -> Effect {
    if session.last_error.is_some() {
        return Effect::Quit;
    }

    let Some(command) = session.generated_command.clone() else {
        return Effect::Quit;
    };

    match key.code {
        KeyCode::Enter => Effect::Confirm(session.confirm_action, command),
        KeyCode::Char('c') | KeyCode::Char('C') => Effect::Confirm(Action::Copy, command),
        KeyCode::Char('e') | KeyCode::Char('E') => {
            session.reopen_for_edit();
            Effect::None
        }
        _ => Effect::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl_c() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
    }

    fn type_text(session: &mut Session, text: &str) {
        for ch in text.chars() {
            assert_eq!(update(session, press(KeyCode::Char(ch))), Effect::None);
        }
    }

    fn completed(command: &str) -> Event {
        Event::Generated(Completion {
            full_prompt: "System: rules\n\nUser: list files".to_string(),
            result: Ok(command.to_string()),
        })
    }

    fn failed(message: &str) -> Event {
        Event::Generated(Completion {
            full_prompt: "System: rules\n\nUser: list files".to_string(),
            result: Err(message.to_string()),
        })
    }

    fn empty_session() -> Session {
        Session::new(None, false, Action::Execute).0
    }

    /// Session sitting on the result screen with `ls -la` for "list files".
    fn result_session() -> Session {
        let mut session = empty_session();
        type_text(&mut session, "list files");
        assert_eq!(
            update(&mut session, press(KeyCode::Enter)),
            Effect::Generate("list files".to_string())
        );
        update(&mut session, completed("ls -la"));
        session
    }

    #[test]
    fn test_starts_in_input_without_prompt() {
        let (session, effect) = Session::new(None, false, Action::Execute);
        assert_eq!(session.state, State::Input);
        assert_eq!(effect, Effect::None);
        assert!(!session.verbose);
    }

    #[test]
    fn test_starts_loading_with_prompt() {
        let (session, effect) =
            Session::new(Some("list all files".to_string()), true, Action::Execute);
        assert_eq!(session.state, State::Loading);
        assert_eq!(effect, Effect::Generate("list all files".to_string()));
        assert_eq!(session.input.value(), "list all files");
        assert_eq!(session.prompt, "list all files");
        assert!(session.verbose);
    }

    #[test]
    fn test_blank_initial_prompt_stays_in_input() {
        let (session, effect) = Session::new(Some("   ".to_string()), false, Action::Execute);
        assert_eq!(session.state, State::Input);
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn test_empty_submit_stays_in_input() {
        let mut session = empty_session();
        assert_eq!(update(&mut session, press(KeyCode::Enter)), Effect::None);
        assert_eq!(session.state, State::Input);

        type_text(&mut session, "  \t ");
        assert_eq!(update(&mut session, press(KeyCode::Enter)), Effect::None);
        assert_eq!(session.state, State::Input);
    }

    #[test]
    fn test_typing_edits_buffer() {
        let mut session = empty_session();
        type_text(&mut session, "lsx");
        update(&mut session, press(KeyCode::Backspace));
        assert_eq!(session.input.value(), "ls");
        assert_eq!(session.state, State::Input);
    }

    #[test]
    fn test_successful_generation_shows_command() {
        let session = result_session();
        assert_eq!(session.state, State::Result);
        assert_eq!(session.generated_command.as_deref(), Some("ls -la"));
        assert!(session.last_error.is_none());
        assert_eq!(session.prompt, "list files");
        assert!(session.full_prompt.as_deref().unwrap().ends_with("User: list files"));
    }

    #[test]
    fn test_keys_ignored_while_loading() {
        let mut session = empty_session();
        type_text(&mut session, "list files");
        update(&mut session, press(KeyCode::Enter));

        assert_eq!(update(&mut session, press(KeyCode::Enter)), Effect::None);
        assert_eq!(update(&mut session, press(KeyCode::Char('x'))), Effect::None);
        assert_eq!(session.state, State::Loading);
        assert_eq!(session.input.value(), "list files");
    }

    #[test]
    fn test_cancel_from_every_state() {
        let mut session = empty_session();
        assert_eq!(update(&mut session, ctrl_c()), Effect::Quit);

        let (mut session, _) = Session::new(Some("q".to_string()), false, Action::Execute);
        assert_eq!(update(&mut session, press(KeyCode::Esc)), Effect::Quit);

        let mut session = result_session();
        assert_eq!(update(&mut session, ctrl_c()), Effect::Quit);

        let mut session = result_session();
        update(&mut session, press(KeyCode::Char('e')));
        assert_eq!(session.state, State::Edit);
        assert_eq!(update(&mut session, press(KeyCode::Esc)), Effect::Quit);
    }

    #[test]
    fn test_enter_confirms_with_default_action() {
        let mut session = result_session();
        assert_eq!(
            update(&mut session, press(KeyCode::Enter)),
            Effect::Confirm(Action::Execute, "ls -la".to_string())
        );

        let mut session = Session::new(None, false, Action::Copy).0;
        type_text(&mut session, "list files");
        update(&mut session, press(KeyCode::Enter));
        update(&mut session, completed("ls -la"));
        assert_eq!(
            update(&mut session, press(KeyCode::Enter)),
            Effect::Confirm(Action::Copy, "ls -la".to_string())
        );
    }

    #[test]
    fn test_c_copies() {
        let mut session = result_session();
        assert_eq!(
            update(&mut session, press(KeyCode::Char('c'))),
            Effect::Confirm(Action::Copy, "ls -la".to_string())
        );
    }

    #[test]
    fn test_edit_preserves_prompt() {
        let mut session = result_session();
        assert_eq!(update(&mut session, press(KeyCode::Char('e'))), Effect::None);
        assert_eq!(session.state, State::Edit);
        assert_eq!(session.input.value(), "list files");
        assert!(session.generated_command.is_none());
    }

    #[test]
    fn test_edit_and_resubmit() {
        let mut session = result_session();
        update(&mut session, press(KeyCode::Char('e')));
        type_text(&mut session, " recursively");
        assert_eq!(
            update(&mut session, press(KeyCode::Enter)),
            Effect::Generate("list files recursively".to_string())
        );
        assert_eq!(session.state, State::Loading);

        update(&mut session, completed("ls -laR"));
        assert_eq!(session.generated_command.as_deref(), Some("ls -laR"));
        assert_eq!(session.state, State::Result);
    }

    #[test]
    fn test_edit_with_cleared_prompt_cannot_submit() {
        let mut session = result_session();
        update(&mut session, press(KeyCode::Char('e')));
        for _ in 0.."list files".len() {
            update(&mut session, press(KeyCode::Backspace));
        }
        assert_eq!(update(&mut session, press(KeyCode::Enter)), Effect::None);
        assert_eq!(session.state, State::Edit);
    }

    #[test]
    fn test_other_key_exits_without_action() {
        for code in [KeyCode::Char('x'), KeyCode::Char('q'), KeyCode::Tab, KeyCode::Up] {
            let mut session = result_session();
            assert_eq!(update(&mut session, press(code)), Effect::Quit);
        }
    }

    #[test]
    fn test_generation_error_only_offers_quit() {
        let mut session = empty_session();
        type_text(&mut session, "list files");
        update(&mut session, press(KeyCode::Enter));
        update(&mut session, failed("Failed to connect to Anthropic API"));

        assert_eq!(session.state, State::Result);
        assert!(session.last_error.is_some());
        assert!(session.generated_command.is_none());

        for code in [KeyCode::Enter, KeyCode::Char('e'), KeyCode::Char('c')] {
            let mut s = session.clone();
            assert_eq!(update(&mut s, press(code)), Effect::Quit);
        }
    }

    #[test]
    fn test_resubmit_clears_error() {
        let mut session = result_session();
        update(&mut session, press(KeyCode::Char('e')));
        session.last_error = Some("stale".to_string());

        update(&mut session, press(KeyCode::Enter));
        assert_eq!(session.state, State::Loading);
        assert!(session.last_error.is_none());
        assert!(session.generated_command.is_none());
    }

    #[test]
    fn test_completion_outside_loading_ignored() {
        let mut session = empty_session();
        update(&mut session, completed("rm -rf ~"));
        assert_eq!(session.state, State::Input);
        assert!(session.generated_command.is_none());
    }

    #[test]
    fn test_key_release_ignored() {
        let mut session = result_session();
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('x'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(update(&mut session, Event::Key(release)), Effect::None);
        assert_eq!(session.state, State::Result);
    }

    #[test]
    fn test_tick_advances_spinner_only_while_loading() {
        let mut session = empty_session();
        update(&mut session, Event::Tick);
        assert_eq!(session.spinner_frame, 0);

        type_text(&mut session, "q");
        update(&mut session, press(KeyCode::Enter));
        update(&mut session, Event::Tick);
        update(&mut session, Event::Tick);
        assert_eq!(session.spinner_frame, 2);
    }
}
