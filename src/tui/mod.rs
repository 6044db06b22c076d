//! Interactive terminal UI.
//!
//! - `controller`: the Input → Loading → Result → Edit state machine
//! - `view`: ratatui rendering of each state
//! - `runtime`: terminal setup and the async event loop

pub mod controller;
pub mod runtime;
pub mod view;

pub use controller::Session;
pub use runtime::{run, Outcome};
pub use view::Theme;
