//! clippycli - turn a natural-language request into a shell command.
//!
//! Shows a small TUI, asks the configured model for a single command, then
//! runs it or copies it to the clipboard once the user confirms.

mod config;
mod context;
mod error;
mod executor;
mod llm;
mod logging;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use executor::Action;
use llm::{Backend, CommandGenerator};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "clippycli")]
#[command(author, version, about = "AI command generator for your terminal")]
#[command(after_help = "Examples:\n  \
    clippycli                        Interactive mode\n  \
    clippycli list all files         Quick mode with auto-generation\n  \
    clippycli -v find large files    Also show the text sent to the model\n\n\
Environment Variables:\n  \
    ANTHROPIC_API_KEY                Required for the anthropic backend (default)\n  \
    OPENAI_API_KEY                   Required for the openai backend\n  \
    CLIPPYCLI_LOG                    Log filter, e.g. clippycli=debug")]
struct Cli {
    /// Show the full text sent to the model
    #[arg(short, long)]
    verbose: bool,

    /// Override the configured model
    #[arg(short, long, value_name = "MODEL")]
    model: Option<String>,

    /// Make Enter copy the command instead of running it
    #[arg(long)]
    copy: bool,

    /// Internal: hold the clipboard selection for a copied command
    #[arg(long = "clipboard-serve", hide = true)]
    clipboard_serve: bool,

    /// What you want to do; generation starts right away when given
    #[arg(value_name = "PROMPT", trailing_var_arg = true)]
    prompt: Vec<String>,
}

impl Cli {
    fn initial_prompt(&self) -> Option<String> {
        (!self.prompt.is_empty()).then(|| self.prompt.join(" "))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.clipboard_serve {
        return executor::serve_clipboard();
    }
    let _log_guard = logging::init();

    let mut config = config::Config::load().context("Failed to load configuration")?;
    if let Some(model) = cli.model.clone() {
        config.backend.set_model(model);
    }

    // Fail before the TUI takes over the terminal.
    let api_key = config
        .backend
        .resolve_api_key(|var| std::env::var(var).ok())?;

    let confirm_action = if cli.copy {
        Action::Copy
    } else {
        config.preferences.confirm_action
    };

    let ctx = context::gather_context();
    let system_prompt = config.build_system_prompt(&ctx);
    let backend = Backend::new(&config.backend, api_key)?;
    let generator = Arc::new(CommandGenerator::new(backend, system_prompt));

    let (session, initial) = tui::Session::new(cli.initial_prompt(), cli.verbose, confirm_action);
    let theme = tui::Theme::default();

    let outcome = tui::run(session, initial, generator, &theme).await?;
    finish(outcome);
    Ok(())
}

/// Carry out the confirmed action. Failures go to stderr and still exit 0.
fn finish(outcome: tui::Outcome) {
    let (action, command) = match outcome {
        tui::Outcome::Quit => {
            info!("Exited without action");
            return;
        }
        tui::Outcome::Confirm(action, command) => (action, command),
    };

    if action == Action::Execute {
        eprintln!("$ {}", command);
    }

    match executor::perform(action, &command) {
        Ok(()) if action == Action::Copy => {
            println!("{}", command);
            println!("✓ Copied to clipboard");
        }
        Ok(()) => {}
        Err(e) => {
            tracing::warn!("{}", e);
            eprintln!("Error: {}", e);
        }
    }
}
