//! askbox-tui: Terminal chat widget for askbox
//!
//! This crate provides the TUI layer for askbox, including:
//! - The chat screen (message list, input line, status footer)
//! - Terminal rendering of converted bot replies
//! - Headless mode for testing and automation

mod app;
mod event;
pub mod headless;
#[cfg(test)]
pub mod test_utils;
mod text;
mod theme;
mod widgets;

pub use app::{App, InFlight};
pub use askbox_engine;
pub use event::{Action, Event, EventHandler};
pub use theme::Theme;
pub use widgets::TextInputState;

use askbox_engine::{AskClient, Config};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Frame, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use tracing::info;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop until the user quits, and
/// restores the terminal on exit.
pub async fn run_tui(
    config: &Config,
    client: Arc<dyn AskClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    info!(url = %config.ask_url(), "chat opened");

    // 4 Hz tick rate drives the spinner and notification expiry.
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events, client).await;

    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    client: Arc<dyn AskClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut in_flight: Option<InFlight> = None;

    loop {
        draw(terminal, app)?;

        let Some(event) = events.next().await else {
            break;
        };
        let action = match event {
            Event::Key(key) => event::key_to_action(key),
            Event::Mouse(mouse) => event::mouse_to_action(mouse),
            Event::Tick => {
                app.tick();
                Action::None
            }
            // Terminal will handle resize automatically
            Event::Resize(_, _) => Action::None,
            Event::Paste(text) => Action::Paste(text),
        };
        apply_action(app, action, &client, &mut in_flight);

        reap(app, &mut in_flight).await;

        if app.should_quit {
            if let Some(task) = in_flight.take() {
                task.abort();
            }
            break;
        }
    }

    info!("chat closed");
    Ok(())
}

/// Draw one frame of the chat screen.
pub(crate) fn draw<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    terminal.draw(|frame: &mut Frame<'_>| {
        let area = frame.area();
        widgets::render_chat(app, area, frame.buffer_mut());
    })?;
    Ok(())
}

/// Handle an action, spawning a request when it submitted a message.
pub(crate) fn apply_action(
    app: &mut App,
    action: Action,
    client: &Arc<dyn AskClient>,
    in_flight: &mut Option<InFlight>,
) {
    if let Some(pending) = app.handle_action(action) {
        *in_flight = Some(InFlight::spawn(Arc::clone(client), pending));
    }
}

/// Collect a finished request, if any, and apply its outcome.
pub(crate) async fn reap(app: &mut App, in_flight: &mut Option<InFlight>) {
    if !in_flight.as_ref().is_some_and(InFlight::is_finished) {
        return;
    }
    if let Some(task) = in_flight.take() {
        let (id, result) = task.join().await;
        app.finish(id, result);
    }
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}


#[cfg(test)]
mod snapshot_tests {
    use super::*;
    use crate::test_utils::*;
    use insta::assert_snapshot;

    /// Screen rows below the message header, which carries a wall-clock time.
    fn rows_after_first(screen: &str) -> String {
        screen.lines().skip(2).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_snapshot_opened_screen() {
        let mut app = create_test_app();
        let screen = render_app_to_string(&mut app, 48, 8);
        assert_snapshot!(rows_after_first(&screen), @r"
        │   Hi! How can I help you?                    │
        │                                              │
        │ ──────────────────────────────────────────── │
        │ > _                                          │
        └──────────────────────────────────────────────┘
        idle
        ");
    }
}
