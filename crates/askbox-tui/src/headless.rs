//! Headless driver for the chat screen.
//!
//! Runs the same `App` and draw code as the terminal front end, but on a
//! `TestBackend`. Actions go in over a channel; after every frame the
//! rendered text and a few session facts are published on a watch channel.

use crate::app::{App, InFlight};
use crate::event::Action;
use askbox_engine::{AskClient, Config};
use ratatui::{
    backend::TestBackend,
    buffer::{Buffer, Cell},
    Terminal,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Screen size used unless [`HeadlessConfig`] says otherwise.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// Snapshot published after each frame.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Rendered screen, see [`buffer_to_string`].
    pub screen_contents: String,
    /// Whether the TUI should quit.
    pub should_quit: bool,
    /// Whether a request is outstanding.
    pub busy: bool,
    /// Number of user and bot messages in the transcript.
    pub message_count: usize,
    /// Current content of the input line.
    pub input: String,
}

/// Controls a running headless chat.
pub struct HeadlessHandle {
    action_tx: mpsc::UnboundedSender<Action>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Queue an action. `false` once the TUI task has ended.
    pub fn send_action(&self, action: Action) -> bool {
        self.action_tx.send(action).is_ok()
    }

    /// Type a string into the input, one character at a time.
    pub fn type_text(&self, text: &str) -> bool {
        text.chars().all(|c| self.send_action(Action::Insert(c)))
    }

    /// The most recently published snapshot.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until `condition` holds for the latest state.
    ///
    /// Returns that state, or `None` if it did not happen within `timeout`
    /// or the TUI task has ended without reaching it.
    pub async fn wait_for<F>(
        &mut self,
        condition: F,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState>
    where
        F: FnMut(&HeadlessState) -> bool,
    {
        let state = tokio::time::timeout(timeout, self.state_rx.wait_for(condition))
            .await
            .ok()?
            .ok()?;
        Some((*state).clone())
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(
        &mut self,
        text: &str,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState> {
        let text = text.to_string();
        self.wait_for(|s| s.screen_contents.contains(&text), timeout)
            .await
    }

    /// Whether the last snapshot was taken after a quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Screen size and tick rate of a headless run.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 50, // Faster tick rate for testing
        }
    }
}

/// Run the TUI in headless mode against `client`.
///
/// Returns a handle to control the TUI and a join handle for the background task.
///
/// # Example
///
/// ```ignore
/// let config = Config::default();
/// let (mut handle, task) = run_tui_headless(&config, client, HeadlessConfig::default());
///
/// handle.type_text("hello");
/// handle.send_action(Action::Submit);
///
/// let state = handle.wait_for_text("Typing...", Duration::from_secs(1)).await;
///
/// handle.send_action(Action::Quit);
/// task.await.unwrap();
/// ```
pub fn run_tui_headless(
    app_config: &Config,
    client: Arc<dyn AskClient>,
    config: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let app = App::new(app_config);

    let task = tokio::spawn(async move {
        run_headless_loop(app, client, config, action_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    let handle = HeadlessHandle {
        action_tx,
        state_rx,
    };

    (handle, task)
}

async fn run_headless_loop(
    mut app: App,
    client: Arc<dyn AskClient>,
    config: HeadlessConfig,
    mut action_rx: mpsc::UnboundedReceiver<Action>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = TestBackend::new(config.width, config.height);
    let mut terminal = Terminal::new(backend)?;

    let mut in_flight: Option<InFlight> = None;
    let tick_duration = std::time::Duration::from_millis(config.tick_rate_ms);

    loop {
        crate::draw(&mut terminal, &mut app)?;

        let screen_contents = buffer_to_string(terminal.backend().buffer());
        let _ = state_tx.send(HeadlessState {
            screen_contents,
            should_quit: app.should_quit,
            busy: app.session.is_busy(),
            message_count: app.session.transcript().messages().count(),
            input: app.input.content().to_string(),
        });

        if app.should_quit {
            if let Some(task) = in_flight.take() {
                task.abort();
            }
            break;
        }

        crate::reap(&mut app, &mut in_flight).await;

        // Wait for action or tick
        let action = tokio::select! {
            Some(action) = action_rx.recv() => action,
            () = tokio::time::sleep(tick_duration) => {
                app.tick();
                Action::None
            }
        };

        crate::apply_action(&mut app, action, &client, &mut in_flight);
    }

    Ok(())
}

/// Render a buffer as text: one line per row, trailing spaces trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let width = usize::from(buffer.area.width.max(1));
    buffer
        .content
        .chunks(width)
        .map(|row| {
            let line: String = row.iter().map(Cell::symbol).collect();
            line.trim_end_matches(' ').to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
