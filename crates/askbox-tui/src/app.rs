//! Application state and update logic for the askbox TUI.

use std::sync::Arc;

use askbox_engine::{AskClient, AskError, ChatSession, Config, Effect, PendingAsk};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::event::Action;
use crate::theme::Theme;
use crate::widgets::TextInputState;

/// Rows moved by one page scroll.
pub const PAGE_SCROLL: usize = 10;

/// Ticks a notification stays visible (about 5s at 4 Hz).
const NOTIFICATION_TICKS: usize = 20;

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// The conversation and its submission state.
    pub session: ChatSession,

    /// Text input state for the message line.
    pub input: TextInputState,

    /// Color palette.
    pub theme: Theme,

    /// Rows scrolled up from the newest message (0 = pinned to bottom).
    pub scroll_back: usize,

    /// Whether the input has keyboard focus.
    pub input_focused: bool,

    /// Tick counter for animations.
    pub tick: usize,

    /// Notification message (displayed temporarily, cleared after some ticks).
    pub notification: Option<String>,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,
}

impl App {
    /// Create a new app with a freshly opened session.
    pub fn new(config: &Config) -> Self {
        let mut app = Self {
            should_quit: false,
            session: ChatSession::from_config(config),
            input: TextInputState::new(),
            theme: Theme::default(),
            scroll_back: 0,
            input_focused: false,
            tick: 0,
            notification: None,
            notification_ttl: 0,
        };
        app.session.open();
        app.apply_effects();
        app
    }

    /// Handle an action.
    ///
    /// Returns the request to dispatch when the action submitted a message.
    pub fn handle_action(&mut self, action: Action) -> Option<PendingAsk> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Clear => {
                self.session.reset();
                self.apply_effects();
            }
            Action::Submit => return self.submit(),
            Action::ScrollUp => self.scroll_back = self.scroll_back.saturating_add(1),
            Action::ScrollDown => self.scroll_back = self.scroll_back.saturating_sub(1),
            Action::PageUp => self.scroll_back = self.scroll_back.saturating_add(PAGE_SCROLL),
            Action::PageDown => self.scroll_back = self.scroll_back.saturating_sub(PAGE_SCROLL),
            Action::None => {}
            edit => self.edit_input(edit),
        }
        None
    }

    fn submit(&mut self) -> Option<PendingAsk> {
        let pending = self.session.submit(self.input.content())?;
        self.input.submit();
        self.apply_effects();
        Some(pending)
    }

    /// Line editing. The input is disabled while a reply is pending.
    fn edit_input(&mut self, action: Action) {
        if !self.session.input_enabled() {
            return;
        }
        match action {
            Action::Insert(c) => self.input.insert(c),
            Action::Paste(text) => {
                // Single-line input: pasted line breaks become spaces.
                let line = text.lines().collect::<Vec<_>>().join(" ");
                self.input.insert_str(&line);
            }
            Action::ClearInput => self.input.clear(),
            Action::Backspace => self.input.backspace(),
            Action::Delete => self.input.delete(),
            Action::Left => self.input.move_left(),
            Action::Right => self.input.move_right(),
            Action::Home => self.input.move_home(),
            Action::End => self.input.move_end(),
            Action::HistoryPrev => self.input.history_prev(),
            Action::HistoryNext => self.input.history_next(),
            _ => {}
        }
    }

    /// Apply the outcome of a dispatched request.
    ///
    /// Returns `false` when the result belongs to a request that is no longer
    /// outstanding.
    pub fn finish(&mut self, request_id: Uuid, result: Result<String, AskError>) -> bool {
        let error = result.as_ref().err().map(ToString::to_string);
        let applied = self.session.finish(request_id, result);
        if applied {
            if let Some(error) = error {
                self.set_notification(error);
            }
        }
        self.apply_effects();
        applied
    }

    /// Apply UI side effects queued by the session.
    pub fn apply_effects(&mut self) {
        for effect in self.session.take_effects() {
            match effect {
                Effect::ScrollToBottom => self.scroll_back = 0,
                Effect::FocusInput => self.input_focused = true,
            }
        }
    }

    /// Limit scrolling to the rendered content.
    pub fn clamp_scroll(&mut self, max: usize) {
        self.scroll_back = self.scroll_back.min(max);
    }

    fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Called on each tick event.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }
}

/// A request running on the async runtime.
#[derive(Debug)]
pub struct InFlight {
    /// Identifier of the request.
    pub id: Uuid,
    handle: JoinHandle<Result<String, AskError>>,
}

impl InFlight {
    /// Spawn a pending request against `client`.
    pub fn spawn(client: Arc<dyn AskClient>, pending: PendingAsk) -> Self {
        let id = pending.id;
        let handle =
            tokio::spawn(async move { askbox_engine::dispatch(client.as_ref(), &pending).await });
        debug!(request_id = %id, "request spawned");
        Self { id, handle }
    }

    /// Whether the task has completed.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task and return its outcome.
    pub async fn join(self) -> (Uuid, Result<String, AskError>) {
        let result = match self.handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!(request_id = %self.id, error = %e, "request task failed");
                Err(AskError::Interrupted(e.to_string()))
            }
        };
        (self.id, result)
    }

    /// Abort the task.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askbox_engine::{ChatState, TranscriptEntry};

    fn app() -> App {
        App::new(&Config::default())
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_action(Action::Insert(c));
        }
    }

    #[test]
    fn test_new_app_is_greeted_and_focused() {
        let app = app();
        assert_eq!(app.session.transcript().len(), 1);
        assert!(app.input_focused);
        assert_eq!(app.session.state(), ChatState::Idle);
    }

    #[test]
    fn test_submit_clears_input_and_returns_request() {
        let mut app = app();
        type_text(&mut app, "hello");

        let pending = app.handle_action(Action::Submit).unwrap();
        assert_eq!(pending.message, "hello");
        assert!(app.input.is_empty());
        assert!(app.session.is_busy());
    }

    #[test]
    fn test_blank_submit_keeps_input() {
        let mut app = app();
        type_text(&mut app, "   ");

        assert!(app.handle_action(Action::Submit).is_none());
        assert_eq!(app.input.content(), "   ");
        assert_eq!(app.session.transcript().len(), 1);
    }

    #[test]
    fn test_typing_ignored_while_busy() {
        let mut app = app();
        type_text(&mut app, "hi");
        app.handle_action(Action::Submit).unwrap();

        type_text(&mut app, "more");
        assert!(app.input.is_empty());
        assert!(app.handle_action(Action::Submit).is_none());
    }

    #[test]
    fn test_paste_joins_lines_at_cursor() {
        let mut app = app();
        type_text(&mut app, "ab");
        app.handle_action(Action::Left);
        app.handle_action(Action::Paste("one\ntwo\r\nthree".into()));

        assert_eq!(app.input.content(), "aone two threeb");
        assert_eq!(app.input.cursor, 14);
    }

    #[test]
    fn test_clear_input_keeps_transcript() {
        let mut app = app();
        type_text(&mut app, "draft");
        app.handle_action(Action::ClearInput);

        assert!(app.input.is_empty());
        assert_eq!(app.input.cursor, 0);
        assert_eq!(app.session.transcript().len(), 1);
    }

    #[test]
    fn test_paste_ignored_while_busy() {
        let mut app = app();
        type_text(&mut app, "hi");
        app.handle_action(Action::Submit).unwrap();

        app.handle_action(Action::Paste("later".into()));
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_finish_error_shows_fallback_and_notification() {
        let mut app = app();
        type_text(&mut app, "hi");
        let pending = app.handle_action(Action::Submit).unwrap();
        app.scroll_back = 5;

        assert!(app.finish(pending.id, Err(AskError::Timeout)));
        assert_eq!(app.scroll_back, 0);
        assert_eq!(app.notification.as_deref(), Some("Request timed out"));
        assert!(matches!(
            app.session.transcript().entries().last(),
            Some(TranscriptEntry::Message(_))
        ));

        for _ in 0..NOTIFICATION_TICKS {
            app.tick();
        }
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_stale_finish_ignored() {
        let mut app = app();
        assert!(!app.finish(Uuid::new_v4(), Err(AskError::Timeout)));
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_clear_resets_transcript() {
        let mut app = app();
        type_text(&mut app, "hi");
        let pending = app.handle_action(Action::Submit).unwrap();
        app.finish(pending.id, Ok("reply".into()));
        assert_eq!(app.session.transcript().len(), 3);

        app.handle_action(Action::Clear);
        assert_eq!(app.session.transcript().len(), 1);
    }

    #[test]
    fn test_scrolling() {
        let mut app = app();
        app.handle_action(Action::PageUp);
        app.handle_action(Action::ScrollUp);
        assert_eq!(app.scroll_back, PAGE_SCROLL + 1);

        app.clamp_scroll(4);
        assert_eq!(app.scroll_back, 4);

        app.handle_action(Action::PageDown);
        assert_eq!(app.scroll_back, 0);
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
