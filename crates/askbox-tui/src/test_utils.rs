//! Test utilities for askbox-tui rendering tests.

use crate::app::App;
use askbox_engine::Config;
use ratatui::{backend::TestBackend, Terminal};

pub use crate::headless::buffer_to_string;

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test terminal with custom dimensions.
pub fn create_test_terminal_sized(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Create a test app with the default configuration, already greeted.
pub fn create_test_app() -> App {
    App::new(&Config::default())
}

/// Draw the app on a test terminal and return the screen as text.
pub fn render_app_to_string(app: &mut App, width: u16, height: u16) -> String {
    let mut terminal = create_test_terminal_sized(width, height);
    crate::draw(&mut terminal, app).expect("Failed to draw");
    buffer_to_string(terminal.backend().buffer())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_terminal() {
        let terminal = create_test_terminal_sized(TEST_WIDTH, TEST_HEIGHT);
        let size = terminal.size().unwrap();
        assert_eq!(size.width, TEST_WIDTH);
        assert_eq!(size.height, TEST_HEIGHT);
    }

    #[test]
    fn test_render_default_size() {
        let mut app = create_test_app();
        let screen = render_app_to_string(&mut app, TEST_WIDTH, TEST_HEIGHT);
        assert_eq!(screen.lines().count(), usize::from(TEST_HEIGHT));
        assert!(screen.contains("[Enter] send"));
    }
}
