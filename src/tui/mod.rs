pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(anyhow::Error::from(e));
        }

        match events.next().await {
            Some(Event::Key(key)) => handle_key_event(&mut app, key),
            Some(Event::Tick) => app.update_flash(),
            None => break Ok(()),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    crate::stderr_buffer::flush();

    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => match key.code {
            // Quit
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.should_quit = true
            }

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

            // Editing
            KeyCode::Enter | KeyCode::Char('e') => app.start_edit(),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => app.step_selected(true),
            KeyCode::Char('-') | KeyCode::Left => app.step_selected(false),
            KeyCode::Char('R') => app.reset_inputs(),

            // Actions
            KeyCode::Char('p') => app.predict(),
            KeyCode::Char('s') => app.save(),
            KeyCode::Char('b') => app.show_breakdown(),
            KeyCode::Char('?') => app.show_help(),

            _ => {}
        },
        app::InputMode::Editing => match key.code {
            KeyCode::Enter => app.confirm_edit(),
            KeyCode::Esc => app.cancel_edit(),
            KeyCode::Backspace => {
                app.edit_buffer.pop();
            }
            // Numbers and sex labels
            KeyCode::Char(c) if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | 'e') => {
                app.edit_buffer.push(c);
            }
            // Ignore all other keys (don't propagate to Normal mode)
            _ => {}
        },
        app::InputMode::Breakdown => match key.code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('q') => app.dismiss_overlay(),
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_overlay();
        }
    }
}
