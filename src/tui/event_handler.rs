use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::path::PathBuf;

use super::app::{App, AppMode};

/// Handle input in main mode
pub async fn handle_main_input(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        // Open a photo
        KeyCode::Char('o') | KeyCode::Char('i') | KeyCode::Char('/') => {
            if app.session.is_busy() {
                app.set_status("Wait for the current operation to finish");
            } else {
                app.mode = AppMode::Input;
                app.status_message = None;
            }
        }

        // Create the vintage look
        KeyCode::Char('e') | KeyCode::Enter => app.start_edit(),

        // Save the edited image
        KeyCode::Char('s') => {
            if let Err(e) = app.save_edited().await {
                tracing::error!("Failed to save image: {:?}", e);
                app.set_status(format!("Save failed: {}", e));
            }
        }

        // Quit
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
        }

        _ => {}
    }
    Ok(())
}

/// Handle input in path input mode
pub fn handle_input_mode(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => {
            app.mode = AppMode::Main;
            app.input.clear();
            app.cursor_pos = 0;
        }

        KeyCode::Enter => {
            let path = app.input.trim().to_string();
            if !path.is_empty() {
                app.input.clear();
                app.cursor_pos = 0;
                app.mode = AppMode::Main;
                app.start_select(expand_home(&path));
            }
        }

        KeyCode::Char(c) => {
            app.input.insert(byte_index(&app.input, app.cursor_pos), c);
            app.cursor_pos += 1;
        }

        KeyCode::Backspace => {
            if app.cursor_pos > 0 {
                app.cursor_pos -= 1;
                app.input.remove(byte_index(&app.input, app.cursor_pos));
            }
        }

        KeyCode::Delete => {
            if app.cursor_pos < app.input.chars().count() {
                app.input.remove(byte_index(&app.input, app.cursor_pos));
            }
        }

        KeyCode::Left => {
            if app.cursor_pos > 0 {
                app.cursor_pos -= 1;
            }
        }

        KeyCode::Right => {
            if app.cursor_pos < app.input.chars().count() {
                app.cursor_pos += 1;
            }
        }

        KeyCode::Home => {
            app.cursor_pos = 0;
        }

        KeyCode::End => {
            app.cursor_pos = app.input.chars().count();
        }

        _ => {}
    }
    Ok(())
}

/// Byte offset of the `cursor`-th character
fn byte_index(input: &str, cursor: usize) -> usize {
    input
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(input.len())
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), directories::BaseDirs::new()) {
        (Some(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ImageEditor;
    use crate::config::Config;
    use crate::core::{EditRequest, EditResult, VintageError};
    use async_trait::async_trait;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    struct NeverCalled;

    #[async_trait]
    impl ImageEditor for NeverCalled {
        async fn submit_edit(&self, _: &EditRequest) -> Result<EditResult, VintageError> {
            unreachable!("no edits in input tests")
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_handles_multibyte_characters() {
        let mut app = App::new(Config::default(), Arc::new(NeverCalled));
        app.mode = AppMode::Input;

        for c in "fötö.png".chars() {
            handle_input_mode(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        handle_input_mode(&mut app, key(KeyCode::Left)).unwrap();
        handle_input_mode(&mut app, key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.input, "fötö.pg");

        handle_input_mode(&mut app, key(KeyCode::Home)).unwrap();
        handle_input_mode(&mut app, key(KeyCode::Delete)).unwrap();
        assert_eq!(app.input, "ötö.pg");
    }

    #[test]
    fn escape_leaves_input_mode() {
        let mut app = App::new(Config::default(), Arc::new(NeverCalled));
        app.mode = AppMode::Input;
        app.input = "half typed".into();
        app.cursor_pos = 4;

        handle_input_mode(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.mode, AppMode::Main);
        assert!(app.input.is_empty());
        assert_eq!(app.cursor_pos, 0);
    }

    #[tokio::test]
    async fn quit_key_sets_flag() {
        let mut app = App::new(Config::default(), Arc::new(NeverCalled));
        handle_main_input(&mut app, key(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_home("photos/a.png"), PathBuf::from("photos/a.png"));
    }
}
