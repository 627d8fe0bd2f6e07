//! Keyboard and mouse input handling.
//!
//! Maps terminal key events to [`Action`]s.  Which keys mean what depends on
//! where focus is: the search box, the detail sheet, or the list.  The mouse
//! only matters while the detail sheet is open.  The mapping is pure;
//! [`App::update`](crate::app::App::update) applies the result.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add an [`Action`] (and its handling in `App::update`) if one doesn't exist.
//! 2. Add a `KeyCode` match arm in the right `*_keys` function below.
//! 3. Update the help text in [`crate::ui`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::app::{Action, App};
use crate::filter::SourceFilter;
use crate::ui;

/// Translate a single key event into an action, if it means anything.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &App, key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    if app.selected().is_some() {
        detail_keys(key)
    } else if app.editing_query {
        search_keys(key)
    } else {
        list_keys(key)
    }
}

/// Translate a mouse event on a `screen`-sized terminal into an action.
///
/// A left click outside the open detail sheet closes it; the wheel scrolls it.
pub fn handle_mouse_event(app: &App, mouse: MouseEvent, screen: Rect) -> Option<Action> {
    app.selected()?;

    let inside = ui::detail_area(screen).contains(Position::new(mouse.column, mouse.row));
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if !inside => Some(Action::Close),
        MouseEventKind::ScrollDown if inside => Some(Action::ScrollDetail(3)),
        MouseEventKind::ScrollUp if inside => Some(Action::ScrollDetail(-3)),
        _ => None,
    }
}

fn search_keys(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => Some(Action::StopSearch),
        KeyCode::Backspace => Some(Action::SearchBackspace),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::SearchClear),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::SearchInput(c)),
        KeyCode::Tab => Some(Action::CycleFilter),
        KeyCode::Down => Some(Action::SelectNext),
        KeyCode::Up => Some(Action::SelectPrevious),
        _ => None,
    }
}

fn detail_keys(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('x') => Some(Action::Close),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDetail(1)),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollDetail(-1)),
        KeyCode::PageDown | KeyCode::Char(' ') => Some(Action::ScrollDetail(10)),
        KeyCode::PageUp => Some(Action::ScrollDetail(-10)),
        _ => None,
    }
}

fn list_keys(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('/') => Some(Action::StartSearch),
        KeyCode::Tab => Some(Action::CycleFilter),
        KeyCode::Char('1') => Some(Action::SetFilter(SourceFilter::All)),
        KeyCode::Char('2') => Some(Action::SetFilter(SourceFilter::Summary)),
        KeyCode::Char('3') => Some(Action::SetFilter(SourceFilter::Novel)),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectNext),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectPrevious),
        KeyCode::Home | KeyCode::Char('g') => Some(Action::SelectFirst),
        KeyCode::End | KeyCode::Char('G') => Some(Action::SelectLast),
        KeyCode::Enter => Some(Action::Open),
        KeyCode::Char('r') => Some(Action::Retry),
        _ => None,
    }
}
