//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Nothing in this module mutates
//! anything but the list's scroll offset and the detail sheet's scroll bound.
//!
//! ## For contributors
//!
//! * Layout, top to bottom: search box, source tabs, body, one-line status bar.
//!   The body is the loading skeleton, the error banner, the empty state or
//!   the entry list, depending on [`LoadState`] and the filtered count.
//! * The detail sheet is drawn last, over a cleared centred area.  Mouse
//!   hit-testing uses the same [`detail_area`].
//! * Colours are inline; novels are magenta and summaries cyan everywhere.

use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, LoadState};
use crate::filter::SourceFilter;
use crate::source::{Entry, Source};

const PREVIEW_CHARS: usize = 120;
const SKELETON_ROWS: usize = 4;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [search_area, tabs_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_search(app, frame, search_area);
    draw_tabs(app, frame, tabs_area);

    match &app.load {
        LoadState::Loading => draw_skeleton(frame, body_area),
        LoadState::Failed(err) => {
            let hint = if err.is_retryable() { "press r to retry" } else { "set SUPABASE_URL and SUPABASE_ANON_KEY" };
            draw_banner(frame, body_area, &format!("❌ {err}"), Some(hint), Color::Red);
        }
        LoadState::Loaded if app.visible_len() == 0 => {
            draw_banner(frame, body_area, "No entries found.", None, Color::Gray);
        }
        LoadState::Loaded => draw_entry_list(app, frame, body_area),
    }

    draw_status_bar(app, frame, status_area);

    let screen = frame.area();
    let detail_max = app
        .selected()
        .map(|entry| draw_detail(entry, app.detail_scroll, frame, screen));
    if let Some(max) = detail_max {
        app.set_detail_scroll_max(max);
    }
}

/// Where the detail sheet sits on a `screen`-sized terminal.
pub fn detail_area(screen: Rect) -> Rect {
    let [sheet] = Layout::horizontal([Constraint::Percentage(85)]).flex(Flex::Center).areas(screen);
    let [sheet] = Layout::vertical([Constraint::Percentage(85)]).flex(Flex::Center).areas(sheet);
    sheet
}

fn source_color(source: Source) -> Color {
    match source {
        Source::Summary => Color::Cyan,
        Source::Novel => Color::Magenta,
    }
}

fn badge(source: Source) -> Span<'static> {
    Span::styled(
        format!(" {} ", source.badge()),
        Style::default()
            .fg(Color::Black)
            .bg(source_color(source))
            .add_modifier(Modifier::BOLD),
    )
}

fn tags_line(tags: &[String]) -> Line<'static> {
    Line::from(
        tags.iter()
            .map(|t| Span::styled(format!("#{t} "), Style::default().fg(Color::Blue)))
            .collect::<Vec<_>>(),
    )
}

/// First line of `content`, cut to [`PREVIEW_CHARS`] characters.
fn preview(content: &str) -> String {
    let first = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if first.chars().count() > PREVIEW_CHARS {
        let cut: String = first.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}…")
    } else {
        first.to_string()
    }
}

fn draw_search(app: &App, frame: &mut Frame, area: Rect) {
    let (text, style) = if app.query.is_empty() && !app.editing_query {
        ("Search memories… (/)", Style::default().fg(Color::DarkGray))
    } else {
        (app.query.as_str(), Style::default().fg(Color::White))
    };

    let border = if app.editing_query {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let search = Paragraph::new(Span::styled(text, style)).block(
        Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_style(border),
    );
    frame.render_widget(search, area);

    if app.editing_query && app.selected().is_none() {
        // Display columns, not chars: CJK and emoji take two cells.
        let width = u16::try_from(Line::from(app.query.as_str()).width()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(width);
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y.saturating_add(1)));
    }
}

fn draw_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let tabs = Tabs::new(SourceFilter::TABS.iter().map(|f| f.label()))
        .select(app.source_filter.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("|");
    frame.render_widget(tabs, area);
}

/// Placeholder rows while the first response is outstanding.
fn draw_skeleton(frame: &mut Frame, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::with_capacity(SKELETON_ROWS * 3);
    for _ in 0..SKELETON_ROWS {
        lines.push(Line::styled("░░░░░░░░░░  ░░░░░", dim));
        lines.push(Line::styled("░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░", dim));
        lines.push(Line::raw(""));
    }

    let skeleton = Paragraph::new(lines).block(Block::default().title(" Loading… ").borders(Borders::ALL));
    frame.render_widget(skeleton, area);
}

/// Centred message in the body, used for errors and the empty state.
fn draw_banner(frame: &mut Frame, area: Rect, message: &str, hint: Option<&str>, color: Color) {
    let mut lines = vec![Line::raw(""), Line::styled(message.to_string(), Style::default().fg(color))];
    if let Some(hint) = hint {
        lines.push(Line::raw(""));
        lines.push(Line::styled(hint.to_string(), Style::default().fg(Color::DarkGray)));
    }

    let banner = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(banner, area);
}

fn draw_entry_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .visible()
        .map(|entry| {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(format!("{:<11}", entry.date_label()), Style::default().fg(Color::DarkGray)),
                    badge(entry.source),
                    Span::raw(" "),
                    Span::styled(entry.title.clone(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                ]),
                Line::styled(preview(&entry.content), Style::default().fg(Color::Gray)),
            ];
            if !entry.tags.is_empty() {
                lines.push(tags_line(&entry.tags));
            }
            lines.push(Line::raw(""));
            ListItem::new(Text::from(lines))
        })
        .collect();

    let list = List::new(list_items)
        .block(Block::default().title(" Entries ").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// The detail sheet for the open entry.
///
/// Returns the largest scroll offset that still leaves the last wrapped line
/// inside the sheet; `scroll` is clamped to it before rendering.
fn draw_detail(entry: &Entry, scroll: u16, frame: &mut Frame, area: Rect) -> u16 {
    let sheet = detail_area(area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(entry.date_label(), Style::default().fg(Color::DarkGray)),
            Span::raw("  "),
            badge(entry.source),
        ]),
        Line::raw(""),
    ];
    if let Some(url) = &entry.image_url {
        lines.push(Line::styled(format!("🖼 {url}"), Style::default().fg(Color::Blue)));
        lines.push(Line::raw(""));
    }
    lines.extend(Text::raw(entry.content.as_str()).lines);
    if !entry.tags.is_empty() {
        lines.push(Line::raw(""));
        lines.push(tags_line(&entry.tags));
    }

    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(format!(" {} ", entry.title))
                .title_bottom(Line::from(" Esc/q: close  j/k: scroll ").right_aligned())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(source_color(entry.source))),
        );

    let rows = body.line_count(sheet.width);
    let max = u16::try_from(rows.saturating_sub(usize::from(sheet.height))).unwrap_or(u16::MAX);
    let body = body.scroll((scroll.min(max), 0));

    frame.render_widget(Clear, sheet);
    frame.render_widget(body, sheet);
    max
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(app.status.as_str(), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{}/{} entries", app.visible_len(), app.feed.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  /: search  Tab: source  Enter: open  r: refresh"),
    ]));
    frame.render_widget(status, area);
}

// ---------------------------------------------------------------------------
// Tests (rendering smoke tests)
// ---------------------------------------------------------------------------
