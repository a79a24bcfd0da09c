//! TUI rendering: orchestrates all panes.

pub mod navigator;
pub mod section;

use chrono::Local;
use ecclesia_core::{notify::NoticeKind, store::DataService};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Mode};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S: DataService + 'static>(f: &mut Frame, app: &App<S>) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
    .split(rows[1]);
  navigator::draw(f, cols[0], app);
  section::draw(f, cols[1], app);

  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<S: DataService + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let date = Local::now().format("%Y-%m-%d").to_string();
  let crumb = app.breadcrumb();

  let left = Span::styled(
    " ecclesia ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let middle = Span::styled(format!(" {crumb}"), Style::default().fg(Color::Gray));
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::DarkGray));

  let used = left.width() + middle.width() + right.width();
  let pad = (area.width as usize).saturating_sub(used);

  let line = Line::from(vec![left, middle, Span::raw(" ".repeat(pad)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S: DataService + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (mode_label, hints) = match &app.mode {
    Mode::Normal => (
      "NORMAL",
      "↑↓ move  Enter open  Esc up  Tab section  / search  a add  x delete  r refresh  q quit"
        .to_owned(),
    ),
    Mode::Filter => ("SEARCH", "Type to filter  Enter keep  Esc clear".to_owned()),
    Mode::Create { name } => (
      "ADD",
      format!("New {} name: {name}_", app.level.kind()),
    ),
    Mode::ConfirmDelete(entry) => (
      "DELETE",
      format!("Delete {} {:?}? y to confirm, any other key cancels", app.level.kind(), entry.name),
    ),
  };

  let notice = match &app.mode {
    Mode::Normal => app.status.current(),
    _ => None,
  };
  let (text, colour) = match notice {
    Some((NoticeKind::Error, message)) => (message, Color::Red),
    Some((NoticeKind::Success, message)) => (message, Color::Green),
    Some((NoticeKind::Info, message)) => (message, Color::Gray),
    None => (hints, Color::DarkGray),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let text_span = Span::styled(format!("  {text}"), Style::default().fg(colour));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, text_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}
