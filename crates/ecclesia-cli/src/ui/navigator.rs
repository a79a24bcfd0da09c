//! Navigator pane: the region, district or parish list on the left.

use ecclesia_core::store::DataService;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Mode};

/// Render the navigator list into `area`.
pub fn draw<S: DataService + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let entries = app.entries();
  let key = app.level.key();
  let filtering = app.mode == Mode::Filter || !app.filter.is_empty();

  let title = if app.cache.is_loading(&key) {
    format!(" {} (loading…) ", app.level.title())
  } else {
    format!(" {} ({}) ", app.level.title(), entries.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner = block.inner(area);
  f.render_widget(block, area);

  if filtering && inner.height > 2 {
    let filter_area = Rect { y: inner.y + inner.height - 1, height: 1, ..inner };
    inner.height -= 1;

    let text = if app.mode == Mode::Filter {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if let Some(err) = app.cache.error(&key)
    && entries.is_empty()
  {
    f.render_widget(
      Paragraph::new(format!("Could not load: {err}")).style(Style::default().fg(Color::Red)),
      inner,
    );
    return;
  }

  let active = app.session.active().map(|e| e.id);
  let items: Vec<ListItem> = entries
    .iter()
    .map(|entry| {
      let marker = if Some(entry.id) == active { "● " } else { "  " };
      ListItem::new(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::raw(entry.name.clone()),
        Span::styled(format!("  {}", entry.code), Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!entries.is_empty()).then_some(app.cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}
