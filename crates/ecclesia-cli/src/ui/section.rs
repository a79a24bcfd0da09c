//! Section pane: the section tabs of the active entity and the view the
//! router picked for it.

use ecclesia_core::{
  aggregate::{DistrictOverview, RegionOverview, census_total, latest_census},
  asset::AssetOwner,
  directory::build_directory,
  org::{UNASSIGNED, UNSPECIFIED},
  query::QueryCache,
  report::ParishReport,
  section::{Route, sections_for},
  store::DataService,
};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Tabs, Wrap},
};

use crate::app::App;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the section pane into `area`.
pub fn draw<S: DataService + 'static>(f: &mut Frame, area: Rect, app: &App<S>) {
  let section = app.session.section();
  let block = Block::default()
    .title(format!(" {} {} ", section.icon(), section.label()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(2), Constraint::Min(0)])
    .split(inner);

  if let Some(active) = app.session.active() {
    let sections = sections_for(active.kind);
    let titles: Vec<_> = sections.iter().map(|s| format!("{} {}", s.icon(), s.label())).collect();
    let tabs = Tabs::new(titles)
      .select(sections.iter().position(|s| s == section).unwrap_or(0))
      .style(Style::default().fg(Color::DarkGray))
      .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, rows[0]);
  }

  let route = app.route();
  let lines = match pending(&app.cache, &route) {
    Some(line) => vec![line],
    None => {
      let mut lines = errors(&app.cache, &route);
      lines.extend(view(&app.cache, &route));
      lines
    }
  };
  f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), rows[1]);
}

// ─── Load state ───────────────────────────────────────────────────────────────

/// "Loading…" while any query of the view has neither data nor an error.
fn pending(cache: &QueryCache, route: &Route) -> Option<Line<'static>> {
  route
    .queries()
    .iter()
    .any(|key| cache.get(key).is_none() && cache.error(key).is_none())
    .then(|| dim("Loading…"))
}

/// Failed fetches. Whatever loaded before stays on screen below them.
fn errors(cache: &QueryCache, route: &Route) -> Vec<Line<'static>> {
  route
    .queries()
    .iter()
    .filter_map(|key| cache.error(key).map(|err| (key.label(), err)))
    .map(|(label, err)| {
      Line::styled(format!("Could not load {label}: {err}"), Style::default().fg(Color::Red))
    })
    .collect()
}

// ─── Views ────────────────────────────────────────────────────────────────────

fn dim(text: impl Into<String>) -> Line<'static> {
  Line::styled(text.into(), Style::default().fg(Color::DarkGray))
}

fn heading(text: impl Into<String>) -> Line<'static> {
  Line::styled(
    text.into(),
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
  )
}

fn field(label: &str, value: impl Into<String>) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{label:<16}"), Style::default().fg(Color::Cyan)),
    Span::raw(value.into()),
  ])
}

fn or_unassigned(value: &Option<String>) -> String {
  value.clone().unwrap_or_else(|| UNASSIGNED.to_owned())
}

fn view(cache: &QueryCache, route: &Route) -> Vec<Line<'static>> {
  match *route {
    Route::SelectPrompt => vec![dim("Select a region, district or parish and press Enter.")],
    Route::Placeholder(ref section) => {
      vec![dim(format!("{} is not yet available.", section.label()))]
    }
    Route::RegionOverview(id) => match cache.region_tree(id) {
      Some(tree) => region_overview(&RegionOverview::from_tree(tree)),
      None => vec![dim("Region not found.")],
    },
    Route::RegionDistricts(id) => match cache.region_tree(id) {
      Some(tree) => RegionOverview::from_tree(tree)
        .districts
        .iter()
        .map(|d| {
          Line::from(format!(
            "{:<24} {:<14} {:<24}",
            d.name,
            d.code,
            or_unassigned(&d.superintendent)
          ))
        })
        .collect(),
      None => vec![dim("Region not found.")],
    },
    Route::DistrictOverview(id) => match cache.district_tree(id) {
      Some(tree) => district_overview(&DistrictOverview::from_tree(tree)),
      None => vec![dim("District not found.")],
    },
    Route::DistrictParishes(id) => match cache.district_tree(id) {
      Some(tree) => DistrictOverview::from_tree(tree)
        .parishes
        .iter()
        .map(|p| {
          Line::from(format!(
            "{:<24} {:<14} {:<24}",
            p.name,
            p.code,
            or_unassigned(&p.pastor)
          ))
        })
        .collect(),
      None => vec![dim("District not found.")],
    },
    Route::ParishOverview(id) => parish_overview(cache, id),
    Route::ParishMembers(id) => {
      let members = cache.members(id);
      if members.is_empty() {
        return vec![dim("No members registered.")];
      }
      members
        .iter()
        .map(|m| {
          Line::from(format!(
            "{:<28} {:<14} {:<16} {}",
            m.full_name(),
            m.role.to_string(),
            m.phone.as_deref().unwrap_or(""),
            m.community.as_deref().unwrap_or(""),
          ))
        })
        .collect()
    }
    Route::ParishCensus(id) => {
      let census = cache.census(id);
      let mut lines: Vec<_> = latest_census(census)
        .into_iter()
        .map(|r| {
          Line::from(format!(
            "{:<24} {:>6}   as of {}",
            r.community, r.head_count, r.recorded_on
          ))
        })
        .collect();
      lines.push(Line::from(""));
      lines.push(field("Total", census_total(census).to_string()));
      lines.push(dim(format!(
        "{} records across {} communities",
        census.len(),
        cache.communities(id).len()
      )));
      lines
    }
    Route::ParishActivities(id) => {
      let activities = cache.activities(id);
      if activities.is_empty() {
        return vec![dim("No pastoral activity recorded.")];
      }
      activities
        .iter()
        .map(|a| {
          Line::from(format!(
            "{}  {:<24} {}",
            a.date,
            a.kind,
            a.location.as_deref().unwrap_or("")
          ))
        })
        .collect()
    }
    Route::ParishServices(id) => {
      let services = cache.services(id);
      if services.is_empty() {
        return vec![dim("No religious services scheduled.")];
      }
      services
        .iter()
        .map(|s| {
          Line::from(format!(
            "{:<10} {}  {}–{}  {:<24} {}",
            s.day.to_string(),
            s.date,
            s.starts_at.format("%H:%M"),
            s.ends_at.format("%H:%M"),
            s.name,
            s.location.as_deref().unwrap_or("")
          ))
        })
        .collect()
    }
    Route::ParishAssets(id) => {
      let assets = cache.assets(id);
      if assets.is_empty() {
        return vec![dim("No assets recorded.")];
      }
      assets
        .iter()
        .map(|a| {
          let owner = match a.owner() {
            AssetOwner::Parish => "parish".to_owned(),
            AssetOwner::Community(name) => name,
          };
          Line::from(format!(
            "{:<24} {:<12} {:<14} {:>12.2}  {}",
            a.designation,
            a.asset_type.as_str(),
            a.condition.to_string(),
            a.value,
            owner
          ))
        })
        .collect()
    }
    Route::ParishReport(id) => parish_report(cache, id),
    Route::Directory => {
      let entries = build_directory(cache.regions(), cache.all_districts(), cache.all_parishes());
      if entries.is_empty() {
        return vec![dim("No servants named yet.")];
      }
      entries
        .iter()
        .map(|e| {
          Line::from(format!(
            "{:<26} {:<24} {:<20} {}",
            e.full_name,
            e.role.to_string(),
            e.entity,
            e.region
          ))
        })
        .collect()
    }
    Route::ParishSettings(id) => match cache.parish(id) {
      Some(p) => vec![
        field("Name", p.name.clone()),
        field("Code", p.code.clone()),
        field("Pastor", or_unassigned(&p.pastor)),
        field("District", p.district_name.clone().unwrap_or_else(|| UNSPECIFIED.to_owned())),
        field("Region", p.region_name.clone().unwrap_or_else(|| UNSPECIFIED.to_owned())),
      ],
      None => vec![dim("Parish not found.")],
    },
  }
}

fn region_overview(o: &RegionOverview) -> Vec<Line<'static>> {
  let mut lines = vec![
    heading(format!("{}  {}", o.region.name, o.region.code)),
    field("Superintendent", or_unassigned(&o.region.superintendent)),
    field("Districts", o.district_count.to_string()),
    field("Parishes", o.parish_count.to_string()),
    field("Members", o.member_count.to_string()),
    Line::from(""),
  ];
  lines.extend(o.districts.iter().map(|d| {
    Line::from(format!(
      "{:<24} {:>4} parishes {:>7} members",
      d.name, d.parish_count, d.member_count
    ))
  }));
  lines
}

fn district_overview(o: &DistrictOverview) -> Vec<Line<'static>> {
  let mut lines = vec![
    heading(format!("{}  {}", o.district.name, o.district.code)),
    field("Region", o.district.region_label().to_owned()),
    field("Superintendent", or_unassigned(&o.district.superintendent)),
    field("Parishes", o.parish_count.to_string()),
    field("Members", o.member_count.to_string()),
    Line::from(""),
  ];
  lines.extend(
    o.parishes
      .iter()
      .map(|p| Line::from(format!("{:<24} {:>7} members", p.name, p.member_count))),
  );
  lines
}

fn parish_overview(cache: &QueryCache, id: uuid::Uuid) -> Vec<Line<'static>> {
  let Some(parish) = cache.parish(id) else {
    return vec![dim("Parish not found.")];
  };
  let census = cache.census(id);
  let mut lines = vec![
    heading(parish.breadcrumb()),
    field("Code", parish.code.clone()),
    field("Pastor", or_unassigned(&parish.pastor)),
    field("Members", cache.members(id).len().to_string()),
    field("Communities", cache.communities(id).len().to_string()),
    field("Congregation", census_total(census).to_string()),
    Line::from(""),
  ];
  lines.extend(
    latest_census(census)
      .into_iter()
      .map(|r| Line::from(format!("{:<24} {:>6}", r.community, r.head_count))),
  );
  lines
}

fn parish_report(cache: &QueryCache, id: uuid::Uuid) -> Vec<Line<'static>> {
  let report = ParishReport::compute(
    cache.members(id),
    cache.census(id),
    cache.services(id),
    cache.activities(id),
    cache.assets(id),
  );
  let title = cache
    .parish(id)
    .map(|p| p.breadcrumb())
    .unwrap_or_else(|| UNSPECIFIED.to_owned());

  let mut lines = vec![heading(title), field("Members", report.member_count.to_string())];
  lines.extend(
    report
      .roles
      .iter()
      .map(|(role, n)| field(&format!("  {role}"), n.to_string())),
  );
  for (community, n) in &report.communities {
    let name = community.as_deref().unwrap_or(UNASSIGNED);
    lines.push(field(&format!("  {name}"), n.to_string()));
  }
  lines.extend([
    field("Congregation", report.census_total.to_string()),
    field("Services", report.service_count.to_string()),
    field("Activities", report.activity_count.to_string()),
    field("Assets", report.asset_count.to_string()),
    field("Asset value", format!("{:.2}", report.asset_value)),
  ]);
  lines
}

#[cfg(test)]
mod tests {
  use ecclesia_core::{
    fetch::Fetched,
    notify::TracingNotifier,
    org::{Region, RegionTree},
    query::QueryKey,
    section::{Section, route},
    selection::{EntityKind, EntityRef},
  };
  use uuid::Uuid;

  use super::*;

  fn text(lines: &[Line]) -> String {
    lines
      .iter()
      .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
      .collect::<Vec<_>>()
      .join("\n")
  }

  #[test]
  fn placeholder_names_the_section() {
    let cache = QueryCache::new();
    let lines = view(&cache, &Route::Placeholder(Section::Finance));
    assert_eq!(text(&lines), "Finance is not yet available.");
  }

  #[test]
  fn pending_until_the_view_has_data() {
    let id = Uuid::new_v4();
    let entity = EntityRef { kind: EntityKind::Region, id };
    let route = route(&Section::Overview, Some(entity));
    let mut cache = QueryCache::new();
    let tickets = cache.focus(route.queries());
    assert!(pending(&cache, &route).is_some());

    let tree = RegionTree {
      region:    Region {
        id,
        name: "Bafing".into(),
        code: "REG-BAFIN2".into(),
        superintendent: None,
      },
      districts: None,
    };
    let ticket = tickets
      .into_iter()
      .find(|t| t.key == QueryKey::RegionTree(id))
      .unwrap();
    cache.apply::<String>(
      ticket,
      Ok(Fetched::RegionTree(Some(tree))),
      &TracingNotifier,
    );
    assert!(pending(&cache, &route).is_none());

    let rendered = text(&view(&cache, &route));
    assert!(rendered.contains("Bafing"));
    assert!(rendered.contains("Unassigned"));
  }
}
