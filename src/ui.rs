use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Row, Table, Wrap,
    },
    Frame,
};

use crate::{
    format::{self, BoundTag},
    state::{AppState, Panel},
    view::{DashboardView, Metric},
};

/// Width of the population bar in the ranked table.
const BAR_WIDTH: usize = 12;

pub fn draw(f: &mut Frame, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(3, 16),
            Constraint::Ratio(9, 16),
            Constraint::Ratio(4, 16),
        ])
        .split(f.area());

    draw_left(f, state, columns[0]);
    draw_center(f, &state.view, state, columns[1]);
    draw_right(f, &state.view, columns[2]);
}

fn list_style(state: &AppState, panel: Panel) -> (Style, Style) {
    let border = if state.active_panel == panel {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    (border, Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
}

fn draw_left(f: &mut Frame, state: &AppState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Length(state.themes.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(area);

    // Year list
    let (border, highlight) = list_style(state, Panel::Years);
    let items: Vec<ListItem> = state.years.iter().map(|y| ListItem::new(y.to_string())).collect();
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected_year));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).border_style(border).title("Year"))
        .highlight_symbol(">> ")
        .highlight_style(highlight);
    f.render_stateful_widget(list, rows[0], &mut list_state);

    // Theme list
    let (border, highlight) = list_style(state, Panel::Themes);
    let items: Vec<ListItem> = state.themes.iter().map(|t| ListItem::new(t.to_string())).collect();
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected_theme));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).border_style(border).title("Color theme"))
        .highlight_symbol(">> ")
        .highlight_style(highlight);
    f.render_stateful_widget(list, rows[1], &mut list_state);

    let metrics = Paragraph::new(metric_lines(&state.view))
        .block(Block::default().borders(Borders::ALL).title(AppState::HELP_TEXT))
        .wrap(Wrap { trim: true });
    f.render_widget(metrics, rows[2]);
}

fn delta_span(delta: Option<&str>) -> Span<'static> {
    match delta {
        Some(d) if d.starts_with('-') => Span::styled(format!("↓ {d}"), Style::default().fg(Color::Red)),
        Some(d) => Span::styled(format!("↑ {d}"), Style::default().fg(Color::Green)),
        None => Span::raw(""),
    }
}

fn metric_line(m: &Metric) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(m.label.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(vec![Span::raw(format!("{}  ", m.value)), delta_span(m.delta.as_deref())]),
    ]
}

fn bound_color(tag: BoundTag) -> Color {
    match tag {
        BoundTag::Below => Color::Red,
        BoundTag::AtOrAbove => Color::Green,
    }
}

fn metric_lines(view: &DashboardView) -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(Span::styled("Total Population", heading))];
    lines.extend(metric_line(&view.national));

    if let Some(band) = &view.band {
        lines.push(Line::from(vec![
            Span::raw("["),
            Span::styled(format::format_millions(band.lower.value), Style::default().fg(bound_color(band.lower.tag))),
            Span::raw(", "),
            Span::styled(format::format_millions(band.upper.value), Style::default().fg(bound_color(band.upper.tag))),
            Span::raw("]*"),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Extreme Prefecture Dynamics", heading)));
    match &view.movers {
        Some(movers) => {
            lines.extend(metric_line(&movers.grower));
            lines.extend(metric_line(&movers.shrinker));
        }
        None => {
            for _ in 0..2 {
                lines.push(Line::from("-"));
                lines.push(Line::from("-"));
            }
        }
    }
    lines
}

fn draw_center(f: &mut Frame, view: &DashboardView, state: &AppState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(45),
            Constraint::Min(0),
        ])
        .split(area);

    let heading = Paragraph::new(view.heading.clone())
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(heading, rows[0]);

    // Years sit on a category axis: one slot per point.
    let points: Vec<(f64, f64)> = view
        .trend
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.total as f64))
        .collect();
    let (lo, hi) = view.trend.total_bounds().unwrap_or((0, 1));
    let pad = ((hi - lo) as f64 * 0.05).max(1.0);
    let y_bounds = [lo as f64 - pad, hi as f64 + pad];
    let x_max = points.len().saturating_sub(1).max(1) as f64;

    let x_labels: Vec<String> = match (view.trend.points.first(), view.trend.points.last()) {
        (Some(first), Some(last)) if first.year != last.year => {
            let mid = &view.trend.points[view.trend.points.len() / 2];
            vec![first.year.to_string(), mid.year.to_string(), last.year.to_string()]
        }
        (Some(only), _) => vec![only.year.to_string()],
        _ => Vec::new(),
    };
    let y_labels: Vec<String> = [y_bounds[0], (y_bounds[0] + y_bounds[1]) / 2.0, y_bounds[1]]
        .iter()
        .map(|v| format::format_count(*v as i64))
        .collect();

    let dataset = Dataset::default()
        .name(view.trend.series_name)
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .block(Block::default().borders(Borders::ALL).title(view.trend.title))
        .x_axis(Axis::default().title(view.trend.x_title).bounds([0.0, x_max]).labels(x_labels))
        .y_axis(Axis::default().title(view.trend.y_title).bounds(y_bounds).labels(y_labels));
    f.render_widget(chart, rows[1]);

    let title = format!(
        "Prefectures Population Map ({}: 0 - {})",
        view.theme,
        format::format_count(view.max_population as i64)
    );
    state.dashboard.shapes.render(f, rows[2], &title, &view.choropleth);
}

fn bar(population: u64, max: u64) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((population as f64 / max as f64) * BAR_WIDTH as f64).round() as usize
    };
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn draw_right(f: &mut Frame, view: &DashboardView, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(view.about.len() as u16 * 2 + 2)])
        .split(area);

    let table_rows: Vec<Row> = view
        .ranked
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.prefecture.clone()),
                Cell::from(format!("{} {}", bar(r.population, view.max_population), r.population)),
            ])
        })
        .collect();
    let table = Table::new(table_rows, [Constraint::Percentage(35), Constraint::Percentage(65)])
        .header(
            Row::new(vec!["Prefecture", "Population"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Ranked Prefectures"));
    f.render_widget(table, rows[0]);

    let about: Vec<Line> = view.about.iter().map(|l| Line::from(format!("- {l}"))).collect();
    let about = Paragraph::new(about)
        .block(Block::default().borders(Borders::ALL).title("About"))
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    f.render_widget(about, rows[1]);
}
