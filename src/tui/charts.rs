use crate::metrics;
use crate::model::PokemonDetail;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Highest base stat in the games; gauges are scaled against it.
const MAX_BASE_STAT: f64 = 255.0;

fn stat_color(v: u32) -> Color {
    match v {
        0..=49 => Color::Red,
        50..=79 => Color::Yellow,
        80..=109 => Color::Green,
        _ => Color::Cyan,
    }
}

/// Detail pane: facts on top, one gauge per base stat below.
pub fn draw_detail(area: Rect, f: &mut Frame, d: &PokemonDetail, captured: bool) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(format!("#{:04} {}", d.id, d.name));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(5),
                Constraint::Length(12),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(inner);

    let badge = if captured {
        Span::styled("● captured", Style::default().fg(Color::Green))
    } else {
        Span::styled("○ not captured", Style::default().fg(Color::Gray))
    };
    let facts = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Types: ", Style::default().fg(Color::Gray)),
            Span::raw(d.types.join(" / ")),
        ]),
        Line::from(vec![
            Span::styled("Height: ", Style::default().fg(Color::Gray)),
            Span::raw(d.height_display()),
            Span::styled("  Weight: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{} kg", d.weight_kg)),
        ]),
        Line::from(vec![
            Span::styled("Abilities: ", Style::default().fg(Color::Gray)),
            Span::raw(d.abilities.join(", ")),
        ]),
        Line::from(badge),
    ]);
    f.render_widget(facts, rows[0]);

    let labelled = d.stats.labelled();
    let gauge_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2); 6].as_ref())
        .split(rows[1]);
    for (i, (label, value)) in labelled.iter().enumerate() {
        let g = Gauge::default()
            .gauge_style(Style::default().fg(stat_color(*value)))
            .ratio((*value as f64 / MAX_BASE_STAT).clamp(0.0, 1.0))
            .label(format!("{label} {value}"));
        f.render_widget(g, gauge_rows[i]);
    }

    let s = metrics::stat_summary(&d.stats);
    let totals = Paragraph::new(Line::from(format!(
        "Total {}   Strong stats {}   Best {}",
        s.total, s.strong, s.max
    )));
    f.render_widget(totals, rows[2]);
}
