use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let mut lines = vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        key_line("o", 11, "Log out (clears captured list)"),
        Line::from(""),
        Line::from("Catalog tab:"),
        key_line("/", 11, "Edit search (Enter/Esc to stop editing)"),
        key_line("↑/↓ j/k", 5, "Select"),
        key_line("←/→ h/l", 5, "Previous/next page"),
        key_line("enter", 7, "Show details"),
        key_line("c", 11, "Capture/release selected"),
        key_line("r", 11, "Reload current page"),
        Line::from(""),
        Line::from("Captured tab:"),
        key_line("↑/↓ j/k", 5, "Select"),
        key_line("d", 11, "Release selected"),
        key_line("e", 11, "Export collection as JSON"),
        key_line("v", 11, "Export collection as CSV"),
        Line::from(""),
        Line::from("Session:"),
    ];
    lines.push(Line::from(vec![
        Span::raw("  Log in from a shell with "),
        Span::styled(
            "pokedex-cli login --email <email> --password <password>",
            Style::default().fg(Color::Cyan),
        ),
    ]));
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
