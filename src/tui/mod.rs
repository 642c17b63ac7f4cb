mod charts;
mod export;
mod help;
mod state;

use crate::metrics;
use crate::model::{CapturedEntity, CatalogConfig, CatalogEvent, PageStatus};
use crate::orchestrator::{self, Coordinator, UiCommand};
use crate::source::{CatalogSource, PokeApiClient};
use crate::store::session::SessionState;
use crate::store::CaptureStore;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Terminal,
};
use state::{apply_event, catalog_title, UiState, TAB_CAPTURED, TAB_CATALOG, TAB_HELP};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub async fn run(cfg: CatalogConfig, store: CaptureStore) -> Result<()> {
    let source: Arc<dyn CatalogSource> = Arc::new(PokeApiClient::new(&cfg)?);
    let coord = Coordinator::new(source, &cfg);

    let (event_tx, event_rx) = mpsc::unbounded_channel::<CatalogEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(store, event_rx, cmd_tx));

    let res = orchestrator::run_controller(coord, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread. The capture store is owned here.
fn run_threaded(
    mut store: CaptureStore,
    mut event_rx: UnboundedReceiver<CatalogEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState {
        info: match store.session() {
            SessionState::Authenticated(u) => format!("Welcome back, {}", u.name),
            _ => "Browsing as guest. Press ? for keys.".into(),
        },
        ..Default::default()
    };

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state, &store)).ok();
            last_tick = Instant::now();
        }

        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }

                if state.search_editing {
                    match k.code {
                        KeyCode::Enter | KeyCode::Esc => state.search_editing = false,
                        KeyCode::Backspace => {
                            state.search_input.pop();
                            let _ = cmd_tx.send(UiCommand::Search(state.search_input.clone()));
                        }
                        KeyCode::Char(c) if !k.modifiers.contains(KeyModifiers::CONTROL) => {
                            state.search_input.push(c);
                            let _ = cmd_tx.send(UiCommand::Search(state.search_input.clone()));
                        }
                        _ => {}
                    }
                    continue;
                }

                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Tab) => {
                        state.tab = (state.tab + 1) % 3;
                    }
                    (_, KeyCode::Char('?')) => {
                        state.tab = TAB_HELP;
                    }
                    (_, KeyCode::Char('/')) => {
                        state.tab = TAB_CATALOG;
                        state.search_editing = true;
                    }
                    (_, KeyCode::Esc) if state.tab == TAB_CATALOG => {
                        if !state.search_input.is_empty() {
                            state.search_input.clear();
                            let _ = cmd_tx.send(UiCommand::Search(String::new()));
                        }
                    }
                    (_, KeyCode::Up) | (_, KeyCode::Char('k')) => {
                        if state.tab == TAB_CAPTURED {
                            state.captured_selected = state.captured_selected.saturating_sub(1);
                        } else {
                            state.select_prev();
                        }
                    }
                    (_, KeyCode::Down) | (_, KeyCode::Char('j')) => {
                        if state.tab == TAB_CAPTURED {
                            state.captured_selected += 1;
                            state.clamp_captured_selection(store.captured().len());
                        } else {
                            state.select_next();
                        }
                    }
                    (_, KeyCode::Left) | (_, KeyCode::Char('h')) if state.tab == TAB_CATALOG => {
                        let _ = cmd_tx.send(UiCommand::PrevPage);
                    }
                    (_, KeyCode::Right) | (_, KeyCode::Char('l')) if state.tab == TAB_CATALOG => {
                        let _ = cmd_tx.send(UiCommand::NextPage);
                    }
                    (_, KeyCode::Enter) if state.tab == TAB_CATALOG => {
                        if let Some(id) = state.selected_entry().map(|e| e.id) {
                            state.detail_loading = Some(id);
                            let _ = cmd_tx.send(UiCommand::Detail(id));
                        }
                    }
                    (_, KeyCode::Char('r')) if state.tab == TAB_CATALOG => {
                        let _ = cmd_tx.send(UiCommand::Refresh);
                        state.info = "Reloading…".into();
                    }
                    (_, KeyCode::Char('c')) if state.tab == TAB_CATALOG => {
                        state.info = toggle_selected(&state, &mut store);
                    }
                    (_, KeyCode::Char('d')) if state.tab == TAB_CAPTURED => {
                        let id = store.captured().get(state.captured_selected).map(|c| c.id);
                        if let Some(id) = id {
                            store.release(id);
                            state.clamp_captured_selection(store.captured().len());
                            state.info = format!("Released #{id}");
                        }
                    }
                    (_, KeyCode::Char('e')) if state.tab == TAB_CAPTURED => {
                        match export::export_collection_json(&store) {
                            Ok(p) => {
                                state.last_exported_path = Some(p.display().to_string());
                                state.info = format!("Exported JSON: {}", p.display());
                            }
                            Err(e) => state.info = format!("Export failed: {e:#}"),
                        }
                    }
                    (_, KeyCode::Char('v')) if state.tab == TAB_CAPTURED => {
                        match export::export_collection_csv(&store) {
                            Ok(p) => {
                                state.last_exported_path = Some(p.display().to_string());
                                state.info = format!("Exported CSV: {}", p.display());
                            }
                            Err(e) => state.info = format!("Export failed: {e:#}"),
                        }
                    }
                    (_, KeyCode::Char('o')) => {
                        if store.session().is_authenticated() {
                            store.logout();
                            state.captured_selected = 0;
                            state.info = "Logged out. Captured list cleared.".into();
                        } else {
                            state.info = "Not logged in".into();
                        }
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

/// Capture or release the highlighted entry. Returns the status line to show.
fn toggle_selected(state: &UiState, store: &mut CaptureStore) -> String {
    let Some(entry) = state.selected_entry() else {
        return "Nothing selected".into();
    };
    if let Err(e) = store.require_user("capture Pokémon") {
        return format!("{e} (run `pokedex-cli login`)");
    }
    // Search rows carry no types; prefer the loaded detail when it matches.
    let entity = match state.detail_for(entry.id) {
        Some(d) => CapturedEntity::from(d),
        None => CapturedEntity::from(entry),
    };
    let name = entity.name.clone();
    if store.toggle(entity) {
        format!("Captured {name}!")
    } else {
        format!("Released {name}")
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState, store: &CaptureStore) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let tabs = Tabs::new(vec![
        Line::from("Catalog"),
        Line::from(format!("Captured ({})", store.captured().len())),
        Line::from("Help"),
    ])
    .select(state.tab)
    .block(Block::default().borders(Borders::ALL).title("pokedex-cli"))
    .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        TAB_CATALOG => draw_catalog(chunks[1], f, state, store),
        TAB_CAPTURED => draw_captured(chunks[1], f, state, store),
        _ => help::draw_help(chunks[1], f),
    }

    let who = match store.session() {
        SessionState::Authenticated(u) => u.name.clone(),
        SessionState::Authenticating { email } => format!("{email}…"),
        SessionState::Anonymous => "guest".into(),
    };
    let status = Line::from(vec![
        Span::styled(format!(" {who} "), Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::raw(" "),
        Span::raw(state.info.clone()),
    ]);
    f.render_widget(Paragraph::new(status), chunks[2]);
}

fn draw_catalog(area: Rect, f: &mut ratatui::Frame, state: &UiState, store: &CaptureStore) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let search_style = if state.search_editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(Line::from(vec![
        Span::raw(state.search_input.clone()),
        Span::styled(
            if state.search_editing { "▏" } else { "" },
            Style::default().fg(Color::Yellow),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(search_style)
            .title("Search (/)"),
    );
    f.render_widget(search, rows[0]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)].as_ref())
        .split(rows[1]);

    let title = state
        .view
        .as_ref()
        .map(catalog_title)
        .unwrap_or_else(|| "Pokémon".to_string());
    let block = Block::default().borders(Borders::ALL).title(title);

    match state.view.as_ref().map(|v| &v.status) {
        None | Some(PageStatus::Loading) => {
            f.render_widget(Paragraph::new("Loading…").block(block), cols[0]);
        }
        Some(PageStatus::Empty) => {
            f.render_widget(Paragraph::new("No Pokémon found.").block(block), cols[0]);
        }
        Some(PageStatus::Failed(msg)) => {
            let p = Paragraph::new(vec![
                Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Red))),
                Line::from("Press r to retry."),
            ])
            .block(block);
            f.render_widget(p, cols[0]);
        }
        Some(PageStatus::Ready) => {
            let items: Vec<ListItem> = state
                .items()
                .iter()
                .map(|e| {
                    let badge = if store.is_captured(e.id) {
                        Span::styled("● ", Style::default().fg(Color::Green))
                    } else {
                        Span::raw("  ")
                    };
                    ListItem::new(Line::from(vec![
                        badge,
                        Span::styled(format!("#{:04} ", e.id), Style::default().fg(Color::Gray)),
                        Span::raw(e.name.clone()),
                        Span::styled(
                            if e.types.is_empty() {
                                String::new()
                            } else {
                                format!("  {}", e.types.join("/"))
                            },
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]))
                })
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            let mut ls = ListState::default();
            ls.select(Some(state.selected));
            f.render_stateful_widget(list, cols[0], &mut ls);
        }
    }

    let selected_id = state.selected_entry().map(|e| e.id);
    match selected_id.and_then(|id| state.detail_for(id)) {
        Some(d) => charts::draw_detail(cols[1], f, d, store.is_captured(d.id)),
        None => {
            let hint = if selected_id.is_some() && state.detail_loading == selected_id {
                "Loading details…"
            } else {
                "Press enter to load details."
            };
            let p = Paragraph::new(hint)
                .block(Block::default().borders(Borders::ALL).title("Details"));
            f.render_widget(p, cols[1]);
        }
    }
}

fn draw_captured(area: Rect, f: &mut ratatui::Frame, state: &UiState, store: &CaptureStore) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let s = metrics::collection_summary(store.captured());
    let summary = Paragraph::new(Line::from(vec![
        Span::styled("Captured ", Style::default().fg(Color::Gray)),
        Span::raw(s.captured.to_string()),
        Span::styled("  Kanto ", Style::default().fg(Color::Gray)),
        Span::raw(format!("{}%", s.completion_pct)),
        Span::styled("  Types ", Style::default().fg(Color::Gray)),
        Span::raw(s.unique_types.len().to_string()),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Collection"));
    f.render_widget(summary, rows[0]);

    let block = Block::default().borders(Borders::ALL).title(
        state
            .last_exported_path
            .as_deref()
            .map(|p| format!("Captured · last export {p}"))
            .unwrap_or_else(|| "Captured".into()),
    );
    if store.captured().is_empty() {
        let msg = if store.session().is_authenticated() {
            "No Pokémon captured yet. Press c on the Catalog tab."
        } else {
            "Log in to start a collection."
        };
        f.render_widget(Paragraph::new(msg).block(block), rows[1]);
        return;
    }

    let items: Vec<ListItem> = store
        .captured()
        .iter()
        .map(|c| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("#{:04} ", c.id), Style::default().fg(Color::Gray)),
                Span::raw(c.name.clone()),
                Span::styled(
                    format!("  {}", c.types.join("/")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut ls = ListState::default();
    ls.select(Some(state.captured_selected));
    f.render_stateful_widget(list, rows[1], &mut ls);
}
