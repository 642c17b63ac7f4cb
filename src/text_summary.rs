//! Text summary builders for CLI output.
//!
//! Each builder formats human-readable lines for one view: a catalog page, a
//! detail record, the captured collection and the session.

use crate::metrics;
use crate::model::{CapturedEntity, Mode, PageStatus, PageView, PokemonDetail};
use crate::store::session::SessionState;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

fn types_label(types: &[String]) -> String {
    if types.is_empty() {
        "-".to_string()
    } else {
        types.join("/")
    }
}

fn badge(captured: bool) -> &'static str {
    if captured {
        "●"
    } else {
        " "
    }
}

pub(crate) fn build_page_summary(
    view: &PageView,
    is_captured: impl Fn(u32) -> bool,
) -> TextSummary {
    let mut lines = Vec::new();

    let heading = match view.mode {
        Mode::Browse => "Browsing".to_string(),
        Mode::Search => format!("Search \"{}\"", view.term.trim()),
    };
    let pages = view
        .total_pages
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".into());
    lines.push(format!("{heading}: page {}/{pages}", view.page.saturating_add(1)));

    match &view.status {
        PageStatus::Loading => lines.push("Loading…".into()),
        PageStatus::Empty => lines.push("No Pokémon found.".into()),
        PageStatus::Failed(msg) => lines.push(format!("Error: {msg}")),
        PageStatus::Ready => {
            for e in &view.items {
                lines.push(format!(
                    "{} #{:04} {:<16} {}",
                    badge(is_captured(e.id)),
                    e.id,
                    e.name,
                    types_label(&e.types)
                ));
            }
        }
    }

    TextSummary { lines }
}

pub(crate) fn build_detail_summary(d: &PokemonDetail, captured: bool) -> TextSummary {
    let mut lines = vec![
        format!("#{:04} {}{}", d.id, d.name, if captured { "  (captured)" } else { "" }),
        format!("Types:     {}", types_label(&d.types)),
        format!("Height:    {}", d.height_display()),
        format!("Weight:    {} kg", d.weight_kg),
        format!("Abilities: {}", d.abilities.join(", ")),
    ];
    for (label, value) in d.stats.labelled() {
        lines.push(format!("  {label:<8} {value:>3}"));
    }
    let s = metrics::stat_summary(&d.stats);
    lines.push(format!(
        "Total {}  strong stats {}  best {}",
        s.total, s.strong, s.max
    ));
    lines.push(format!("Image: {}", d.image_url));
    if let Some(art) = d.official_artwork.as_deref() {
        lines.push(format!("Artwork: {art}"));
    }
    TextSummary { lines }
}

pub(crate) fn build_collection_summary(captured: &[CapturedEntity]) -> TextSummary {
    let s = metrics::collection_summary(captured);
    let mut lines = vec![format!(
        "Captured {}  ({}% of {})  types {}",
        s.captured,
        s.completion_pct,
        metrics::KANTO_DEX_SIZE,
        s.unique_types.len()
    )];
    if captured.is_empty() {
        lines.push("No Pokémon captured yet.".into());
    }
    for p in captured {
        lines.push(format!("#{:04} {:<16} {}", p.id, p.name, types_label(&p.types)));
    }
    TextSummary { lines }
}

pub(crate) fn build_session_summary(session: &SessionState) -> TextSummary {
    let line = match session {
        SessionState::Anonymous => "Not logged in".to_string(),
        SessionState::Authenticating { email } => format!("Logging in as {email}…"),
        SessionState::Authenticated(u) => format!("Logged in as {} <{}>", u.name, u.email),
    };
    TextSummary { lines: vec![line] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CatalogEntry;

    #[test]
    fn page_marks_captured_entries() {
        let view = PageView {
            mode: Mode::Search,
            term: "chu".into(),
            raw_term: "chu".into(),
            search_pending: false,
            fetching: false,
            page: 0,
            total_pages: Some(1),
            items: vec![
                CatalogEntry::new(25, "pikachu", vec![]),
                CatalogEntry::new(26, "raichu", vec!["electric".into()]),
            ],
            status: PageStatus::Ready,
        };
        let s = build_page_summary(&view, |id| id == 26);
        assert_eq!(s.lines[0], "Search \"chu\": page 1/1");
        assert!(s.lines[1].starts_with("  #0025 pikachu"));
        assert!(s.lines[1].ends_with('-'));
        assert!(s.lines[2].starts_with("● #0026 raichu"));
    }

    #[test]
    fn failed_page_shows_error() {
        let view = PageView {
            mode: Mode::Browse,
            term: String::new(),
            raw_term: String::new(),
            search_pending: false,
            fetching: false,
            page: 2,
            total_pages: None,
            items: vec![],
            status: PageStatus::Failed("HTTP 500".into()),
        };
        let s = build_page_summary(&view, |_| false);
        assert_eq!(s.lines, vec!["Browsing: page 3/?", "Error: HTTP 500"]);
    }
}
