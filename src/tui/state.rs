use crate::model::{CatalogEntry, CatalogEvent, Mode, PageStatus, PageView, PokemonDetail};

pub const TAB_CATALOG: usize = 0;
pub const TAB_CAPTURED: usize = 1;
pub const TAB_HELP: usize = 2;

#[derive(Default)]
pub struct UiState {
    pub tab: usize,
    pub info: String,

    // Search box
    pub search_input: String,
    pub search_editing: bool,

    // Catalog tab
    pub view: Option<PageView>,
    pub selected: usize,
    pub detail: Option<PokemonDetail>,
    pub detail_loading: Option<u32>,

    // Captured tab
    pub captured_selected: usize,
    pub last_exported_path: Option<String>,
}

impl UiState {
    pub fn items(&self) -> &[CatalogEntry] {
        self.view.as_ref().map(|v| v.items.as_slice()).unwrap_or(&[])
    }

    pub fn selected_entry(&self) -> Option<&CatalogEntry> {
        self.items().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.items().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp_captured_selection(&mut self, len: usize) {
        if len == 0 {
            self.captured_selected = 0;
        } else if self.captured_selected >= len {
            self.captured_selected = len - 1;
        }
    }

    /// Detail for `id` if it is the one currently shown.
    pub fn detail_for(&self, id: u32) -> Option<&PokemonDetail> {
        self.detail.as_ref().filter(|d| d.id == id)
    }
}

/// List heading: what is shown, which page, and whether more is on the way.
pub fn catalog_title(v: &PageView) -> String {
    let pages = v
        .total_pages
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".into());
    let what = match v.mode {
        Mode::Browse => "All".to_string(),
        Mode::Search => format!("\"{}\"", v.term.trim()),
    };
    let mut title = format!("{what} · page {}/{pages}", v.page.saturating_add(1));
    if v.search_pending {
        title.push_str(&format!(" · typing \"{}\"", v.raw_term.trim()));
    } else if v.fetching {
        title.push_str(" · loading");
    }
    title
}

pub fn apply_event(state: &mut UiState, ev: CatalogEvent) {
    match ev {
        CatalogEvent::View(view) => {
            let page_changed = state
                .view
                .as_ref()
                .map(|old| old.page != view.page || old.mode != view.mode || old.term != view.term)
                .unwrap_or(true);
            if page_changed {
                state.selected = 0;
            } else if state.selected >= view.items.len() {
                state.selected = view.items.len().saturating_sub(1);
            }
            if let PageStatus::Failed(msg) = &view.status {
                state.info = format!("Could not load Pokémon: {msg} (press r to retry)");
            }
            state.view = Some(view);
        }
        CatalogEvent::Detail { id, result } => {
            if state.detail_loading == Some(id) {
                state.detail_loading = None;
            }
            match *result {
                Ok(d) => state.detail = Some(d),
                Err(e) => state.info = format!("Could not load #{id}: {e}"),
            }
        }
        CatalogEvent::Info(info) => {
            state.info = info.to_message();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InfoEvent;

    fn view(page: usize, n: u32) -> PageView {
        PageView {
            mode: Mode::Browse,
            term: String::new(),
            raw_term: String::new(),
            search_pending: false,
            fetching: false,
            page,
            total_pages: Some(10),
            items: (1..=n).map(|i| CatalogEntry::new(i, format!("m{i}"), vec![])).collect(),
            status: PageStatus::Ready,
        }
    }

    #[test]
    fn selection_resets_on_new_page() {
        let mut s = UiState::default();
        apply_event(&mut s, CatalogEvent::View(view(0, 20)));
        s.select_next();
        s.select_next();
        assert_eq!(s.selected_entry().unwrap().id, 3);
        apply_event(&mut s, CatalogEvent::View(view(1, 20)));
        assert_eq!(s.selected, 0);
    }

    #[test]
    fn selection_is_clamped_on_same_page() {
        let mut s = UiState::default();
        apply_event(&mut s, CatalogEvent::View(view(0, 20)));
        s.selected = 19;
        apply_event(&mut s, CatalogEvent::View(view(0, 5)));
        assert_eq!(s.selected, 4);
    }

    #[test]
    fn failed_view_sets_info() {
        let mut s = UiState::default();
        let mut v = view(0, 0);
        v.status = PageStatus::Failed("HTTP 502".into());
        apply_event(&mut s, CatalogEvent::View(v));
        assert!(s.info.contains("HTTP 502"));
    }

    #[test]
    fn title_shows_pending_search_over_fetching() {
        let mut v = view(0, 20);
        assert_eq!(catalog_title(&v), "All · page 1/10");
        v.fetching = true;
        assert_eq!(catalog_title(&v), "All · page 1/10 · loading");
        v.raw_term = "pik ".into();
        v.search_pending = true;
        assert_eq!(catalog_title(&v), "All · page 1/10 · typing \"pik\"");
    }

    #[test]
    fn info_events_replace_message() {
        let mut s = UiState::default();
        apply_event(
            &mut s,
            CatalogEvent::Info(InfoEvent::TermCommitted { term: "pik".into() }),
        );
        assert_eq!(s.info, "Searching for \"pik\"");
    }
}
