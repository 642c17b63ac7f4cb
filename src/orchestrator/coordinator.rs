//! Catalog query coordinator.
//!
//! Decides which upstream fetch (if any) the current search session needs,
//! stores each completed fetch under its own key and derives the displayed
//! page from the *current* session. A fetch that settles after the user has
//! moved on only fills the cache; it never replaces what is on screen.

use super::debounce::Debouncer;
use super::search::SearchSession;
use super::view;
use crate::error::CatalogError;
use crate::model::{
    BasicEntry, CatalogConfig, Mode, PageStatus, PageView, PageWindow, PokemonDetail,
};
use crate::query::{Lookup, QueryCache};
use crate::source::{self, CatalogPage, CatalogSource};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Identity of a cacheable list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKey {
    Page(PageWindow),
    NameIndex,
}

/// A settled list fetch, ready to be applied.
#[derive(Debug)]
pub enum FetchOutcome {
    Page(PageWindow, Result<CatalogPage, CatalogError>),
    NameIndex(Result<Vec<BasicEntry>, CatalogError>),
}

impl FetchOutcome {
    fn key(&self) -> FetchKey {
        match self {
            FetchOutcome::Page(w, _) => FetchKey::Page(*w),
            FetchOutcome::NameIndex(_) => FetchKey::NameIndex,
        }
    }
}

pub struct Coordinator {
    source: Arc<dyn CatalogSource>,
    limit: usize,
    index_limit: usize,
    session: SearchSession,
    debouncer: Debouncer<String>,
    pages: QueryCache<PageWindow, Arc<CatalogPage>>,
    index: QueryCache<(), Arc<Vec<BasicEntry>>>,
    details: QueryCache<String, Arc<PokemonDetail>>,
    in_flight: HashSet<FetchKey>,
    errors: HashMap<FetchKey, String>,
    total_count: Option<usize>,
}

impl Coordinator {
    pub fn new(source: Arc<dyn CatalogSource>, cfg: &CatalogConfig) -> Self {
        Self {
            source,
            limit: cfg.page_size.max(1),
            index_limit: cfg.index_limit,
            session: SearchSession::default(),
            debouncer: Debouncer::new(cfg.debounce),
            pages: QueryCache::new(cfg.stale_time, cfg.gc_time),
            index: QueryCache::new(cfg.stale_time, cfg.gc_time),
            details: QueryCache::new(cfg.stale_time, cfg.gc_time),
            in_flight: HashSet::new(),
            errors: HashMap::new(),
            total_count: None,
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    #[cfg(test)]
    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::for_page(self.session.page(), self.limit)
    }

    /// Record a keystroke and (re)arm the debounced commit.
    pub fn set_search_term(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        self.session.set_raw(raw.clone());
        self.debouncer.schedule(raw);
    }

    /// Wait for the debounced term. Cancel safe.
    pub async fn next_commit(&mut self) -> String {
        self.debouncer.fired().await
    }

    /// Commit a term directly, bypassing the debouncer.
    pub fn commit_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        self.debouncer.cancel();
        self.session.set_raw(term.clone());
        if self.session.commit(term) {
            info!(mode = ?self.session.mode(), "catalog mode changed");
        }
        self.errors.clear();
    }

    pub fn set_page(&mut self, page: usize) {
        if page != self.session.page() {
            self.session.set_page(page);
            self.errors.clear();
        }
    }

    pub fn next_page(&mut self) {
        let next = self.session.page().saturating_add(1);
        match self.known_total_pages() {
            Some(total) if next >= total => {}
            _ => self.set_page(next),
        }
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.session.page().saturating_sub(1));
    }

    /// Explicit re-fetch of whatever the current view is built from.
    pub fn refresh(&mut self) {
        match self.current_key() {
            FetchKey::Page(w) => self.pages.invalidate(&w),
            FetchKey::NameIndex => self.index.invalidate(&()),
        }
        self.errors.clear();
    }

    fn current_key(&self) -> FetchKey {
        match self.session.mode() {
            Mode::Browse => FetchKey::Page(self.window()),
            Mode::Search => FetchKey::NameIndex,
        }
    }

    /// The fetch the current view still needs, if any. Failed keys wait for
    /// an explicit trigger (term, page or refresh); nothing is retried here.
    pub fn required_fetch(&mut self) -> Option<FetchKey> {
        let key = self.current_key();
        if self.in_flight.contains(&key) || self.errors.contains_key(&key) {
            return None;
        }
        let needed = match key {
            FetchKey::Page(w) => !matches!(self.pages.get(&w), Lookup::Fresh(_)),
            // Reused for as long as it stays cached, stale or not.
            FetchKey::NameIndex => !self.index.contains(&()),
        };
        needed.then_some(key)
    }

    /// Mark `key` in flight and return the future that performs it.
    pub fn start(&mut self, key: FetchKey) -> BoxFuture<'static, FetchOutcome> {
        self.in_flight.insert(key);
        let source = self.source.clone();
        match key {
            FetchKey::Page(window) => {
                debug!(offset = window.offset, limit = window.limit, "fetching page");
                async move {
                    let res = source::fetch_page(source.as_ref(), window).await;
                    FetchOutcome::Page(window, res)
                }
                .boxed()
            }
            FetchKey::NameIndex => {
                let limit = self.index_limit;
                debug!(limit, "fetching name index");
                async move {
                    let res = source::fetch_name_index(source.as_ref(), limit).await;
                    FetchOutcome::NameIndex(res)
                }
                .boxed()
            }
        }
    }

    pub fn apply(&mut self, outcome: FetchOutcome) {
        let key = outcome.key();
        self.in_flight.remove(&key);
        let failed = match outcome {
            FetchOutcome::Page(window, Ok(page)) => {
                self.total_count = Some(page.total_count);
                self.pages.insert(window, Arc::new(page));
                None
            }
            FetchOutcome::NameIndex(Ok(index)) => {
                self.index.insert((), Arc::new(index));
                None
            }
            FetchOutcome::Page(_, Err(e)) | FetchOutcome::NameIndex(Err(e)) => Some(e),
        };
        match failed {
            Some(e) => {
                warn!(?key, error = %e, "catalog fetch failed");
                self.errors.insert(key, e.to_string());
            }
            None => {
                self.errors.remove(&key);
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    fn known_total_pages(&mut self) -> Option<usize> {
        match self.session.mode() {
            Mode::Browse => self.total_count.map(|c| view::total_pages(c, self.limit)),
            Mode::Search => {
                let index = self.index.get(&()).value()?;
                let matches = view::filter_by_name(&index, self.session.committed_term()).len();
                Some(view::total_pages(matches, self.limit))
            }
        }
    }

    /// Snapshot of what should be displayed right now.
    pub fn view(&mut self) -> PageView {
        let mode = self.session.mode();
        let page = self.session.page();
        let key = self.current_key();
        let window = self.window();
        let failure = self.errors.get(&key).cloned();

        let (items, total_pages, have_data) = match mode {
            Mode::Browse => {
                let total = self.total_count.map(|c| view::total_pages(c, self.limit));
                match self.pages.get(&window).value() {
                    Some(p) => (p.entries.clone(), total, true),
                    None => (Vec::new(), total, false),
                }
            }
            Mode::Search => match self.index.get(&()).value() {
                Some(index) => {
                    let (items, pages) = view::search_page(
                        &index,
                        self.session.committed_term(),
                        page,
                        self.limit,
                    );
                    (items, Some(pages), true)
                }
                None => (Vec::new(), None, false),
            },
        };

        let status = match (have_data, failure) {
            (_, Some(msg)) => PageStatus::Failed(msg),
            (true, None) if items.is_empty() => PageStatus::Empty,
            (true, None) => PageStatus::Ready,
            (false, None) => PageStatus::Loading,
        };

        PageView {
            mode,
            term: self.session.committed_term().to_string(),
            raw_term: self.session.raw_term().to_string(),
            search_pending: self.debouncer.is_pending(),
            fetching: self.is_loading(),
            page,
            total_pages,
            items,
            status,
        }
    }

    /// Run whatever the current view needs and return it. Used by one-shot
    /// commands; the interactive controller drives `start`/`apply` itself.
    pub async fn load(&mut self) -> PageView {
        while let Some(key) = self.required_fetch() {
            let outcome = self.start(key).await;
            self.apply(outcome);
        }
        self.view()
    }

    pub fn cached_detail(&mut self, id_or_name: &str) -> Option<Arc<PokemonDetail>> {
        match self.details.get(&detail_key(id_or_name)) {
            Lookup::Fresh(d) => Some(d),
            _ => None,
        }
    }

    pub fn detail_future(
        &self,
        id_or_name: &str,
    ) -> BoxFuture<'static, Result<PokemonDetail, CatalogError>> {
        let source = self.source.clone();
        let key = detail_key(id_or_name);
        async move { source::fetch_detail(source.as_ref(), &key).await }.boxed()
    }

    /// Cache a detail under both its id and its name.
    pub fn store_detail(&mut self, detail: PokemonDetail) -> Arc<PokemonDetail> {
        let detail = Arc::new(detail);
        self.details.insert(detail.id.to_string(), detail.clone());
        self.details.insert(detail_key(&detail.name), detail.clone());
        detail
    }

    pub async fn detail(&mut self, id_or_name: &str) -> Result<Arc<PokemonDetail>, CatalogError> {
        if let Some(d) = self.cached_detail(id_or_name) {
            return Ok(d);
        }
        let detail = self.detail_future(id_or_name).await?;
        Ok(self.store_detail(detail))
    }

    /// Periodic housekeeping for inactive cache entries.
    pub fn evict_expired(&mut self) {
        let dropped =
            self.pages.evict_expired() + self.index.evict_expired() + self.details.evict_expired();
        if dropped > 0 {
            debug!(dropped, "evicted inactive queries");
        }
    }
}

fn detail_key(id_or_name: &str) -> String {
    id_or_name.trim().to_lowercase()
}
