//! Search/browse session state.

use crate::model::Mode;

/// An empty (after trimming) committed term means browsing.
pub fn resolve_mode(committed_term: &str) -> Mode {
    if committed_term.trim().is_empty() {
        Mode::Browse
    } else {
        Mode::Search
    }
}

/// The raw term is what the user typed; only the committed term drives
/// fetching. `page` goes back to 0 whenever the mode flips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSession {
    raw_term: String,
    committed_term: String,
    page: usize,
}

impl SearchSession {
    pub fn raw_term(&self) -> &str {
        &self.raw_term
    }

    pub fn committed_term(&self) -> &str {
        &self.committed_term
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn mode(&self) -> Mode {
        resolve_mode(&self.committed_term)
    }

    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.raw_term = raw.into();
    }

    /// Commit a term. Returns true when the mode changed (and the page was reset).
    pub fn commit(&mut self, term: impl Into<String>) -> bool {
        let before = self.mode();
        self.committed_term = term.into();
        if self.mode() != before {
            self.page = 0;
            true
        } else {
            false
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }
}
