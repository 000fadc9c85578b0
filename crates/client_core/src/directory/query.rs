pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Snapshot of what one directory fetch asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub page: u32,
    pub search_term: String,
    pub page_size: u32,
}

impl Query {
    pub fn first_page(page_size: u32) -> Self {
        Self {
            page: 1,
            search_term: String::new(),
            page_size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryState {
    raw_term: String,
    debounced_term: String,
    page: u32,
    page_size: u32,
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            raw_term: String::new(),
            debounced_term: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Echoes the text field. Fetches follow the debounced term only.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.raw_term = term.into();
    }

    /// Returns `true` when the term differs from the previous debounced one,
    /// in which case the page goes back to 1.
    pub fn on_debounced_term_changed(&mut self, term: &str) -> bool {
        if term == self.debounced_term {
            return false;
        }
        self.debounced_term = term.to_string();
        self.page = 1;
        true
    }

    /// Out-of-range targets and changes during a fetch are ignored.
    pub fn set_page(&mut self, page: u32, total_pages: u32, fetch_in_flight: bool) -> bool {
        if fetch_in_flight || page < 1 || page > total_pages {
            return false;
        }
        self.page = page;
        true
    }

    /// Takes over an explicitly issued query so the view reports what was
    /// actually requested.
    pub fn adopt(&mut self, query: &Query) {
        self.page = query.page.max(1);
        self.page_size = query.page_size.max(1);
        if query.search_term != self.debounced_term {
            self.debounced_term = query.search_term.clone();
            self.raw_term = query.search_term.clone();
        }
    }

    pub fn raw_term(&self) -> &str {
        &self.raw_term
    }

    pub fn debounced_term(&self) -> &str {
        &self.debounced_term
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn snapshot(&self) -> Query {
        Query {
            page: self.page,
            search_term: self.debounced_term.clone(),
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
