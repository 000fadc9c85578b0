use shared::protocol::{PaginationInfo, Profile};

use super::pagination::PageSlot;

pub const MAX_DESCRIPTION_LENGTH: usize = 120;

/// Everything the directory screen renders, republished after each change.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryView {
    pub items: Vec<Profile>,
    pub pagination: PaginationInfo,
    pub current_page: u32,
    pub search_input: String,
    pub search_term: String,
    pub is_loading_full: bool,
    pub is_searching: bool,
    pub error_message: Option<String>,
    pub page_window: Vec<PageSlot>,
}

impl Default for DirectoryView {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: PaginationInfo::default(),
            current_page: 1,
            search_input: String::new(),
            search_term: String::new(),
            is_loading_full: false,
            is_searching: false,
            error_message: None,
            page_window: Vec::new(),
        }
    }
}

impl DirectoryView {
    pub fn is_busy(&self) -> bool {
        self.is_loading_full || self.is_searching
    }

    /// Skeleton cards only stand in for the very first page.
    pub fn show_skeletons(&self) -> bool {
        self.is_loading_full && self.items.is_empty() && self.error_message.is_none()
    }

    pub fn is_empty(&self) -> bool {
        !self.is_busy() && self.error_message.is_none() && self.items.is_empty()
    }

    pub fn empty_message(&self) -> String {
        if self.search_term.is_empty() {
            "No profiles available".to_string()
        } else {
            format!("No profiles found matching \"{}\"", self.search_term)
        }
    }

    pub fn summary(&self) -> Option<String> {
        if self.pagination.total_pages <= 1 {
            return None;
        }
        let mut summary = format!(
            "Showing page {} of {}",
            self.current_page, self.pagination.total_pages
        );
        if self.pagination.total > 0 {
            summary.push_str(&format!(" ({} total profiles)", self.pagination.total));
        }
        Some(summary)
    }

    pub fn can_go_prev(&self) -> bool {
        self.pagination.has_prev && !self.is_loading_full
    }

    pub fn can_go_next(&self) -> bool {
        self.pagination.has_next && !self.is_loading_full
    }
}

pub fn display_name(profile: &Profile) -> &str {
    profile
        .fullname
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("Unknown User")
}

pub fn about_excerpt(profile: &Profile) -> String {
    match profile.about_me.as_deref() {
        None | Some("") => "No description available".to_string(),
        Some(about) if about.chars().count() > MAX_DESCRIPTION_LENGTH => {
            let cut: String = about.chars().take(MAX_DESCRIPTION_LENGTH).collect();
            format!("{cut}...")
        }
        Some(about) => about.to_string(),
    }
}
