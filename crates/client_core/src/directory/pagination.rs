//! Page-number window shown under the directory grid.

pub const DEFAULT_WINDOW_DELTA: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page(u32),
    Ellipsis,
}

/// Pages to render for `current_page` out of `total_pages`: the first and last
/// page, every page within `delta` of the current one, and an ellipsis over
/// each gap. Empty when there is nothing to page through.
pub fn compute_window(current_page: u32, total_pages: u32, delta: u32) -> Vec<PageSlot> {
    if total_pages <= 1 {
        return Vec::new();
    }

    let current = current_page.clamp(1, total_pages);
    let low = current.saturating_sub(delta).max(2);
    let high = current.saturating_add(delta).min(total_pages - 1);

    let mut pages = vec![1];
    if low <= high {
        pages.extend(low..=high);
    }
    pages.push(total_pages);

    let mut window = Vec::with_capacity(pages.len() + 2);
    let mut previous: Option<u32> = None;
    for page in pages {
        if let Some(previous) = previous {
            if page - previous > 1 {
                window.push(PageSlot::Ellipsis);
            }
        }
        window.push(PageSlot::Page(page));
        previous = Some(page);
    }
    window
}

/// Renders a window as `1 … 3 4 [5] 6 7 … 10`.
pub fn render_window(window: &[PageSlot], current_page: u32) -> String {
    window
        .iter()
        .map(|slot| match slot {
            PageSlot::Page(page) if *page == current_page => format!("[{page}]"),
            PageSlot::Page(page) => page.to_string(),
            PageSlot::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
