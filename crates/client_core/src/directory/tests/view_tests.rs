use super::*;

use shared::protocol::{PaginationInfo, Profile};

fn profile(fullname: Option<&str>, about_me: Option<&str>) -> Profile {
    let mut body = serde_json::json!({ "_id": "p1" });
    if let Some(name) = fullname {
        body["fullname"] = name.into();
    }
    if let Some(about) = about_me {
        body["aboutMe"] = about.into();
    }
    serde_json::from_value(body).expect("profile")
}

fn paged(current_page: u32, total: u64, total_pages: u32) -> DirectoryView {
    DirectoryView {
        current_page,
        pagination: PaginationInfo {
            total,
            total_pages,
            has_prev: current_page > 1,
            has_next: current_page < total_pages,
        },
        ..DirectoryView::default()
    }
}

#[test]
fn skeletons_only_while_first_page_loads() {
    let mut view = DirectoryView {
        is_loading_full: true,
        ..DirectoryView::default()
    };
    assert!(view.show_skeletons());
    assert!(!view.is_empty());

    view.items.push(profile(Some("Ada"), None));
    assert!(!view.show_skeletons());

    view.is_loading_full = false;
    view.is_searching = true;
    assert!(view.is_busy());
    assert!(!view.show_skeletons());
}

#[test]
fn empty_message_mentions_active_search() {
    let mut view = DirectoryView::default();
    assert!(view.is_empty());
    assert_eq!(view.empty_message(), "No profiles available");

    view.search_term = "go".to_string();
    assert_eq!(view.empty_message(), "No profiles found matching \"go\"");

    view.error_message = Some("boom".to_string());
    assert!(!view.is_empty());
}

#[test]
fn summary_needs_more_than_one_page() {
    assert_eq!(paged(1, 4, 1).summary(), None);
    assert_eq!(
        paged(2, 13, 3).summary().as_deref(),
        Some("Showing page 2 of 3 (13 total profiles)")
    );
    assert_eq!(
        paged(2, 0, 3).summary().as_deref(),
        Some("Showing page 2 of 3")
    );
}

#[test]
fn navigation_is_disabled_during_a_full_load() {
    let mut view = paged(2, 18, 3);
    assert!(view.can_go_prev());
    assert!(view.can_go_next());

    view.is_loading_full = true;
    assert!(!view.can_go_prev());
    assert!(!view.can_go_next());

    let first = paged(1, 18, 3);
    assert!(!first.can_go_prev());
}

#[test]
fn display_name_falls_back_when_blank() {
    assert_eq!(display_name(&profile(Some("Grace Hopper"), None)), "Grace Hopper");
    assert_eq!(display_name(&profile(Some("   "), None)), "Unknown User");
    assert_eq!(display_name(&profile(None, None)), "Unknown User");
}

#[test]
fn about_excerpt_truncates_long_text() {
    assert_eq!(
        about_excerpt(&profile(None, None)),
        "No description available"
    );
    assert_eq!(about_excerpt(&profile(None, Some(""))), "No description available");
    assert_eq!(about_excerpt(&profile(None, Some("Short bio"))), "Short bio");

    let long = "é".repeat(view::MAX_DESCRIPTION_LENGTH + 5);
    let excerpt = about_excerpt(&profile(None, Some(&long)));
    assert!(excerpt.ends_with("..."));
    assert_eq!(excerpt.chars().count(), view::MAX_DESCRIPTION_LENGTH + 3);

    let exact = "a".repeat(view::MAX_DESCRIPTION_LENGTH);
    assert_eq!(about_excerpt(&profile(None, Some(&exact))), exact);
}
