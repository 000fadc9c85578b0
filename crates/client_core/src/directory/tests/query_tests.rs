use super::*;

#[test]
fn starts_on_first_page_with_empty_term() {
    let state = QueryState::new(DEFAULT_PAGE_SIZE);
    assert_eq!(state.snapshot(), Query::first_page(DEFAULT_PAGE_SIZE));
}

#[test]
fn raw_term_does_not_change_the_query() {
    let mut state = QueryState::new(6);
    state.set_search_term("rus");
    assert_eq!(state.raw_term(), "rus");
    assert_eq!(state.snapshot().search_term, "");
}

#[test]
fn new_debounced_term_resets_to_first_page() {
    let mut state = QueryState::new(6);
    assert!(state.set_page(3, 5, false));
    assert_eq!(state.page(), 3);

    assert!(state.on_debounced_term_changed("rust"));
    let query = state.snapshot();
    assert_eq!(query.page, 1);
    assert_eq!(query.search_term, "rust");
}

#[test]
fn unchanged_debounced_term_keeps_the_page() {
    let mut state = QueryState::new(6);
    assert!(state.on_debounced_term_changed("rust"));
    assert!(state.set_page(2, 4, false));

    assert!(!state.on_debounced_term_changed("rust"));
    assert_eq!(state.page(), 2);
}

#[test]
fn set_page_ignores_out_of_range_targets() {
    let mut state = QueryState::new(6);
    assert!(!state.set_page(0, 5, false));
    assert!(!state.set_page(6, 5, false));
    assert!(!state.set_page(1, 0, false));
    assert_eq!(state.page(), 1);
}

#[test]
fn set_page_ignores_changes_while_fetching() {
    let mut state = QueryState::new(6);
    assert!(!state.set_page(2, 5, true));
    assert_eq!(state.page(), 1);
    assert!(state.set_page(5, 5, false));
    assert_eq!(state.page(), 5);
}

#[test]
fn zero_page_size_is_raised_to_one() {
    assert_eq!(QueryState::new(0).page_size(), 1);
}

#[test]
fn adopt_tracks_explicit_query() {
    let mut state = QueryState::new(6);
    state.adopt(&Query {
        page: 4,
        search_term: "design".to_string(),
        page_size: 12,
    });
    assert_eq!(state.page(), 4);
    assert_eq!(state.debounced_term(), "design");
    assert_eq!(state.raw_term(), "design");
    assert_eq!(state.page_size(), 12);
}
