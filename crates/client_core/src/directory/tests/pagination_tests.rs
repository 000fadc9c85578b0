use super::*;

use PageSlot::{Ellipsis, Page};

#[test]
fn no_controls_for_single_or_empty_result() {
    for total in 0..=1 {
        for current in 0..=3 {
            assert!(compute_window(current, total, DEFAULT_WINDOW_DELTA).is_empty());
        }
    }
}

#[test]
fn middle_page_shows_both_ellipses() {
    assert_eq!(
        compute_window(5, 10, 2),
        vec![
            Page(1),
            Ellipsis,
            Page(3),
            Page(4),
            Page(5),
            Page(6),
            Page(7),
            Ellipsis,
            Page(10),
        ]
    );
}

#[test]
fn first_pages_have_no_leading_ellipsis() {
    assert_eq!(
        compute_window(1, 10, 2),
        vec![Page(1), Page(2), Page(3), Ellipsis, Page(10)]
    );
    assert_eq!(
        compute_window(4, 10, 2),
        vec![
            Page(1),
            Page(2),
            Page(3),
            Page(4),
            Page(5),
            Page(6),
            Ellipsis,
            Page(10),
        ]
    );
}

#[test]
fn last_pages_have_no_trailing_ellipsis() {
    assert_eq!(
        compute_window(10, 10, 2),
        vec![Page(1), Ellipsis, Page(8), Page(9), Page(10)]
    );
}

#[test]
fn two_pages_render_without_gaps() {
    assert_eq!(compute_window(1, 2, 2), vec![Page(1), Page(2)]);
    assert_eq!(compute_window(2, 2, 2), vec![Page(1), Page(2)]);
}

#[test]
fn out_of_range_current_page_is_clamped() {
    assert_eq!(compute_window(0, 5, 2), compute_window(1, 5, 2));
    assert_eq!(compute_window(99, 10, 2), compute_window(10, 10, 2));
}

#[test]
fn zero_delta_still_marks_gaps() {
    assert_eq!(compute_window(1, 10, 0), vec![Page(1), Ellipsis, Page(10)]);
    assert_eq!(
        compute_window(5, 10, 0),
        vec![Page(1), Ellipsis, Page(5), Ellipsis, Page(10)]
    );
}

#[test]
fn window_always_contains_first_and_last_page() {
    for total in 2..=30u32 {
        for current in 1..=total {
            let window = compute_window(current, total, DEFAULT_WINDOW_DELTA);
            assert_eq!(window.first(), Some(&Page(1)), "total={total} current={current}");
            assert_eq!(window.last(), Some(&Page(total)), "total={total} current={current}");
            assert!(window.contains(&Page(current)));

            let pages: Vec<u32> = window
                .iter()
                .filter_map(|slot| match slot {
                    Page(page) => Some(*page),
                    Ellipsis => None,
                })
                .collect();
            assert!(pages.windows(2).all(|pair| pair[0] < pair[1]));
            assert!(window
                .windows(2)
                .all(|pair| !(pair[0] == Ellipsis && pair[1] == Ellipsis)));
        }
    }
}

#[test]
fn render_marks_current_page() {
    let window = compute_window(5, 10, 2);
    assert_eq!(render_window(&window, 5), "1 … 3 4 [5] 6 7 … 10");
}
