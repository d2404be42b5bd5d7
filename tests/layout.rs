mod common;

use form_export::pdf::{LayoutEngine, PageCursor, PageSet};
use form_export::{Error, PageGeometry};

#[test]
fn block_ending_exactly_on_bottom_stays_on_page() {
    let engine = LayoutEngine::new(&PageGeometry::default());
    let mut pages = PageSet::new();

    let step = engine
        .advance(&mut pages, PageCursor::new(1, 263.0), 7.0)
        .expect("advance");

    assert!(!step.new_page);
    assert_eq!(step.at, PageCursor::new(1, 263.0));
    assert_eq!(step.next.y, 270.0);
    assert_eq!(pages.len(), 1);
}

#[test]
fn block_one_unit_past_bottom_breaks_page() {
    let engine = LayoutEngine::new(&PageGeometry::default());
    let mut pages = PageSet::new();

    let step = engine
        .advance(&mut pages, PageCursor::new(1, 264.0), 7.0)
        .expect("advance");

    assert!(step.new_page);
    assert_eq!(step.at, PageCursor::new(2, 20.0));
    assert_eq!(step.next, PageCursor::new(2, 27.0));
    assert_eq!(pages.len(), 2);
}

#[test]
fn ensure_without_break_keeps_cursor() {
    let engine = LayoutEngine::with_bounds(10.0, 100.0);
    let mut pages = PageSet::new();
    let cursor = PageCursor::new(1, 50.0);

    assert_eq!(engine.ensure(&mut pages, cursor, 50.0).expect("ensure"), cursor);
    assert!(engine.fits(cursor, 50.0));
    assert!(!engine.fits(cursor, 50.5));
}

#[test]
fn block_taller_than_body_is_an_error() {
    let engine = LayoutEngine::new(&PageGeometry::default());
    let mut pages = PageSet::new();

    let err = engine
        .advance(&mut pages, engine.first_page(), 250.5)
        .expect_err("block taller than 250 must not fit");
    match err {
        Error::LayoutOverflow { needed, available } => {
            assert_eq!(needed, 250.5);
            assert_eq!(available, 250.0);
        }
        other => panic!("unexpected error: {other}"),
    }

    // A block exactly as tall as the body fits on a fresh page.
    let step = engine
        .advance(&mut pages, PageCursor::new(1, 100.0), 250.0)
        .expect("full-height block");
    assert_eq!(step.at, PageCursor::new(2, 20.0));
    assert_eq!(step.next.y, 270.0);
}

#[test]
fn breaks_are_deterministic() {
    let engine = LayoutEngine::new(&PageGeometry::default());
    let heights = [7.0, 30.0, 7.0, 120.0, 60.0, 7.0, 90.0, 7.0, 7.0, 200.0];

    let run = || {
        let mut pages = PageSet::new();
        let mut cursor = engine.first_page();
        let mut placed = Vec::new();
        for h in heights {
            let step = engine.advance(&mut pages, cursor, h).expect("advance");
            placed.push(step.at);
            cursor = step.next;
        }
        (placed, pages.len())
    };

    let (first, first_pages) = run();
    let (second, second_pages) = run();
    assert_eq!(first, second);
    assert_eq!(first_pages, second_pages);
    for at in &first {
        assert!(at.y >= 20.0 && at.y <= 270.0, "block placed at {at:?}");
    }
}

#[test]
fn page_set_always_has_first_page() {
    let pages = PageSet::new();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages.pages()[0].number, 1);
    assert!(pages.pages()[0].ops.is_empty());
}
